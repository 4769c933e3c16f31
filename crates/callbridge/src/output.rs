use std::io::{IsTerminal, Write};

use callbridge_codec::Value;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ValueOutput<'a> {
    kind: &'a str,
    value: serde_json::Value,
}

/// Print a call result to stdout.
pub fn print_value(value: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ValueOutput {
                kind: type_name(value),
                value: value.to_json(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "VALUE"])
                .add_row(vec![type_name(value).to_string(), preview(value)]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{}", preview(value));
        }
        OutputFormat::Raw => match value {
            Value::Bytes(bytes) => print_raw(bytes),
            Value::Text(text) => print_raw(text.as_bytes()),
            other => println!("{}", preview(other)),
        },
    }
}

/// Print the worker's callable index.
pub fn print_names(names: &[String], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(names).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ACTION"]);
            for name in names {
                table.add_row(vec![name.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for name in names {
                println!("{name}");
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Int(_) => "int",
        Value::Float(_) => "float",
        Value::Text(_) => "text",
        Value::Bytes(_) => "bytes",
        Value::Timestamp(_) => "timestamp",
        Value::Array(_) => "array",
        Value::Map(_) => "map",
    }
}

fn preview(value: &Value) -> String {
    match value {
        Value::Bytes(bytes) => format!("<binary {} bytes>", bytes.len()),
        other => serde_json::to_string(&other.to_json()).unwrap_or_else(|_| "null".to_string()),
    }
}
