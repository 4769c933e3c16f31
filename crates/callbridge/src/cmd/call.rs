use callbridge_codec::Value;
use callbridge_socket::SocketClient;

use crate::cmd::CallArgs;
use crate::exit::{socket_error, CliResult, SUCCESS};
use crate::output::{print_value, OutputFormat};

pub fn run(args: CallArgs, format: OutputFormat) -> CliResult<i32> {
    let client = SocketClient::new(&args.path);
    let call_args: Vec<Value> = args.args.iter().map(|raw| parse_arg(raw)).collect();

    let value = client
        .call(&args.method, call_args)
        .map_err(|err| socket_error("call failed", err))?;

    print_value(&value, format);
    Ok(SUCCESS)
}

fn parse_arg(raw: &str) -> Value {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => Value::from_json(&json),
        Err(_) => Value::Text(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_args_become_typed_values() {
        assert_eq!(parse_arg("7"), Value::Int(7));
        assert_eq!(parse_arg("true"), Value::Bool(true));
        assert_eq!(parse_arg("null"), Value::Null);
        assert_eq!(parse_arg("\"quoted\""), Value::Text("quoted".to_string()));
    }

    #[test]
    fn non_json_args_pass_through_as_text() {
        assert_eq!(parse_arg("plain text"), Value::Text("plain text".to_string()));
    }
}
