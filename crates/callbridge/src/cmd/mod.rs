use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod actions;
pub mod call;
pub mod ping;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the built-in demo actions on a socket.
    Serve(ServeArgs),
    /// Invoke one action on a serving worker and print the result.
    Call(CallArgs),
    /// Probe a serving worker for liveness.
    Ping(PingArgs),
    /// List the actions a serving worker exposes.
    Actions(ActionsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args),
        Command::Call(args) => call::run(args, format),
        Command::Ping(args) => ping::run(args),
        Command::Actions(args) => actions::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Socket path to bind.
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Socket path to connect to.
    pub path: PathBuf,
    /// Action name.
    pub method: String,
    /// Positional arguments, each parsed as JSON. Anything that fails to
    /// parse is passed through as text.
    pub args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct PingArgs {
    /// Socket path to connect to.
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct ActionsArgs {
    /// Socket path to connect to.
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
