use callbridge_socket::SocketClient;

use crate::cmd::ActionsArgs;
use crate::exit::{socket_error, CliResult, SUCCESS};
use crate::output::{print_names, OutputFormat};

pub fn run(args: ActionsArgs, format: OutputFormat) -> CliResult<i32> {
    let client = SocketClient::new(&args.path);
    let names = client
        .init()
        .map_err(|err| socket_error("init failed", err))?;
    print_names(&names, format);
    Ok(SUCCESS)
}
