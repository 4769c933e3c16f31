use callbridge_socket::SocketClient;

use crate::cmd::PingArgs;
use crate::exit::{socket_error, CliResult, SUCCESS};

pub fn run(args: PingArgs) -> CliResult<i32> {
    let client = SocketClient::new(&args.path);
    client
        .ping()
        .map_err(|err| socket_error("ping failed", err))?;
    println!("pong");
    Ok(SUCCESS)
}
