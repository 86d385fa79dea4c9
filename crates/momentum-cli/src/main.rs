use std::ffi::OsString;

use momentum_core::ClientError;

#[tokio::main]
async fn main() {
    let args: Vec<OsString> = std::env::args_os().collect();
    if let Err(err) = momentum_core::run(args).await {
        eprintln!("error: {err:#}");
        if err
            .downcast_ref::<ClientError>()
            .is_some_and(ClientError::is_network)
        {
            eprintln!("hint: check the network connection and the api.token setting");
        }
        std::process::exit(1);
    }
}
