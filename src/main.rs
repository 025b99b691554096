use std::io;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use validate_json::app;

/// Environment variable holding the tracing filter, e.g. `debug`
const LOG_ENV: &str = "VALIDATE_JSON_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();

    let args = std::env::args_os().skip(1);

    let stdout = io::stdout();
    let stderr = io::stderr();
    let code = app::run(args, &mut stdout.lock(), &mut stderr.lock()).await;

    code.into()
}
