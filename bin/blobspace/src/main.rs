//! The binary for checking blob wasted space.

use blobspace::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _guards = match blobspace_tracing::init_logging() {
        Ok(guards) => guards,
        Err(e) => {
            eprintln!("Error: failed to initialize logging: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = Cli::run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
