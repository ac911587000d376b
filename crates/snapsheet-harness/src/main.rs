#![forbid(unsafe_code)]

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    if let Err(error) = snapsheet_harness::run_from_env() {
        eprintln!("{error}");
        std::process::exit(error.exit_code());
    }
}
