use formalsh::Interpreter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Log level comes from `RUST_LOG`; by default only warnings are shown so
/// they do not mix with interactive output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("formalsh=warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> rustyline::Result<()> {
    init_tracing();
    tracing::debug!("formalsh starting");
    Interpreter::default().repl()
}
