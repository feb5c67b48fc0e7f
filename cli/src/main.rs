use clap::Parser;
use halalmatches_cli::{Cli, Outcome};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let default_level = "warn";
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut stdout = std::io::stdout().lock();
    let outcome = cli.run(&mut stdout)?;
    if let Outcome::Rejected(message) = &outcome {
        eprintln!("error: {message}");
        std::process::exit(outcome.exit_code());
    }
    Ok(())
}
