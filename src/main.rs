use anyhow::Context;
use clap::Parser;
use reportlog::cli::{Cli, Commands};
use reportlog::config::AppSettings;
use reportlog::output;
use reportlog::storage::ReportLog;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(err) = run() {
        output::print_error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => AppSettings::load_from(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => AppSettings::load().context("loading settings")?,
    };

    init_tracing(cli.verbose || settings.verbose);

    let log = ReportLog::new(settings.resolve_data_file(cli.data_file.as_deref()));

    match &cli.command {
        Commands::Save(cmd) => cmd.execute(&log, cli.quiet)?,
        Commands::Remove(cmd) => cmd.execute(&log, cli.quiet)?,
        Commands::List(cmd) => cmd.execute(&log, cli.quiet)?,
    }

    Ok(())
}

/// Diagnostics go to stderr so `list --json` output stays pipeable.
/// RUST_LOG overrides the verbosity flag when set.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "reportlog=debug" } else { "reportlog=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
