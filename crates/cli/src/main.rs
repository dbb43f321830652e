use clap::Parser;
use sealgen_loader::LoadRestrictions;
use std::path::PathBuf;

mod atomic_file;
mod commands;
mod execute;
mod logging;
mod settings;

use commands::Commands;
use settings::SettingsLoader;

#[derive(Parser)]
#[command(name = "sealgen")]
#[command(about = "Generate Kubernetes Secrets from sealed sources", long_about = None)]
#[command(version)]
struct Cli {
    /// Root directory that generator sources resolve against [env: SEALGEN_ROOT]
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Keyring file [env: SEALGEN_KEYRING]
    #[arg(long, global = true, value_name = "FILE")]
    keyring: Option<PathBuf>,

    /// Where sources may be loaded from: root-only or none [env: SEALGEN_LOAD_RESTRICTOR]
    #[arg(long, global = true, value_name = "RESTRICTOR")]
    load_restrictor: Option<LoadRestrictions>,

    /// Increase log verbosity (-v, -vv, -vvv) [env: SEALGEN_LOG]
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let settings = SettingsLoader::new()
        .root(cli.root)
        .keyring(cli.keyring)
        .restrictions(cli.load_restrictor)
        .load()?;

    cli.command.execute(settings).await
}
