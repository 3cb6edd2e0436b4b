use anyhow::Result;
use clap::Parser;

mod cli;

use cli::{Commands, CommonArgs, utils};

#[derive(Parser)]
#[command(name = "dashconv")]
#[command(about = "dashconv - convert Datadog metric queries to Dash0 PromQL")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on CLI arguments
    utils::init_logging(&cli.common);

    if let Commands::Version = cli.command {
        println!("{}", utils::version_info());
        return Ok(());
    }

    let config = utils::load_config(cli.common.config.as_ref())?;

    match cli.command {
        Commands::Convert { queries, json } => utils::convert_queries(&config, &queries, json),
        Commands::Config { json } => utils::display_config(&config, json),
        Commands::Validate => utils::validate_config(&config),
        Commands::Version => Ok(()),
    }
}
