use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Global CLI arguments
#[derive(Parser, Debug, Clone)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Configuration file path (TOML or JSON)")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Enable quiet mode (minimal output)")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Convert Datadog queries to PromQL
    Convert {
        #[arg(required = true, help = "Datadog queries, e.g. 'avg:apollo.router.cache.size{}'")]
        queries: Vec<String>,

        #[arg(long, help = "Print the converted queries as JSON")]
        json: bool,
    },
    /// Show the effective rule and mapping tables and exit
    Config {
        #[arg(long, help = "Show configuration in JSON format")]
        json: bool,
    },
    /// Compile the rule tables and report problems
    Validate,
    /// Show version information and exit
    Version,
}

pub mod utils {
    use super::*;
    use anyhow::{Context, Result};
    use converter::{Configuration, ConvertedQuery, QueryConverter};
    use tracing_subscriber::EnvFilter;

    /// Initialize logging based on CLI arguments. `RUST_LOG` takes precedence.
    pub fn init_logging(args: &CommonArgs) {
        let level = if args.quiet {
            "warn"
        } else if args.verbose {
            "debug"
        } else {
            "info"
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    /// Load configuration with optional override from CLI
    pub fn load_config(config_path: Option<&PathBuf>) -> Result<Configuration> {
        match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Configuration::load_from_path(path).context("Failed to load configuration")
            }
            None => Configuration::load().context("Failed to load configuration"),
        }
    }

    /// Display configuration in human-readable or JSON format
    pub fn display_config(config: &Configuration, json: bool) -> Result<()> {
        if json {
            let json = serde_json::to_string_pretty(config)
                .context("Failed to serialize configuration to JSON")?;
            println!("{json}");
        } else {
            println!("Metric type rules (first match wins):");
            for (idx, rule) in config.metric_types.rules.iter().enumerate() {
                println!("  {:>2}. {:<10} {}", idx + 1, rule.metric_type, rule.pattern);
            }

            println!("Attribute mappings:");
            for (source, target) in config.attribute_mappings.mappings.sorted() {
                println!("  {source} -> {target}");
            }
        }
        Ok(())
    }

    /// Validate configuration and report any issues
    pub fn validate_config(config: &Configuration) -> Result<()> {
        log::info!("Validating configuration...");

        let rules = config
            .compile_rules()
            .context("Metric type rules do not compile")?;

        let warnings = rules.warnings();
        for warning in &warnings {
            println!("warning: {warning}");
        }

        log::info!(
            "Configuration validation passed: {} rules, {} mappings, {} warning(s)",
            rules.len(),
            config.attribute_mappings.mappings.len(),
            warnings.len()
        );
        Ok(())
    }

    /// Convert and print the queries, one `name<TAB>promql` line each.
    ///
    /// Fails only if not a single query could be converted.
    pub fn convert_queries(config: &Configuration, queries: &[String], json: bool) -> Result<()> {
        let converter =
            QueryConverter::from_config(config).context("Failed to compile metric type rules")?;
        let converted = converter.convert_all(queries);

        if converted.is_empty() {
            anyhow::bail!("None of the {} queries could be converted", queries.len());
        }

        if json {
            let json = serde_json::to_string_pretty(&converted)
                .context("Failed to serialize converted queries to JSON")?;
            println!("{json}");
        } else {
            for ConvertedQuery {
                display_name,
                promql,
                ..
            } in &converted
            {
                println!("{display_name}\t{promql}");
            }
        }

        if converted.len() < queries.len() {
            log::warn!(
                "Converted {} of {} queries",
                converted.len(),
                queries.len()
            );
        }
        Ok(())
    }

    /// Standard version information
    pub fn version_info() -> String {
        format!(
            "{} {} ({})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_RUST_VERSION")
        )
    }
}
