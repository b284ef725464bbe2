use clap::Parser;
use serde::Deserialize;

/// Accrual engine configuration: CLI flags override the environment, which
/// overrides `config`-crate defaults.
#[derive(Debug, Parser)]
#[command(version, about = "Accrual engine: computes order rewards from reward rules")]
struct Cli {
    /// Listen address
    #[arg(short = 'a', long, env = "RUN_ADDRESS")]
    run_address: Option<String>,

    /// Postgres connection string
    #[arg(short = 'd', long, env = "DATABASE_URI")]
    database_uri: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short = 'v', long, env = "LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub run_address: String,
    pub database_uri: String,
    pub log_level: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Config> {
        let cli = Cli::parse();

        let builder = config::Config::builder()
            .set_default("run_address", "0.0.0.0:8080")?
            .set_default("database_uri", "")?
            .set_default("log_level", "info")?
            .add_source(config::Environment::default());

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        if let Some(v) = cli.run_address {
            cfg.run_address = v;
        }
        if let Some(v) = cli.database_uri {
            cfg.database_uri = v;
        }
        if let Some(v) = cli.log_level {
            cfg.log_level = v;
        }

        if cfg.database_uri.is_empty() {
            anyhow::bail!("DATABASE_URI is required");
        }

        Ok(cfg)
    }
}
