use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

/// Mart gateway configuration: CLI flags override the environment, which
/// overrides `config`-crate defaults.
#[derive(Debug, Parser)]
#[command(version, about = "Mart gateway: accounts, orders, balances, withdrawals")]
struct Cli {
    /// Listen address
    #[arg(short = 'a', long, env = "RUN_ADDRESS")]
    run_address: Option<String>,

    /// Postgres connection string
    #[arg(short = 'd', long, env = "DATABASE_URI")]
    database_uri: Option<String>,

    /// Accrual engine base URL
    #[arg(short = 'r', long, env = "ACCRUAL_SYSTEM_ADDRESS")]
    accrual_system_address: Option<String>,

    /// Path to a file holding the bytes of the token-signing secret
    #[arg(short = 's', long, env = "SECRET_KEY_PATH")]
    secret_key_path: Option<String>,

    /// Token lifetime, e.g. "24h" (unset means tokens never expire)
    #[arg(short = 't', long, env = "TOKEN_TTL")]
    token_ttl: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short = 'v', long, env = "LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    run_address: String,
    database_uri: String,
    accrual_system_address: String,
    secret_key_path: String,
    token_ttl: String,
    log_level: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub run_address: String,
    pub database_uri: String,
    pub accrual_system_address: String,
    pub secret_key_path: String,
    pub token_ttl: Option<Duration>,
    pub log_level: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Config> {
        let cli = Cli::parse();

        let builder = config::Config::builder()
            .set_default("run_address", "0.0.0.0:8081")?
            .set_default("database_uri", "")?
            .set_default("accrual_system_address", "")?
            .set_default("secret_key_path", "")?
            .set_default("token_ttl", "")?
            .set_default("log_level", "info")?
            .add_source(config::Environment::default());

        let mut raw: RawConfig = builder.build()?.try_deserialize()?;

        if let Some(v) = cli.run_address {
            raw.run_address = v;
        }
        if let Some(v) = cli.database_uri {
            raw.database_uri = v;
        }
        if let Some(v) = cli.accrual_system_address {
            raw.accrual_system_address = v;
        }
        if let Some(v) = cli.secret_key_path {
            raw.secret_key_path = v;
        }
        if let Some(v) = cli.token_ttl {
            raw.token_ttl = v;
        }
        if let Some(v) = cli.log_level {
            raw.log_level = v;
        }

        if raw.database_uri.is_empty() {
            anyhow::bail!("DATABASE_URI is required");
        }
        if raw.accrual_system_address.is_empty() {
            anyhow::bail!("ACCRUAL_SYSTEM_ADDRESS is required");
        }
        if raw.secret_key_path.is_empty() {
            anyhow::bail!("SECRET_KEY_PATH is required");
        }

        let token_ttl = if raw.token_ttl.is_empty() {
            None
        } else {
            Some(humantime::parse_duration(&raw.token_ttl)?)
        };

        Ok(Config {
            run_address: raw.run_address,
            database_uri: raw.database_uri,
            accrual_system_address: raw.accrual_system_address,
            secret_key_path: raw.secret_key_path,
            token_ttl,
            log_level: raw.log_level,
        })
    }
}
