use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use pitch_crypto::WorkFactor;
use pitch_db::StoreLocation;

const PRODUCTION_DB_PATH: &str = "/app/data/proposals.db";
const DEVELOPMENT_DB_PATH: &str = "data/proposals.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployMode {
    Production,
    Development,
}

impl DeployMode {
    fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("development") => Ok(DeployMode::Development),
            Some("production") => Ok(DeployMode::Production),
            Some(other) => bail!("PITCH_ENV must be 'production' or 'development', got '{}'", other),
        }
    }
}

pub struct Config {
    pub admin_key: String,
    pub mode: DeployMode,
    pub store: StoreLocation,
    pub host: String,
    pub port: u16,
    pub work_factor: WorkFactor,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let admin_key = get("PITCH_ADMIN_KEY").unwrap_or_default();
        if admin_key.is_empty() {
            bail!("PITCH_ADMIN_KEY is unset. Set it in your .env file and restart.");
        }

        let mode = DeployMode::parse(get("PITCH_ENV").as_deref())?;
        let store = store_location(
            mode,
            get("PITCH_SKIP_DB_INIT").is_some_and(|v| !v.is_empty()),
            get("PITCH_DB_PATH").filter(|p| !p.is_empty()),
        );

        let host = get("PITCH_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = get("PITCH_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("PITCH_PORT must be a port number")?;

        let defaults = WorkFactor::default();
        let work_factor = WorkFactor {
            memory_kib: parse_or(&get, "PITCH_HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&get, "PITCH_HASH_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&get, "PITCH_HASH_PARALLELISM", defaults.parallelism)?,
        };

        Ok(Self {
            admin_key,
            mode,
            store,
            host,
            port,
            work_factor,
        })
    }
}

/// Production uses the fixed data volume unless this is a build-only run,
/// which gets a throwaway in-memory store. Development keeps its data next to
/// the working directory. An explicit path always wins.
pub fn store_location(
    mode: DeployMode,
    skip_db_init: bool,
    explicit_path: Option<String>,
) -> StoreLocation {
    if let Some(path) = explicit_path {
        return StoreLocation::File(PathBuf::from(path));
    }
    match (mode, skip_db_init) {
        (DeployMode::Production, false) => StoreLocation::File(PRODUCTION_DB_PATH.into()),
        (DeployMode::Production, true) => StoreLocation::Memory,
        (DeployMode::Development, _) => StoreLocation::File(DEVELOPMENT_DB_PATH.into()),
    }
}

fn parse_or(get: &impl Fn(&str) -> Option<String>, key: &str, default: u32) -> Result<u32> {
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a positive integer", key)),
        None => Ok(default),
    }
}
