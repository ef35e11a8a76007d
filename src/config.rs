use std::env;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_PATH: &str = "data/fintracker.db";
pub const DEFAULT_LOG_FILTER: &str = "fintracker=info";

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite file holding user preferences.
    pub database_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_path: env::var("FINTRACKER_DATABASE_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(|v| {
                    PathBuf::from(
                        v.strip_prefix("sqlite://")
                            .or_else(|| v.strip_prefix("sqlite:"))
                            .unwrap_or(&v),
                    )
                })
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}
