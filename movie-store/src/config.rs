use crate::error::ConfigError;
use std::env::var;
use tracing::{debug, warn};

pub const TABLE_NAME_VAR: &str = "TABLE_NAME";
pub const REGION_VAR: &str = "REGION";
pub const CAST_TABLE_NAME_VAR: &str = "CAST_TABLE_NAME";

/// Process-wide settings read once per cold start.
///
/// Nothing in here is validated at startup: a lambda with missing settings still starts
/// and answers every request with a server configuration error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// E.g. `MoviesTable` for the movie lookup or `MovieCastTable` for the cast lookup
    pub table_name: Option<String>,
    /// E.g. `eu-west-1`
    pub region: Option<String>,
    /// Optional source of cast rows for the movie lookup.
    /// The embedded seed list is used if this is None.
    pub cast_table_name: Option<String>,
}

impl Config {
    /// Creates a new Config instance from the environment variables.
    /// Empty values are treated as missing. Does not panic.
    pub fn from_env() -> Self {
        let config = Self {
            table_name: non_empty_var(TABLE_NAME_VAR),
            region: non_empty_var(REGION_VAR),
            cast_table_name: non_empty_var(CAST_TABLE_NAME_VAR),
        };

        if config.table_name.is_none() || config.region.is_none() {
            warn!("{TABLE_NAME_VAR} and {REGION_VAR} env vars must be set. All requests will fail.");
        }
        debug!("{:?}", config);

        config
    }

    pub fn require_table(&self) -> Result<&str, ConfigError> {
        self.table_name.as_deref().ok_or(ConfigError::Missing(TABLE_NAME_VAR))
    }

    pub fn require_region(&self) -> Result<&str, ConfigError> {
        self.region.as_deref().ok_or(ConfigError::Missing(REGION_VAR))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    var(name).ok().filter(|v| !v.trim().is_empty())
}
