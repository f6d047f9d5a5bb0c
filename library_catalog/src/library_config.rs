use chrono::Days;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOAN_PERIOD_DAYS: u32 = 14;
pub const MAX_LOAN_PERIOD_DAYS: u32 = 3650;

#[derive(Debug, thiserror::Error)]
pub enum LibraryConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Loan period must be between 1 and 3650 days, got {0}")]
    InvalidLoanPeriod(u32),
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct LibraryConfig {
    /// Days between lending a copy and its expiration date
    pub loan_period_days: u32,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            loan_period_days: DEFAULT_LOAN_PERIOD_DAYS,
        }
    }
}

impl LibraryConfig {
    /// Reads the optional `library.{toml,json,yaml,..}` file in the working
    /// directory, then `LIBRARY_*` environment variables on top of it.
    pub fn load() -> Result<Self, LibraryConfigError> {
        Self::load_from("library", "LIBRARY")
    }

    pub fn load_from(file_name: &str, env_prefix: &str) -> Result<Self, LibraryConfigError> {
        let settings = config::Config::builder()
            .set_default("loan_period_days", i64::from(DEFAULT_LOAN_PERIOD_DAYS))?
            .add_source(config::File::with_name(file_name).required(false))
            .add_source(config::Environment::with_prefix(env_prefix).try_parsing(true))
            .build()?;

        let loaded: LibraryConfig = settings.try_deserialize()?;
        loaded.validate()?;
        tracing::debug!("Loaded library configuration {:?}", loaded);
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<(), LibraryConfigError> {
        if !(1..=MAX_LOAN_PERIOD_DAYS).contains(&self.loan_period_days) {
            return Err(LibraryConfigError::InvalidLoanPeriod(self.loan_period_days));
        }
        Ok(())
    }

    pub fn loan_period(&self) -> Days {
        Days::new(u64::from(self.loan_period_days))
    }
}
