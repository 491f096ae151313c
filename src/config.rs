use crate::api::DEFAULT_API_BASE;
use crate::error::{CleanerError, Result};
use std::env;
use std::path::Path;

pub const ACCOUNT_NUMBER_VAR: &str = "MULLVAD_ACCOUNT_NUMBER";
pub const API_BASE_VAR: &str = "MULLVAD_API_BASE";

/// Load a `.env` file from the given directory if one exists.
/// Variables already set in the environment are left untouched.
pub fn load_dotenv(dir: &Path) -> Result<()> {
    let env_file = dir.join(".env");
    if !env_file.exists() {
        return Ok(());
    }

    dotenv::from_path(&env_file).map_err(|e| CleanerError::InvalidSetting {
        message: format!("Failed to load {}: {}", env_file.display(), e),
    })?;
    tracing::debug!(path = %env_file.display(), "Loaded .env file");
    Ok(())
}

/// Read the account number from the environment
pub fn account_number() -> Result<String> {
    account_number_from(env::var(ACCOUNT_NUMBER_VAR).ok())
}

/// Validate a raw account number value. Unset or blank is an error.
pub fn account_number_from(raw: Option<String>) -> Result<String> {
    let account = raw.unwrap_or_default().trim().to_string();
    if account.is_empty() {
        return Err(CleanerError::MissingAccountNumber);
    }
    Ok(account)
}

/// API base URL, overridable for staging or local testing
pub fn api_base() -> String {
    api_base_from(env::var(API_BASE_VAR).ok())
}

pub fn api_base_from(raw: Option<String>) -> String {
    raw.map(|base| base.trim().to_string())
        .filter(|base| !base.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}
