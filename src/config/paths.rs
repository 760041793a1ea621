use crate::config::ConfigError;
use std::path::PathBuf;

pub const GLOBAL_STATE_DIR: &str = ".taskgraph";
pub const GLOBAL_SETTINGS_FILE_NAME: &str = "config.yaml";
pub const SESSION_LOG_FILE_NAME: &str = "logs/session.log";
pub const BACKEND_URL_ENV: &str = "TASKGRAPH_BACKEND_URL";

fn state_dir() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(GLOBAL_STATE_DIR))
}

pub fn default_global_config_path() -> Result<PathBuf, ConfigError> {
    Ok(state_dir()?.join(GLOBAL_SETTINGS_FILE_NAME))
}

pub fn default_session_log_path() -> Result<PathBuf, ConfigError> {
    Ok(state_dir()?.join(SESSION_LOG_FILE_NAME))
}
