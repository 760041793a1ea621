use super::{default_global_config_path, ConfigError, Settings, BACKEND_URL_ENV};

/// Reads `~/.taskgraph/config.yaml` (defaults when the file is absent), then
/// applies the backend URL override from the environment.
pub fn load_global_settings() -> Result<Settings, ConfigError> {
    let path = default_global_config_path()?;
    let mut settings = if path.exists() {
        Settings::from_path(&path)?
    } else {
        Settings::default()
    };
    if let Some(url) = std::env::var(BACKEND_URL_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
    {
        settings.backend_url = url.trim().to_string();
    }
    settings.validate()?;
    Ok(settings)
}
