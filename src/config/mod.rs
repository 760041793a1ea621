pub mod error;
pub mod load;
pub mod paths;
pub mod settings;

pub use error::ConfigError;
pub use load::load_global_settings;
pub use paths::{
    default_global_config_path, default_session_log_path, BACKEND_URL_ENV, GLOBAL_SETTINGS_FILE_NAME,
    GLOBAL_STATE_DIR,
};
pub use settings::{
    Settings, DEFAULT_BACKEND_URL, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_home<T>(home: &std::path::Path, f: impl FnOnce() -> T) -> T {
        let old_home = std::env::var_os("HOME");
        let old_url = std::env::var_os(BACKEND_URL_ENV);
        std::env::set_var("HOME", home);
        std::env::remove_var(BACKEND_URL_ENV);
        let out = f();
        match old_home {
            Some(value) => std::env::set_var("HOME", value),
            None => std::env::remove_var("HOME"),
        }
        match old_url {
            Some(value) => std::env::set_var(BACKEND_URL_ENV, value),
            None => std::env::remove_var(BACKEND_URL_ENV),
        }
        out
    }

    #[test]
    fn missing_settings_file_yields_defaults() {
        let _guard = ENV_LOCK.lock().expect("env lock");
        let temp = tempdir().expect("temp dir");

        let settings = with_home(temp.path(), load_global_settings).expect("load settings");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(settings.poll_interval_secs, 5);
    }

    #[test]
    fn settings_file_values_override_defaults() {
        let _guard = ENV_LOCK.lock().expect("env lock");
        let temp = tempdir().expect("temp dir");
        fs::create_dir_all(temp.path().join(".taskgraph")).expect("create config dir");
        fs::write(
            temp.path().join(".taskgraph/config.yaml"),
            "backend_url: http://backend.local:8080/\npoll_interval_secs: 2\nlog_path: /tmp/tg.log\n",
        )
        .expect("write config");

        let settings = with_home(temp.path(), load_global_settings).expect("load settings");
        assert_eq!(settings.backend_url, "http://backend.local:8080/");
        assert_eq!(settings.poll_interval_secs, 2);
        assert_eq!(settings.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(
            settings.resolve_log_path().expect("log path"),
            std::path::PathBuf::from("/tmp/tg.log")
        );
    }

    #[test]
    fn environment_overrides_backend_url() {
        let _guard = ENV_LOCK.lock().expect("env lock");
        let temp = tempdir().expect("temp dir");

        let settings = with_home(temp.path(), || {
            std::env::set_var(BACKEND_URL_ENV, "https://workflows.example");
            load_global_settings()
        })
        .expect("load settings");
        assert_eq!(settings.backend_url, "https://workflows.example");
    }

    #[test]
    fn validation_rejects_bad_url_and_zero_interval() {
        let mut settings = Settings {
            backend_url: "ftp://nope".to_string(),
            ..Settings::default()
        };
        let err = settings.validate().expect_err("bad scheme");
        assert!(err.to_string().contains("backend_url"));

        settings.backend_url = DEFAULT_BACKEND_URL.to_string();
        settings.poll_interval_secs = 0;
        let err = settings.validate().expect_err("zero interval");
        assert!(err.to_string().contains("poll_interval_secs"));
    }

    #[test]
    fn unknown_settings_fields_are_rejected() {
        let err = serde_yaml::from_str::<Settings>("backend_url: http://x\nbogus: 1\n")
            .expect_err("unknown field");
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn default_log_path_lives_under_state_dir() {
        let _guard = ENV_LOCK.lock().expect("env lock");
        let temp = tempdir().expect("temp dir");
        let path = with_home(temp.path(), default_session_log_path).expect("log path");
        assert_eq!(path, temp.path().join(".taskgraph/logs/session.log"));
    }
}
