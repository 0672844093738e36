use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_TRAINER_CMD: &str = "python train_model.py";
const DEFAULT_TRAINER_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
    pub trainer_program: String,
    pub trainer_args: Vec<String>,
    pub trainer_dir: PathBuf,
    pub trainer_timeout: Duration,
    pub nightly_job: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let data_dir = lookup("APP_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));
        let static_dir = lookup("APP_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("frontend"));

        let command = lookup("APP_TRAINER_CMD")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TRAINER_CMD.to_string());
        let mut parts = command.split_whitespace().map(str::to_string);
        let trainer_program = parts.next().unwrap_or_default();
        let trainer_args = parts.collect();

        let trainer_dir = lookup("APP_TRAINER_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.clone());
        let trainer_timeout = lookup("APP_TRAINER_TIMEOUT_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TRAINER_TIMEOUT_SECS));
        let nightly_job = lookup("APP_NIGHTLY_JOB")
            .map(|value| !matches!(value.trim(), "off" | "false" | "0"))
            .unwrap_or(true);

        Self {
            port,
            data_dir,
            static_dir,
            trainer_program,
            trainer_args,
            trainer_dir,
            trainer_timeout,
            nightly_job,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config(&[]);
        assert_eq!(config.port, 4000);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.trainer_program, "python");
        assert_eq!(config.trainer_args, vec!["train_model.py".to_string()]);
        assert_eq!(config.trainer_dir, PathBuf::from("data"));
        assert_eq!(config.trainer_timeout, Duration::from_secs(300));
        assert!(config.nightly_job);
    }

    #[test]
    fn overrides_are_read_from_the_environment() {
        let config = config(&[
            ("PORT", "8081"),
            ("APP_DATA_DIR", "/srv/kitchen"),
            ("APP_TRAINER_CMD", "python3 -u train.py"),
            ("APP_TRAINER_TIMEOUT_SECS", "30"),
            ("APP_NIGHTLY_JOB", "off"),
        ]);
        assert_eq!(config.port, 8081);
        assert_eq!(config.trainer_program, "python3");
        assert_eq!(config.trainer_args, vec!["-u", "train.py"]);
        assert_eq!(config.trainer_dir, PathBuf::from("/srv/kitchen"));
        assert_eq!(config.trainer_timeout, Duration::from_secs(30));
        assert!(!config.nightly_job);
    }

    #[test]
    fn unparseable_numbers_fall_back_to_defaults() {
        let config = config(&[("PORT", "http"), ("APP_TRAINER_TIMEOUT_SECS", "soon")]);
        assert_eq!(config.port, 4000);
        assert_eq!(config.trainer_timeout, Duration::from_secs(300));
    }
}
