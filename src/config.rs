// Configuration module for refscan
// Reads from environment variables with sensible defaults

use std::env;
use std::sync::OnceLock;

static CONFIG: OnceLock<Config> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Config {
    /// Largest file the file scanner will read, in bytes
    /// (REFSCAN_MAX_FILE_BYTES). Larger files are skipped with a warning.
    pub max_file_bytes: u64,

    /// Walk files that ignore files would exclude (REFSCAN_NO_IGNORE).
    pub no_ignore: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_file_bytes: 16 * 1024 * 1024,
            no_ignore: false,
        }
    }
}

impl Config {
    fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(val) = env::var("REFSCAN_MAX_FILE_BYTES") {
            if let Ok(parsed) = val.parse() {
                config.max_file_bytes = parsed;
            } else {
                eprintln!(
                    "refscan: Warning: Invalid REFSCAN_MAX_FILE_BYTES value: {}, using default: {}",
                    val, config.max_file_bytes
                );
            }
        }

        if let Ok(val) = env::var("REFSCAN_NO_IGNORE") {
            match val.as_str() {
                "1" | "true" | "yes" => config.no_ignore = true,
                "0" | "false" | "no" | "" => config.no_ignore = false,
                other => {
                    eprintln!(
                        "refscan: Warning: Invalid REFSCAN_NO_IGNORE value: {}, using default: {}",
                        other, config.no_ignore
                    );
                }
            }
        }

        config
    }

    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::from_env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_file_bytes, 16 * 1024 * 1024);
        assert!(!config.no_ignore);
    }
}
