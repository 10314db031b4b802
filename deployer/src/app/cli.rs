//! Command line arguments

use std::collections::HashMap;
use std::path::PathBuf;

/// Parsed command line.
///
/// Accepts `--key=value`, bare `--flag` (meaning `true`), `-v` for
/// `--verbose` and `-c <path>` / `--config <path>` for the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub values: HashMap<String, String>,
}

impl CliArgs {
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values = HashMap::new();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            if let Some((key, value)) = arg.split_once('=') {
                let clean_key = key.trim_start_matches('-');
                values.insert(clean_key.to_string(), value.to_string());
            } else if arg == "-c" || arg == "--config" {
                if let Some(path) = args.next() {
                    values.insert("config".to_string(), path);
                }
            } else if arg == "-v" {
                values.insert("verbose".to_string(), "true".to_string());
            } else if arg.starts_with("--") {
                let clean_key = arg.trim_start_matches('-');
                values.insert(clean_key.to_string(), "true".to_string());
            }
        }

        Self { values }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Explicitly requested config file
    pub fn config_path(&self) -> Option<PathBuf> {
        self.values.get("config").map(PathBuf::from)
    }
}
