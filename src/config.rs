use std::fs;

use clap::ArgMatches;
use serde::{Deserialize, Serialize};

const CONFIG: &str = "config";
const FILE: &str = "file";

/// Fixed relative path of the backing data file, matching the format every
/// deployment of this tool already writes.
pub const DEFAULT_FILE_PATH: &str = "file.json";

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_file_path")]
    pub file: String,
}

fn default_file_path() -> String {
    DEFAULT_FILE_PATH.to_owned()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: default_file_path(),
        }
    }
}

impl From<&ArgMatches> for Config {
    fn from(value: &ArgMatches) -> Self {
        let mut config = value.get_one::<String>(CONFIG).map_or_else(Self::default, |path| {
            let data = fs::read_to_string(shellexpand::tilde(path).to_string()).expect("Unable to read config file");

            serde_json::from_str(&data).expect("JSON does not have correct format.")
        });

        if let Some(file) = value.get_one::<String>(FILE) {
            config.file = shellexpand::tilde(file).to_string();
        }

        config
    }
}
