#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;
use std::sync::RwLock;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

use crate::domain::models::Tenant;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);
static TENANTS: Lazy<RwLock<Vec<Tenant>>> = Lazy::new(|| RwLock::new(vec![]));

const TENANTS_EXAMPLE: &str = r#"# Tenants listed on startup. Each needs a unique id and the API url of the tenant.
# [[tenants]]
# id = "acme"
# name = "ACME Corp"
# url = "https://acme.physna.com/api"
# access-token = """#;

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ConfigFile,
    Tenant,
    LogFile,
    LogLevel,
    Timeout,
    MatchThreshold,
}

/// Settings read from a config file, before they are applied to `Config`.
#[derive(Debug, Default)]
pub struct ConfigDocument {
    pub values: Vec<(ConfigKey, String)>,
    pub tenants: Vec<Tenant>,
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn tenants() -> Vec<Tenant> {
        if let Ok(tenants) = TENANTS.read() {
            return tenants.clone();
        }

        return vec![];
    }

    fn set_tenants(tenants: Vec<Tenant>) {
        if let Ok(mut current) = TENANTS.write() {
            *current = tenants;
        }
    }

    pub fn default(key: ConfigKey) -> String {
        let config_dir = Config::config_dir();
        let cache_dir = dirs::cache_dir().unwrap_or_else(env::temp_dir);

        let res = match key {
            ConfigKey::ConfigFile => config_dir
                .join("ptui/config.toml")
                .to_string_lossy()
                .to_string(),
            ConfigKey::LogFile => cache_dir.join("ptui/ptui.log").to_string_lossy().to_string(),
            ConfigKey::LogLevel => "info".to_string(),
            ConfigKey::Timeout => "10000".to_string(),
            ConfigKey::MatchThreshold => "0.8".to_string(),
            ConfigKey::Tenant => "".to_string(),
        };

        return res;
    }

    fn config_dir() -> path::PathBuf {
        #[cfg(target_os = "macos")]
        {
            if let Ok(home) = env::var("HOME") {
                return path::PathBuf::from(home).join(".config");
            }
        }

        return dirs::config_dir().unwrap_or_else(|| path::PathBuf::from("."));
    }

    pub fn validate(key: ConfigKey, value: &str) -> Result<()> {
        match key {
            ConfigKey::Timeout => {
                let timeout = value
                    .parse::<u64>()
                    .with_context(|| format!("'{key}' must be a number of milliseconds, got '{value}'"))?;
                if timeout == 0 {
                    bail!("'{key}' must be greater than 0");
                }
            }
            ConfigKey::MatchThreshold => {
                let threshold = value
                    .parse::<f64>()
                    .with_context(|| format!("'{key}' must be a number, got '{value}'"))?;
                if !(0.0..=1.0).contains(&threshold) {
                    bail!("'{key}' must be between 0 and 1, got '{value}'");
                }
            }
            _ => {}
        }

        return Ok(());
    }

    /// Resolves the config file path, a CLI or environment value wins over the default.
    pub fn config_file(clap_arg_matches: &[&ArgMatches]) -> String {
        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                if !arg_config_file.is_empty() {
                    config_file = arg_config_file.to_string();
                }
            }
        }

        return config_file;
    }

    pub fn parse_document(cmd: &Command, toml_str: &str) -> Result<ConfigDocument> {
        let doc = toml_str.parse::<toml_edit::Document>()?;
        let mut parsed = ConfigDocument::default();

        for key in ConfigKey::iter() {
            if key == ConfigKey::ConfigFile {
                continue;
            }

            if let Some(val) = doc.get(&key.to_string()) {
                // Use clap value parsers to do validation.
                let mut possible_values = vec![];
                if let Some(arg) = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))
                {
                    if !arg.get_possible_values().is_empty() {
                        possible_values = arg
                            .get_possible_values()
                            .iter()
                            .map(|e| return e.get_name().to_string())
                            .collect::<Vec<String>>();
                    }
                }

                let value = if let Some(val_int) = val.as_integer() {
                    val_int.to_string()
                } else if let Some(val_float) = val.as_float() {
                    val_float.to_string()
                } else if let Some(val_str) = val.as_str() {
                    if val_str.is_empty() {
                        continue;
                    }
                    if !possible_values.is_empty()
                        && !possible_values.contains(&val_str.to_string())
                    {
                        bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                    }
                    val_str.to_string()
                } else {
                    bail!("config.toml has an invalid value for key '{key}': expected a string or a number");
                };

                Config::validate(key, &value)
                    .with_context(|| format!("config.toml has an invalid value for key '{key}'"))?;
                parsed.values.push((key, value));
            }
        }

        parsed.tenants = parse_tenants(&doc)?;

        return Ok(parsed);
    }

    pub async fn load(cmd: &Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }
        Config::set_tenants(vec![]);

        let config_file = Config::config_file(&clap_arg_matches);
        Config::set(ConfigKey::ConfigFile, &config_file);

        let config_path = path::PathBuf::from(&config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(&config_path)
                .await
                .with_context(|| format!("failed to read {config_file}"))?;
            let parsed = Config::parse_document(cmd, &toml_str)
                .with_context(|| format!("failed to load {config_file}"))?;

            for (key, value) in parsed.values {
                Config::set(key, &value);
            }
            Config::set_tenants(parsed.tenants);
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::validate(key, val)?;
                    Config::set(key, val)
                }
            }
        }

        return Ok(());
    }

    /// Logs the settings in effect. Only useful once a subscriber is installed.
    pub fn log_effective() {
        tracing::debug!(
            config_file = Config::get(ConfigKey::ConfigFile),
            tenant = Config::get(ConfigKey::Tenant),
            log_file = Config::get(ConfigKey::LogFile),
            log_level = Config::get(ConfigKey::LogLevel),
            timeout = Config::get(ConfigKey::Timeout),
            match_threshold = Config::get(ConfigKey::MatchThreshold),
            tenants = Config::tenants().len(),
            "effective config"
        );
    }

    pub fn serialize_default(cmd: &Command) -> String {
        let mut sections = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))?;

                let mut description = arg.get_help()?.to_string();

                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                if !arg.get_possible_values().is_empty() {
                    let possible_values = arg
                        .get_possible_values()
                        .iter()
                        .map(|e| return e.get_name())
                        .collect::<Vec<_>>()
                        .join(", ");
                    description = format!("{description} [possible values: {}]", possible_values);
                }

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<f64>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{}\"", val.replace('\\', "\\\\"));
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>();

        sections.push(TENANTS_EXAMPLE.to_string());

        return sections.join("\n\n");
    }
}

/// Reads the `[[tenants]]` tables of a config file, in file order.
pub fn parse_tenants(doc: &toml_edit::Document) -> Result<Vec<Tenant>> {
    let Some(item) = doc.get("tenants") else {
        return Ok(vec![]);
    };

    let Some(tables) = item.as_array_of_tables() else {
        bail!("config.toml key 'tenants' must be an array of tables ([[tenants]])");
    };

    let mut tenants: Vec<Tenant> = vec![];
    for (index, table) in tables.iter().enumerate() {
        let get_str = |key: &str| {
            return table
                .get(key)
                .and_then(|val| val.as_str())
                .map(|val| val.trim().to_string())
                .filter(|val| !val.is_empty());
        };

        let Some(id) = get_str("id") else {
            bail!("tenant #{} in config.toml is missing an 'id'", index + 1);
        };
        let Some(url) = get_str("url") else {
            bail!("tenant '{id}' in config.toml is missing a 'url'");
        };
        if tenants.iter().any(|tenant| tenant.id == id) {
            bail!("tenant '{id}' is defined more than once in config.toml");
        }

        let tenant = Tenant {
            id,
            name: get_str("name"),
            url,
            access_token: get_str("access-token"),
        };
        tenant.validate()?;
        tenants.push(tenant);
    }

    return Ok(tenants);
}
