use std::io::Write;

use anyhow::Result;
use tempfile::NamedTempFile;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

use super::*;
use crate::application::cli;
use crate::infrastructure::logging::LogBuffer;
use crate::infrastructure::logging::LogBufferLayer;

const CONFIG_TOML: &str = r#"
tenant = "globex"
log-level = "debug"
timeout = 2500
match-threshold = 0.9

[[tenants]]
id = "acme"
name = "ACME Corp"
url = "https://acme.physna.com/api"
access-token = "secret"

[[tenants]]
id = "globex"
url = "https://globex.physna.com/api/"
"#;

#[test]
fn it_parses_settings_and_tenants() -> Result<()> {
    let parsed = Config::parse_document(&cli::build(), CONFIG_TOML)?;

    assert_eq!(
        parsed.values,
        vec![
            (ConfigKey::Tenant, "globex".to_string()),
            (ConfigKey::LogLevel, "debug".to_string()),
            (ConfigKey::Timeout, "2500".to_string()),
            (ConfigKey::MatchThreshold, "0.9".to_string()),
        ]
    );

    assert_eq!(parsed.tenants.len(), 2);
    assert_eq!(
        parsed.tenants[0],
        Tenant {
            id: "acme".to_string(),
            name: Some("ACME Corp".to_string()),
            url: "https://acme.physna.com/api".to_string(),
            access_token: Some("secret".to_string()),
        }
    );
    assert_eq!(parsed.tenants[1].id, "globex");
    assert_eq!(parsed.tenants[1].name, None);
    assert_eq!(parsed.tenants[1].access_token, None);

    return Ok(());
}

#[test]
fn it_accepts_a_file_without_tenants() -> Result<()> {
    let parsed = Config::parse_document(&cli::build(), "log-level = \"warn\"\n")?;

    assert!(parsed.tenants.is_empty());
    assert_eq!(
        parsed.values,
        vec![(ConfigKey::LogLevel, "warn".to_string())]
    );

    return Ok(());
}

#[test]
fn it_rejects_values_outside_the_possible_values() {
    let err = Config::parse_document(&cli::build(), "log-level = \"verbose\"\n").unwrap_err();

    assert!(err
        .to_string()
        .contains("config.toml has an invalid value for key 'log-level': verbose"));
    assert!(err.to_string().contains("trace, debug, info, warn, error"));
}

#[test]
fn it_rejects_invalid_numbers() {
    let err = Config::parse_document(&cli::build(), "timeout = \"soon\"\n").unwrap_err();
    assert!(format!("{err:#}").contains("'timeout' must be a number of milliseconds"));

    let err = Config::parse_document(&cli::build(), "match-threshold = 1.5\n").unwrap_err();
    assert!(format!("{err:#}").contains("'match-threshold' must be between 0 and 1"));
}

#[test]
fn it_rejects_invalid_tenants() {
    let cmd = cli::build();

    let err = Config::parse_document(&cmd, "[[tenants]]\nurl = \"https://a.physna.com\"\n")
        .unwrap_err();
    assert_eq!(err.to_string(), "tenant #1 in config.toml is missing an 'id'");

    let err = Config::parse_document(&cmd, "[[tenants]]\nid = \"acme\"\n").unwrap_err();
    assert_eq!(err.to_string(), "tenant 'acme' in config.toml is missing a 'url'");

    let duplicated = r#"
[[tenants]]
id = "acme"
url = "https://a.physna.com"

[[tenants]]
id = "acme"
url = "https://b.physna.com"
"#;
    let err = Config::parse_document(&cmd, duplicated).unwrap_err();
    assert_eq!(
        err.to_string(),
        "tenant 'acme' is defined more than once in config.toml"
    );

    let err = Config::parse_document(&cmd, "tenants = [\"acme\"]\n").unwrap_err();
    assert!(err.to_string().contains("must be an array of tables"));

    let err = Config::parse_document(&cmd, "[[tenants]]\nid = \"acme\"\nurl = \"acme\"\n")
        .unwrap_err();
    assert!(err.to_string().contains("invalid url"));
}

#[test]
fn it_rejects_invalid_toml() {
    assert!(Config::parse_document(&cli::build(), "tenant = ").is_err());
}

#[test]
fn it_serializes_a_default_config_that_parses() -> Result<()> {
    let cmd = cli::build();
    let serialized = Config::serialize_default(&cmd);

    assert!(serialized.contains("log-level = \"info\""));
    assert!(serialized.contains("[possible values: trace, debug, info, warn, error]"));
    assert!(serialized.contains("timeout = 10000"));
    assert!(serialized.contains("match-threshold = 0.8"));
    assert!(serialized.contains("# tenant = \"\""));
    assert!(serialized.contains("# [[tenants]]"));
    assert!(!serialized.contains("config-file"));

    let parsed = Config::parse_document(&cmd, &serialized)?;
    assert!(parsed.tenants.is_empty());

    return Ok(());
}

#[tokio::test]
async fn it_loads_the_config_file_with_cli_overrides() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    write!(file, "{CONFIG_TOML}")?;
    let path = file.path().to_string_lossy().to_string();

    let cmd = cli::build();
    let matches = cmd.clone().try_get_matches_from([
        "ptui",
        "--config-file",
        path.as_str(),
        "--timeout",
        "500",
    ])?;

    Config::load(&cmd, vec![&matches]).await?;

    assert_eq!(Config::get(ConfigKey::ConfigFile), path);
    assert_eq!(Config::get(ConfigKey::Tenant), "globex");
    assert_eq!(Config::get(ConfigKey::LogLevel), "debug");
    assert_eq!(Config::get(ConfigKey::Timeout), "500");
    assert_eq!(Config::get(ConfigKey::MatchThreshold), "0.9");
    assert_eq!(
        Config::get(ConfigKey::LogFile),
        Config::default(ConfigKey::LogFile)
    );

    let tenants = Config::tenants();
    assert_eq!(tenants.len(), 2);
    assert_eq!(tenants[0].display_name(), "ACME Corp");

    let bad_matches =
        cmd.clone()
            .try_get_matches_from(["ptui", "--config-file", path.as_str(), "--timeout", "0"])?;
    assert!(Config::load(&cmd, vec![&bad_matches]).await.is_err());

    return Ok(());
}

#[test]
fn it_logs_the_effective_config() {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::registry().with(LogBufferLayer::new(buffer.clone()));

    tracing::subscriber::with_default(subscriber, Config::log_effective);

    let lines = buffer.tail(10);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].level, Level::DEBUG);
    assert!(lines[0].message.starts_with("effective config"));
    assert!(lines[0].message.contains("log_level="));
    assert!(lines[0].message.contains("tenants="));
}
