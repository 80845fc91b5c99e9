use std::io;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgMatches;
use clap::Command;
use clap_complete::Shell;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Tenant;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn arg_config_file() -> Arg {
    return Arg::new(ConfigKey::ConfigFile.to_string())
        .short('c')
        .long(ConfigKey::ConfigFile.to_string())
        .env("PTUI_CONFIG_FILE")
        .num_args(1)
        .global(true)
        .help(format!(
            "Path to the configuration file listing the tenants [default: {}]",
            Config::default(ConfigKey::ConfigFile)
        ));
}

fn arg_tenant() -> Arg {
    return Arg::new(ConfigKey::Tenant.to_string())
        .short('t')
        .long(ConfigKey::Tenant.to_string())
        .env("PTUI_TENANT")
        .num_args(1)
        .global(true)
        .help("Id of the tenant to connect to on startup, skipping the tenant list");
}

fn arg_log_file() -> Arg {
    return Arg::new(ConfigKey::LogFile.to_string())
        .long(ConfigKey::LogFile.to_string())
        .env("PTUI_LOG_FILE")
        .num_args(1)
        .global(true)
        .help(format!(
            "File the application logs are written to [default: {}]",
            Config::default(ConfigKey::LogFile)
        ));
}

fn arg_log_level() -> Arg {
    return Arg::new(ConfigKey::LogLevel.to_string())
        .long(ConfigKey::LogLevel.to_string())
        .env("PTUI_LOG_LEVEL")
        .num_args(1)
        .global(true)
        .value_parser(PossibleValuesParser::new(LOG_LEVELS))
        .help(format!(
            "Minimum level of the log messages that are recorded [default: {}]",
            Config::default(ConfigKey::LogLevel)
        ));
}

fn arg_timeout() -> Arg {
    return Arg::new(ConfigKey::Timeout.to_string())
        .long(ConfigKey::Timeout.to_string())
        .env("PTUI_TIMEOUT")
        .num_args(1)
        .global(true)
        .help(format!(
            "Time in milliseconds to wait for a response from a tenant [default: {}]",
            Config::default(ConfigKey::Timeout)
        ));
}

fn arg_match_threshold() -> Arg {
    return Arg::new(ConfigKey::MatchThreshold.to_string())
        .long(ConfigKey::MatchThreshold.to_string())
        .env("PTUI_MATCH_THRESHOLD")
        .num_args(1)
        .global(true)
        .help(format!(
            "Minimum similarity, between 0 and 1, for a model to be listed as a match [default: {}]",
            Config::default(ConfigKey::MatchThreshold)
        ));
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions")
        .arg(
            Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for")
                .required(true)
                .value_parser(value_parser!(Shell)),
        );
}

fn subcommand_manpages() -> Command {
    return Command::new("manpages").about("Generates manpages");
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file helpers")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("default").about("Prints the default configuration file to stdout"),
        )
        .subcommand(Command::new("path").about("Prints the path of the configuration file"));
}

fn subcommand_tenants() -> Command {
    return Command::new("tenants").about("Lists the tenants of the configuration file");
}

pub fn build() -> Command {
    return Command::new("ptui")
        .about("Physna Terminal User Interface")
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(false)
        .arg(arg_config_file())
        .arg(arg_tenant())
        .arg(arg_log_file())
        .arg(arg_log_level())
        .arg(arg_timeout())
        .arg(arg_match_threshold())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_manpages())
        .subcommand(subcommand_config())
        .subcommand(subcommand_tenants());
}

pub fn format_tenant(tenant: &Tenant, default_tenant: &str) -> String {
    let marker = if tenant.id == default_tenant { "*" } else { " " };
    let mut line = format!("{marker} {}", Paint::new(&tenant.id).bold());
    if let Some(name) = tenant.name.as_ref().filter(|name| !name.is_empty()) {
        line = format!("{line} ({name})");
    }

    return format!("{line}  {}", Paint::cyan(&tenant.url));
}

fn print_tenants() {
    let default_tenant = Config::get(ConfigKey::Tenant);
    for tenant in Config::tenants() {
        println!("{}", format_tenant(&tenant, &default_tenant));
    }
}

/// Tenants to offer in the UI. Fails when the config file doesn't provide any.
pub fn ensure_tenants() -> Result<Vec<Tenant>> {
    let tenants = Config::tenants();
    if !tenants.is_empty() {
        return Ok(tenants);
    }

    let config_file = Config::get(ConfigKey::ConfigFile);
    if !std::path::Path::new(&config_file).exists() {
        bail!(
            "The configuration file {config_file} does not exist.\nCreate it with `ptui config default > {config_file}` and add your tenants."
        );
    }

    bail!("The configuration file {config_file} does not list any tenants.\nAdd at least one [[tenants]] table, run `ptui config default` for an example.");
}

/// Parses the command line. Returns true when the terminal UI should start.
pub async fn parse() -> Result<bool> {
    let cmd = build();
    let matches = cmd.clone().get_matches();

    return handle_matches(&cmd, &matches).await;
}

async fn handle_matches(cmd: &Command, matches: &ArgMatches) -> Result<bool> {
    match matches.subcommand() {
        Some(("completions", subcmd_matches)) => {
            if let Some(shell) = subcmd_matches.get_one::<Shell>("shell") {
                clap_complete::generate(*shell, &mut build(), "ptui", &mut io::stdout());
            }

            return Ok(false);
        }
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
            return Ok(false);
        }
        Some(("config", subcmd_matches)) => {
            match subcmd_matches.subcommand() {
                Some(("default", _)) => {
                    println!("{}", Config::serialize_default(cmd));
                }
                Some(("path", path_matches)) => {
                    println!(
                        "{}",
                        Config::config_file(&[matches, subcmd_matches, path_matches])
                    );
                }
                _ => {
                    subcommand_config().print_help()?;
                }
            }

            return Ok(false);
        }
        Some(("tenants", subcmd_matches)) => {
            Config::load(cmd, vec![matches, subcmd_matches]).await?;
            ensure_tenants()?;
            print_tenants();

            return Ok(false);
        }
        _ => {
            Config::load(cmd, vec![matches]).await?;
            return Ok(true);
        }
    }
}
