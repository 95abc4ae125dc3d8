#![deny(unsafe_code)]

mod config;
mod constants;
mod credential;
mod manager;
mod page;
mod switcher;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::Settings;
use crate::constants::page::CONFIG_SELECT_ID;
use crate::credential::{CookieCredentials, CookieSource, CredentialProvider};
use crate::page::{LoggingEnhancer, Page, SelectControl};
use crate::switcher::{ConfigSwitcher, HttpTransport, SwitchEvent, TracingReporter};

#[derive(Parser)]
#[command(name = "config-switcher")]
#[command(version)]
#[command(about = "Switch the active guardrail configuration on a proxy portal", long_about = None)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Portal base URL, overriding the settings file
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Cookie string in `name=value; name2=value2` form
    #[arg(long, global = true, conflicts_with = "cookie_file")]
    cookie: Option<String>,

    /// File holding the cookie string, re-read for every switch
    #[arg(long, global = true)]
    cookie_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Select each configuration in turn without waiting for the previous answer
    Switch {
        #[arg(required = true)]
        config_ids: Vec<String>,
    },
    /// Print the configurations available to the current token
    List,
    /// Open the configuration dropdown window
    Gui,
    /// Write default settings to the settings file
    InitConfig,
}

fn init_logging(debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Command line values win over the settings file
fn apply_overrides(settings: &mut Settings, base_url: Option<String>, cookie_file: Option<PathBuf>) {
    if let Some(base_url) = base_url {
        settings.server.base_url = base_url;
    }
    if let Some(cookie_file) = cookie_file {
        settings.credential.cookie_file = Some(cookie_file);
    }
}

fn credentials_from(settings: &Settings, inline_cookie: Option<String>) -> CookieCredentials {
    let source = match (inline_cookie, &settings.credential.cookie_file) {
        (Some(raw), _) => CookieSource::Inline(raw),
        (None, Some(path)) => CookieSource::File(path.clone()),
        (None, None) => {
            warn!("No cookie or cookie file configured; switches will fail for lack of a credential");
            CookieSource::Inline(String::new())
        }
    };

    CookieCredentials::new(source, settings.credential.cookie_name.clone())
}

fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("Settings file already exists at {:?}", path);
    }
    Settings::default().save_to(path)
}

fn run_switch(
    settings: &Settings,
    credentials: CookieCredentials,
    config_ids: Vec<String>,
) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    let mut page = Page::new(vec![SelectControl::config_select(
        settings.configs.iter().cloned(),
    )])?;
    page.on_ready(&mut LoggingEnhancer);

    let switcher = ConfigSwitcher::new(
        HttpTransport::new(&settings.server)?,
        credentials,
        TracingReporter,
        runtime.handle().clone(),
    );

    let mut handles = Vec::new();
    for config_id in &config_ids {
        match page.select(CONFIG_SELECT_ID, config_id)? {
            Some(event) => handles.extend(switcher.handle_change(&event)),
            None => info!(config_id = %config_id, "Already selected, no change"),
        }
    }

    let events = runtime.block_on(async {
        let mut events = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(event) => events.push(event),
                Err(err) => error!(error = %err, "Switch task did not complete"),
            }
        }
        events
    });

    let failed = events
        .iter()
        .filter(|event| matches!(event, SwitchEvent::Failed { .. }))
        .count();
    info!(total = events.len(), failed, "Switch requests finished");
    Ok(())
}

fn run_list(settings: &Settings, credentials: CookieCredentials) -> Result<()> {
    let credential = credentials.credential().ok_or_else(|| {
        anyhow!(
            "credential cookie '{}' is not set",
            credentials.cookie_name()
        )
    })?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    let transport = HttpTransport::new(&settings.server)?;
    let ids = runtime
        .block_on(transport.list_configs(&credential.token))
        .context("Failed to fetch config catalog")?;

    for id in ids {
        println!("{id}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let Cli {
        config,
        base_url,
        cookie,
        cookie_file,
        debug,
        command,
    } = Cli::parse();

    init_logging(debug)?;

    let settings_path = config.unwrap_or_else(Settings::path);
    if command == Command::InitConfig {
        return init_config(&settings_path);
    }

    let mut settings = Settings::load_from(&settings_path)?;
    apply_overrides(&mut settings, base_url, cookie_file);
    let credentials = credentials_from(&settings, cookie);

    match command {
        Command::Switch { config_ids } => run_switch(&settings, credentials, config_ids),
        Command::List => run_list(&settings, credentials),
        Command::Gui => manager::run_gui(settings, credentials),
        Command::InitConfig => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_switch_with_global_flags() {
        let cli = Cli::try_parse_from([
            "config-switcher",
            "switch",
            "A",
            "B",
            "--cookie",
            "proxy=T",
            "--base-url",
            "http://portal:8500",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Command::Switch {
                config_ids: vec!["A".to_string(), "B".to_string()]
            }
        );
        assert_eq!(cli.cookie.as_deref(), Some("proxy=T"));
        assert_eq!(cli.base_url.as_deref(), Some("http://portal:8500"));
    }

    #[test]
    fn test_switch_requires_an_id() {
        assert!(Cli::try_parse_from(["config-switcher", "switch"]).is_err());
    }

    #[test]
    fn test_cookie_and_cookie_file_conflict() {
        let result = Cli::try_parse_from([
            "config-switcher",
            "--cookie",
            "proxy=T",
            "--cookie-file",
            "/tmp/cookies",
            "list",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut settings = Settings::default();
        apply_overrides(
            &mut settings,
            Some("http://other:1234".to_string()),
            Some(PathBuf::from("/tmp/cookies")),
        );

        assert_eq!(settings.server.base_url, "http://other:1234");
        assert_eq!(
            settings.credential.cookie_file,
            Some(PathBuf::from("/tmp/cookies"))
        );
    }

    #[test]
    fn test_inline_cookie_takes_precedence() {
        let mut settings = Settings::default();
        settings.credential.cookie_file = Some(PathBuf::from("/nonexistent/cookies"));

        let credentials = credentials_from(&settings, Some("proxy=inline".to_string()));
        assert_eq!(credentials.credential().unwrap().token, "inline");
    }

    #[test]
    fn test_no_cookie_source_means_no_credential() {
        let credentials = credentials_from(&Settings::default(), None);
        assert!(credentials.credential().is_none());
        assert_eq!(credentials.cookie_name(), "proxy");
    }

    #[test]
    fn test_init_config_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        init_config(&path).unwrap();
        assert!(path.exists());
        assert!(init_config(&path).is_err());
    }
}
