//! Clawset — point OpenClaw at a model provider.
//!
//! Interactive wizard for the OpenClaw configuration: pick a vendor and a
//! model, enter an API key, switch the default model. Run `clawset` with no
//! arguments for the menu.

mod console;
mod flow;
mod keys;
mod menu;
mod prompt;
mod spinner;
mod tui_guard;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::EnvFilter;

use clawset_core::auth::AuthStore;
use clawset_core::catalog::{self, ModelSource, ServiceType, Vendor};
use clawset_core::config::ConfigStore;
use clawset_core::i18n::{Locale, Msg};
use clawset_core::operation::StatusIndicator;
use clawset_core::settings::{LogLevel, Settings};
use clawset_hub::sources::OpenclawCli;

use crate::console::Console;
use crate::flow::{ConfigFlow, FlowOutcome};
use crate::prompt::PromptError;
use crate::spinner::Spinner;

// ─── CLI Definition ────────────────────────────────────────

/// Clawset — configure OpenClaw providers, models and keys 🦞
#[derive(Parser)]
#[command(name = "clawset", version, about, long_about = None)]
struct Cli {
    /// OpenClaw configuration directory
    #[arg(long, global = true, env = "OPENCLAW_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Log level: debug, info, warn or error
    #[arg(
        long,
        global = true,
        env = "LOG_LEVEL",
        default_value = "info",
        value_parser = parse_log_level
    )]
    log_level: LogLevel,

    /// Language for prompts (en, zh)
    #[arg(long, global = true, env = "CLAWSET_LANG")]
    lang: Option<String>,

    #[arg(long = "system-lang", env = "LANG", hide = true)]
    system_lang: Option<String>,

    /// Program used to list the model catalog
    #[arg(long, global = true, env = "OPENCLAW_BIN", default_value = "openclaw")]
    openclaw_bin: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// ➕ Add or update a provider (vendor, model, API key)
    Add,

    /// 🔁 Switch the default model among configured ones
    Switch,

    /// 📋 Show the current configuration (keys masked)
    Show,

    /// 📁 Print the configuration file path
    Path,

    /// 📦 List the models a vendor can serve
    Models {
        /// Vendor to filter for (packycode, other)
        #[arg(long, default_value = "other")]
        vendor: Vendor,

        /// PackyCode service type (api, codex)
        #[arg(long)]
        service: Option<ServiceType>,
    },
}

/// Unknown levels fall back to `info` instead of failing.
fn parse_log_level(value: &str) -> Result<LogLevel, String> {
    Ok(LogLevel::parse_lenient(value))
}

impl Cli {
    fn settings(&self) -> Settings {
        let lang = self.lang.as_deref().or(self.system_lang.as_deref());
        Settings {
            config_dir: self
                .config_dir
                .clone()
                .unwrap_or_else(Settings::default_config_dir),
            log_level: self.log_level,
            locale: Locale::detect(lang),
            openclaw_bin: self.openclaw_bin.clone(),
        }
    }
}

// ─── Commands ──────────────────────────────────────────────

fn run_menu(settings: Arc<Settings>) -> anyhow::Result<()> {
    ui::print_banner();
    let console = Console::stdio();
    let catalog = OpenclawCli::from_settings(&settings);
    let indicator: Arc<dyn StatusIndicator> = Arc::new(Spinner::new());
    let locale = settings.locale;

    ConfigFlow::new(settings, &console, &catalog, indicator).run_config_loop()?;

    println!("\n  {}\n", locale.t(Msg::Goodbye).dimmed());
    Ok(())
}

fn run_flow<F>(settings: Arc<Settings>, step: F) -> anyhow::Result<()>
where
    F: FnOnce(&ConfigFlow<'_>) -> anyhow::Result<FlowOutcome>,
{
    let console = Console::stdio();
    let catalog = OpenclawCli::from_settings(&settings);
    let indicator: Arc<dyn StatusIndicator> = Arc::new(Spinner::new());

    let flow = ConfigFlow::new(settings, &console, &catalog, indicator);
    let outcome = step(&flow)?;
    tracing::debug!("Flow finished: {:?}", outcome);
    if outcome == FlowOutcome::Failed {
        anyhow::bail!("Configuration was not saved");
    }
    Ok(())
}

fn run_show(settings: &Settings) -> anyhow::Result<()> {
    let store = ConfigStore::new(settings);
    let config = store.load()?;
    let auth = AuthStore::new(settings).load()?;
    ui::print_summary(store.path(), &config, &auth);
    Ok(())
}

fn run_models(settings: &Settings, vendor: Vendor, service: Option<ServiceType>) -> anyhow::Result<()> {
    let spinner = Spinner::new();
    spinner.start(settings.locale.t(Msg::FetchingModels));

    let listing = match OpenclawCli::from_settings(settings).list_models() {
        Ok(listing) => {
            spinner.succeed(None);
            listing
        }
        Err(e) => {
            spinner.fail(settings.locale.t(Msg::FetchingModelsFailed));
            return Err(e.into());
        }
    };

    let models = catalog::filter_models(listing.models, vendor, service);
    if models.is_empty() {
        println!("  {} {}", "⚠".yellow(), settings.locale.t(Msg::NoModelsAvailable));
        return Ok(());
    }
    ui::print_models(&models);
    Ok(())
}

fn run(command: Option<Commands>, settings: Settings) -> anyhow::Result<()> {
    let settings = Arc::new(settings);
    match command {
        None => run_menu(settings),
        Some(Commands::Add) => run_flow(settings, |flow| flow.configure_provider()),
        Some(Commands::Switch) => run_flow(settings, |flow| flow.select_configured_model()),
        Some(Commands::Show) => run_show(&settings),
        Some(Commands::Path) => {
            println!("{}", settings.config_path().display());
            Ok(())
        }
        Some(Commands::Models { vendor, service }) => run_models(&settings, vendor, service),
    }
}

// ─── Main ──────────────────────────────────────────────────

fn init_tracing(settings: &Settings) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_directive())),
        )
        .with_writer(std::io::stderr)
        .with_ansi(::console::Term::stderr().is_term())
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let settings = cli.settings();
    init_tracing(&settings);
    tracing::debug!("Using configuration in {}", settings.config_dir().display());

    if let Err(e) = run(cli.command, settings) {
        if matches!(e.downcast_ref::<PromptError>(), Some(PromptError::Interrupted)) {
            std::process::exit(130);
        }
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
