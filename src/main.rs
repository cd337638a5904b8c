//! Command-line front end of the dictionary translator.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::{
    Path,
    PathBuf,
};
use std::process::ExitCode;

use clap::{
    Parser,
    Subcommand,
};
use dictionary_translator::config::{
    ConfigManager,
    TranslatorSettings,
};
use dictionary_translator::dictionary::load_dictionary;
use dictionary_translator::indexer::find_dictionaries;
use dictionary_translator::types::{
    CountOrParams,
    Params,
    Translation,
};
use dictionary_translator::Translator;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Parser)]
#[command(name = "dictionary-translator", version, about = "Translate dotted message keys")]
struct Cli {
    /// Workspace root holding `.translator.json`
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Dictionary directory, overrides the configuration
    #[arg(long, global = true)]
    directory: Option<PathBuf>,

    /// Language, overrides the configuration
    #[arg(long, global = true)]
    language: Option<String>,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Translate one message key
    Translate {
        /// Message key, e.g. `web.pages.homepage.promo.title`
        key: String,

        /// Plural count
        #[arg(short, long)]
        count: Option<u64>,

        /// Placeholder value (`name=value`), repeatable
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// Zip two list messages into a key/value mapping
    Pairs {
        /// Common key prefix, e.g. `web.pages.homepage.promo`
        base: String,
        /// Name of the message holding the keys
        keys: String,
        /// Name of the message holding the values
        values: String,
    },

    /// Load every dictionary of the language and report failures
    Check,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected `name=value`, got '{raw}'"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_file.as_deref());

    match run(cli) {
        Ok(code) => code,
        Err(message) => {
            report_error(&message);
            ExitCode::FAILURE
        }
    }
}

/// Installs the subscriber. The returned guard flushes the log file on drop.
fn init_logging(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if let Some(path) = log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file);
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter)
                    .with_ansi(false)
                    .with_writer(non_blocking)
                    .init();
                tracing::debug!(path = %path.display(), "Logging initialized");
                return Some(guard);
            }
            Err(e) => {
                report_error(&format!("Cannot open log file {}: {e}", path.display()));
            }
        }
    }

    tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(std::io::stderr).init();
    None
}

fn run(cli: Cli) -> Result<ExitCode, String> {
    let settings = load_settings(&cli)?;
    let mut translator = Translator::from_settings(&settings).map_err(|e| e.to_string())?;

    match cli.command {
        Command::Translate { key, count, params } => {
            let params: Params = params.into_iter().collect();
            let translation = translator
                .translate(&key, count.map(CountOrParams::Count), &params)
                .map_err(|e| e.to_string())?;

            match translation {
                Some(translation) => {
                    print_translation(&translation);
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    report_error(&format!("Translation not found: {key}"));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Pairs { base, keys, values } => {
            let pairs: BTreeMap<_, _> = translator
                .translate_pairs(&base, &keys, &values)
                .map_err(|e| e.to_string())?
                .into_iter()
                .collect();
            let json = serde_json::to_string_pretty(&pairs).map_err(|e| e.to_string())?;
            print_line(&json);
            Ok(ExitCode::SUCCESS)
        }
        Command::Check => check(&settings),
    }
}

/// Workspace settings with the command-line overrides applied.
fn load_settings(cli: &Cli) -> Result<TranslatorSettings, String> {
    let mut manager = ConfigManager::new();
    manager.load_settings(cli.workspace.clone()).map_err(|e| e.to_string())?;

    let mut settings = manager.get_settings().clone();
    if let Some(directory) = &cli.directory {
        settings.directory.clone_from(directory);
    }
    if let Some(language) = &cli.language {
        settings.language.clone_from(language);
    }
    manager.update_settings(settings).map_err(|e| e.to_string())?;

    Ok(manager.get_settings().clone())
}

fn check(settings: &TranslatorSettings) -> Result<ExitCode, String> {
    let files =
        find_dictionaries(&settings.directory, &settings.language).map_err(|e| e.to_string())?;
    let mut failures = 0_usize;

    for file in &files {
        match load_dictionary(&settings.directory, &file.path, &file.category, &settings.language)
        {
            Ok(loaded) => print_line(&format!(
                "ok    {} ({} messages)",
                file.message_prefix(),
                loaded.data.len()
            )),
            Err(e) => {
                failures += 1;
                print_line(&format!("error {}: {e}", file.message_prefix()));
            }
        }
    }

    print_line(&format!("{} dictionaries checked, {failures} failed", files.len()));
    Ok(if failures == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn print_translation(translation: &Translation) {
    match translation {
        Translation::Text(text) => print_line(text),
        Translation::List(items) => items.iter().for_each(|item| print_line(item)),
    }
}

#[allow(clippy::print_stdout)]
fn print_line(line: &str) {
    println!("{line}");
}

#[allow(clippy::print_stderr)]
fn report_error(message: &str) {
    eprintln!("error: {message}");
}
