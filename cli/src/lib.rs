//! `simple-translate` command line.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use anyhow::bail;
use clap::Parser;
use clap::Subcommand;
use simple_translate_backend_client::StdioBackend;
use simple_translate_core::ClientConfig;
use simple_translate_core::EventChannel;
use simple_translate_core::RequestDispatcher;
use simple_translate_core::SessionUpdate;
use simple_translate_core::SettingsState;
use simple_translate_core::StreamingTranslator;
use simple_translate_core::TranslationContext;
use simple_translate_core::TranslationController;
use simple_translate_core::ValidationError;
use simple_translate_protocol::AVAILABLE_MODELS;
use simple_translate_protocol::LANGUAGES;
use simple_translate_protocol::Language;
use simple_translate_protocol::Settings;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

/// Stream a translation from the configured backend.
#[derive(Debug, Parser)]
#[command(name = "simple-translate", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Text to translate. Read from stdin when omitted.
    pub text: Option<String>,

    /// Source language code. Defaults to the backend's settings.
    #[arg(long = "from", value_name = "CODE")]
    pub source_language: Option<String>,

    /// Target language code. Defaults to the backend's settings.
    #[arg(long = "to", value_name = "CODE")]
    pub target_language: Option<String>,

    /// Model override.
    #[arg(long)]
    pub model: Option<String>,

    /// API key override.
    #[arg(long, env = "SIMPLE_TRANSLATE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Backend program; overrides `backend_command` from the config file.
    #[arg(long, value_name = "PROGRAM")]
    pub backend: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List supported languages.
    Languages,
    /// List selectable models.
    Models,
    /// Show the backend's settings.
    Settings,
}

/// Install the stderr subscriber. `RUST_LOG` overrides the default `warn`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Command::Languages) => {
            print_languages();
            Ok(())
        }
        Some(Command::Models) => {
            print_models();
            Ok(())
        }
        Some(Command::Settings) => show_settings(&cli).await,
        None => translate(&cli).await,
    }
}

fn print_languages() {
    for language in LANGUAGES {
        println!("{}\t{}", language.code, language.name);
    }
}

fn print_models() {
    let default_model = Settings::default().model;
    for model in AVAILABLE_MODELS {
        let marker = if model.id == default_model { " (default)" } else { "" };
        println!("{}\t{}{marker}", model.id, model.name);
    }
}

fn connect(cli: &Cli) -> anyhow::Result<(ClientConfig, Arc<StdioBackend>)> {
    let mut config = ClientConfig::load();
    if let Some(backend) = &cli.backend {
        config.backend_command = backend.clone();
        config.backend_args.clear();
    }
    let backend = StdioBackend::from_config(&config)
        .with_context(|| format!("starting backend `{}`", config.backend_command))?;
    Ok((config, Arc::new(backend)))
}

async fn show_settings(cli: &Cli) -> anyhow::Result<()> {
    let (_, backend) = connect(cli)?;
    let mut state = SettingsState::new(backend);
    let mut settings = state.load().await.context("loading settings")?.clone();
    settings.api_key = mask_api_key(&settings.api_key);
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

fn mask_api_key(key: &str) -> String {
    let key = key.trim();
    if key.is_empty() {
        return String::new();
    }
    match key.char_indices().rev().nth(4) {
        Some((i, c)) => {
            let tail = &key[i + c.len_utf8()..];
            format!("****{tail}")
        }
        // Too short to reveal any of it.
        None => "****".to_string(),
    }
}

async fn read_text(cli: &Cli) -> anyhow::Result<String> {
    if let Some(text) = &cli.text {
        return Ok(text.clone());
    }
    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("reading stdin")?;
    Ok(text)
}

fn checked_language(code: &str) -> anyhow::Result<String> {
    match Language::from_code(code) {
        Some(language) => Ok(language.code.to_string()),
        None => bail!("unsupported language `{code}` (see `simple-translate languages`)"),
    }
}

async fn translate(cli: &Cli) -> anyhow::Result<()> {
    let text = read_text(cli).await?;
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText.into());
    }
    let source_language = cli.source_language.as_deref().map(checked_language).transpose()?;
    let target_language = cli.target_language.as_deref().map(checked_language).transpose()?;

    let (config, backend) = connect(cli)?;

    let mut settings_state = SettingsState::new(backend.clone());
    if let Err(err) = settings_state.load().await {
        tracing::warn!("using default settings: {err}");
    }
    let mut settings = settings_state.settings().clone();
    if let Some(api_key) = &cli.api_key {
        settings.api_key = api_key.clone();
    }
    if let Some(model) = &cli.model {
        settings.model = model.clone();
    }

    let context = TranslationContext::from_settings(&settings);
    context.set_source_text(text);
    if let Some(code) = source_language {
        context.set_source_language(code);
    }
    if let Some(code) = target_language {
        context.set_target_language(code);
    }

    let translator = StreamingTranslator::new(RequestDispatcher::new(backend.clone()))
        .with_stale_event_logging(config.log_stale_events);
    let mut channel = EventChannel::new(backend.events(), translator.event_sender());
    channel.subscribe().await?;
    let mut controller = TranslationController::new(translator, context);

    let pending = controller.translate(&settings).await?;

    let mut stdout = std::io::stdout();
    while let Some(update) = controller.process_next().await {
        match update {
            SessionUpdate::Token(token) => {
                stdout.write_all(token.as_bytes())?;
                stdout.flush()?;
            }
            SessionUpdate::Completed(_) | SessionUpdate::Failed(_) => break,
            SessionUpdate::Stale(_) | SessionUpdate::Ignored => {}
        }
    }
    channel.teardown();

    let done = pending.await?;
    if done.text.is_empty() {
        // Nothing was streamed; fall back to the completion payload.
        println!("{}", done.response.translated_text);
    } else {
        println!();
    }
    Ok(())
}
