//! recap: generate quizzes from text, images, links, PDFs and YouTube videos.
//!
//! Preferences live in `<config_dir>/recap/preferences.toml` and history in
//! `<data_dir>/recap/history.json`; both paths can be overridden per call.

mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recap_core::defaults::{MAX_IMAGES, SUPPORTED_LANGUAGES, SUPPORTED_MODELS};
use recap_core::{
    collect_images, AttachmentSet, DecodeOutcome, ErrorCategory, ErrorPhrase, ImageCollection,
    Preferences,
};
use recap_fetch::{Aggregator, HttpContentFetcher};
use recap_inference::GeminiBackend;
use recap_quiz::{
    export_shared_quiz, load_shared_quiz_from, ErrorClassifier, History, JsonHistoryStore,
    QuizDecoder, QuizPipeline,
};

use render::{render_history_line, render_quiz};

#[derive(Parser)]
#[command(name = "recap")]
#[command(author, version, about = "Generate quizzes from anything you want to remember")]
#[command(propagate_version = true)]
struct Cli {
    /// Preferences file (default: <config_dir>/recap/preferences.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// History file (default: <data_dir>/recap/history.json)
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a quiz from a prompt, images and links
    Generate {
        /// What the quiz should be about
        #[arg(short, long)]
        prompt: Option<String>,

        /// Web page, PDF or YouTube link (up to 5)
        #[arg(short, long)]
        link: Vec<String>,

        /// Image file (up to 5)
        #[arg(short, long)]
        image: Vec<PathBuf>,

        /// Use the streaming endpoint
        #[arg(long)]
        stream: bool,

        /// Print the quiz as JSON
        #[arg(long)]
        json: bool,

        /// Show correct answers
        #[arg(long)]
        answers: bool,

        /// Do not add the quiz to history
        #[arg(long)]
        no_save: bool,
    },

    /// Import a shared quiz from a file or URL into history
    Import {
        /// Path or http(s) URL of a {"quiz": ...} payload
        source: String,

        /// Print the quiz as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export a history entry as a shareable payload
    Export {
        /// History entry number (as shown by `history list`)
        number: usize,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage quiz history
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// View or change preferences
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List stored quizzes
    List,

    /// Show one stored quiz
    Show {
        number: usize,

        /// Show correct answers
        #[arg(long)]
        answers: bool,
    },

    /// Remove one stored quiz
    Remove { number: usize },

    /// Remove every stored quiz
    Clear,

    /// Generate a new quiz from a stored quiz's prompt, links and photos
    Regenerate {
        number: usize,

        /// Use the streaming endpoint
        #[arg(long)]
        stream: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current preferences
    Show,

    /// List supported quiz languages
    Languages,

    /// Set the Gemini API key
    SetApiKey { key: String },

    /// Set the generation model
    SetModel { model: String },

    /// Set how many questions to ask for
    SetQuestions { count: u32 },

    /// Set the quiz language code
    SetLanguage { code: String },

    /// Enable or disable content filtering
    SetSafety {
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },

    /// Map a vendor error phrase to an error category
    AddErrorPhrase {
        pattern: String,

        /// rate_limited, region_restricted, invalid_api_key, model_overloaded,
        /// malformed_response or unknown
        category: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    let _file_guard = init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing with configurable output.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, enables file logging)
///   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
///   RUST_LOG    - standard env filter (default: "recap=info")
///
/// Console logs go to stderr so stdout carries only command output.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "recap=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = if let Some(ref path) = log_file {
        let path = std::path::Path::new(path);
        let file_dir = path.parent().unwrap_or(std::path::Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("recap.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false)); // no ANSI in files by default
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stderr)"),
        "Logging initialized"
    );
    guard
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut prefs = match cli.config {
        Some(ref path) => {
            let mut prefs = Preferences::load(path)?;
            prefs.apply_env();
            prefs
        }
        None => Preferences::load_default()?,
    };
    let store = cli
        .history
        .clone()
        .map(JsonHistoryStore::new)
        .unwrap_or_else(JsonHistoryStore::default_location);

    match cli.command {
        Commands::Generate {
            prompt,
            link,
            image,
            stream,
            json,
            answers,
            no_save,
        } => {
            let attachments = load_attachments(prompt, link, image).await?;
            let pipeline = build_pipeline(&prefs, stream)?;
            let outcome = pipeline.generate(&attachments).await;
            let history = if no_save {
                None
            } else {
                Some(History::load(store).await?)
            };
            finish(outcome, history, json, answers).await
        }
        Commands::Import { source, json } => {
            let quiz = match load_shared_quiz_from(&source).await {
                Ok(quiz) => quiz,
                Err(e) => {
                    error!(source = %source, error = %e, "Import failed");
                    eprintln!("{}", e.category().user_message());
                    return Ok(ExitCode::FAILURE);
                }
            };
            print_quiz(&quiz, json, false)?;
            let mut history = History::load(store).await?;
            history.append(quiz).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Export { number, output } => {
            let history = History::load(store).await?;
            let quiz = history
                .get(to_index(number)?)
                .with_context(|| format!("No history entry {}", number))?;
            let payload = export_shared_quiz(quiz)?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, payload)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Exported \"{}\" to {}", quiz.title, path.display());
                }
                None => println!("{}", String::from_utf8_lossy(&payload)),
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::History { command } => run_history(command, store, &prefs).await,
        Commands::Config { command } => run_config(command, &mut prefs),
    }
}

async fn run_history(
    command: HistoryCommand,
    store: JsonHistoryStore,
    prefs: &Preferences,
) -> anyhow::Result<ExitCode> {
    let mut history = History::load(store).await?;

    match command {
        HistoryCommand::List => {
            if history.is_empty() {
                println!("No quizzes yet.");
            }
            for (index, quiz) in history.iter().enumerate() {
                println!("{}", render_history_line(index, quiz));
            }
        }
        HistoryCommand::Show { number, answers } => {
            let quiz = history
                .get(to_index(number)?)
                .with_context(|| format!("No history entry {}", number))?;
            print!("{}", render_quiz(quiz, answers));
        }
        HistoryCommand::Remove { number } => {
            let removed = history.remove(to_index(number)?).await?;
            println!("Removed \"{}\"", removed.title);
        }
        HistoryCommand::Clear => {
            let count = history.len();
            history.clear().await?;
            println!("Removed {} quizzes", count);
        }
        HistoryCommand::Regenerate { number, stream } => {
            let quiz = history
                .get(to_index(number)?)
                .with_context(|| format!("No history entry {}", number))?
                .clone();
            let pipeline = build_pipeline(prefs, stream)?;
            let outcome = pipeline.regenerate(&quiz).await?;
            return finish(outcome, Some(history), false, false).await;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_config(command: ConfigCommand, prefs: &mut Preferences) -> anyhow::Result<ExitCode> {
    match command {
        ConfigCommand::Show => {
            if let Some(path) = prefs.path() {
                println!("file               = {}", path.display());
            }
            let key = if prefs.has_api_key() { "(set)" } else { "(not set)" };
            println!("api_key            = {}", key);
            println!(
                "model              = {} (offered: {})",
                prefs.model(),
                SUPPORTED_MODELS.join(", ")
            );
            println!("number_of_questions = {}", prefs.number_of_questions());
            println!(
                "language           = {} ({})",
                prefs.language(),
                recap_core::language_name(prefs.language()).unwrap_or("?")
            );
            println!("safety_settings    = {}", prefs.safety_settings());
            for phrase in prefs.error_phrases() {
                println!("error_phrase       = {:?} -> {}", phrase.pattern, phrase.category);
            }
        }
        ConfigCommand::Languages => {
            for (name, code) in SUPPORTED_LANGUAGES {
                println!("{:<6} {}", code, name);
            }
        }
        ConfigCommand::SetApiKey { key } => {
            prefs.set_api_key(key)?;
            println!("API key saved");
        }
        ConfigCommand::SetModel { model } => {
            prefs.set_model(model)?;
            println!("Model set to {}", prefs.model());
        }
        ConfigCommand::SetQuestions { count } => {
            prefs.set_number_of_questions(count)?;
            println!("Number of questions set to {}", prefs.number_of_questions());
        }
        ConfigCommand::SetLanguage { code } => {
            prefs.set_language(code)?;
            println!("Language set to {}", prefs.language());
        }
        ConfigCommand::SetSafety { enabled } => {
            prefs.set_safety_settings(enabled)?;
            println!("Safety settings {}", if enabled { "enabled" } else { "disabled" });
        }
        ConfigCommand::AddErrorPhrase { pattern, category } => {
            let category: ErrorCategory = category.parse()?;
            prefs.add_error_phrase(ErrorPhrase::new(pattern, category))?;
            println!("Added error phrase for {}", category);
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Read image files concurrently and build a validated attachment set.
async fn load_attachments(
    prompt: Option<String>,
    links: Vec<String>,
    image_paths: Vec<PathBuf>,
) -> anyhow::Result<AttachmentSet> {
    if image_paths.len() > MAX_IMAGES {
        warn!(
            image_count = image_paths.len(),
            "Only the first {} images are attached", MAX_IMAGES
        );
    }

    let loaders: Vec<_> = image_paths
        .into_iter()
        .map(|path| async move {
            match tokio::fs::read(&path).await {
                Ok(data) => Some(data),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable image");
                    None
                }
            }
        })
        .collect();

    let mut images = ImageCollection::new();
    collect_images(&mut images, loaders).await;

    AttachmentSet::new(prompt, images.into_vec(), links)
        .context("Add a prompt, an image or a link to generate a quiz")
}

fn build_pipeline(prefs: &Preferences, stream: bool) -> anyhow::Result<QuizPipeline> {
    if !prefs.has_api_key() {
        bail!("To use Recap, enter your API key: recap config set-api-key <KEY>");
    }

    let fetcher = HttpContentFetcher::with_defaults()?;
    let backend = GeminiBackend::from_preferences(prefs)?;
    let decoder = QuizDecoder::new(ErrorClassifier::from_preferences(prefs));

    Ok(
        QuizPipeline::new(Aggregator::new(Arc::new(fetcher)), Arc::new(backend), decoder)
            .with_streaming(stream),
    )
}

/// Print a generated quiz and store it, or report the failure category.
async fn finish(
    outcome: DecodeOutcome,
    history: Option<History<JsonHistoryStore>>,
    json: bool,
    answers: bool,
) -> anyhow::Result<ExitCode> {
    match outcome {
        DecodeOutcome::Success(quiz) => {
            print_quiz(&quiz, json, answers)?;
            if let Some(mut history) = history {
                history.append(quiz).await?;
                info!(entries = history.len(), "Saved quiz to history");
            }
            Ok(ExitCode::SUCCESS)
        }
        DecodeOutcome::Failure(category) => {
            error!(category = %category, "Quiz generation failed");
            eprintln!("{}", category.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_quiz(quiz: &recap_core::Quiz, json: bool, answers: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(quiz)?);
    } else {
        print!("{}", render_quiz(quiz, answers));
    }
    Ok(())
}

/// Convert a 1-based entry number to an index.
fn to_index(number: usize) -> anyhow::Result<usize> {
    if number == 0 {
        bail!("History entries are numbered from 1");
    }
    Ok(number - 1)
}
