use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gemini_workbench::ai::{GeminiTextGenerator, MockTextGenerator, TextGenerator};
use gemini_workbench::app::{StateObserver, Workbench};
use gemini_workbench::credentials::{
    ChainedCredentials, EnvCredentials, FileKeyStore, KeyStore, StaticCredentials,
};
use gemini_workbench::models::{Config, ModeOutput, UiState};
use gemini_workbench::modes::{MediaSource, Mode, ModeInputs};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "gemini-workbench")]
#[command(about = "Code generation, explanation and lab helpers backed by Gemini")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one mode and print its result.
    Run(RunArgs),
    /// Manage the stored API key.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// List available modes.
    Modes,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Mode to run (see `modes`).
    mode: String,

    /// Task or question text.
    #[arg(long)]
    prompt: Option<String>,

    /// Source code to restyle or explain.
    #[arg(long, conflicts_with = "code_file")]
    code: Option<String>,

    /// Read the source code from a file instead.
    #[arg(long, value_name = "PATH")]
    code_file: Option<PathBuf>,

    /// Target programming language for `generation`.
    #[arg(long)]
    language: Option<String>,

    /// Target style for `styling`.
    #[arg(long)]
    style: Option<String>,

    /// Extra instructions for `styling`.
    #[arg(long = "instructions")]
    custom_instructions: Option<String>,

    /// `chem` for chemistry, anything else for electronics.
    #[arg(long, value_name = "DOMAIN")]
    lab_domain: Option<String>,

    /// Image file for `vision` and `math`.
    #[arg(long, value_name = "PATH")]
    image: Option<PathBuf>,

    /// API key; overrides GEMINI_API_KEY and the stored key.
    #[arg(long)]
    api_key: Option<String>,

    /// Model ID; overrides GEMINI_MODEL.
    #[arg(long)]
    model: Option<String>,

    /// Answer from a local mock instead of calling Gemini.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Subcommand)]
enum KeyAction {
    /// Save an API key for later runs.
    Set { key: String },
    /// Show where the key is stored and whether one is set.
    Show,
}

/// Prints loading feedback to stderr.
struct TerminalObserver;

impl StateObserver for TerminalObserver {
    fn on_state(&self, state: &UiState) {
        match state {
            UiState::Loading => eprintln!("⏳ Generating..."),
            UiState::Error(message) => eprintln!("API error:\n{}", message),
            UiState::Success | UiState::Idle => {}
        }
    }
}

fn key_store(config: &Config) -> Result<FileKeyStore> {
    let path = match &config.key_file {
        Some(path) => path.clone(),
        None => FileKeyStore::default_path()?,
    };
    Ok(FileKeyStore::new(path))
}

fn mask_key(key: &str) -> String {
    let visible: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{}", visible)
}

fn print_output(output: &ModeOutput) {
    match output {
        ModeOutput::Code { code, .. } => println!("{}", code),
        ModeOutput::Markdown { html, .. } => println!("{}", html),
        ModeOutput::Split(split) => {
            println!("{}", split.explanation_html);
            println!();
            println!("----- code ({}) -----", split.code_language_hint);
            println!("{}", split.code);
        }
    }
}

async fn run_mode(config: Config, args: RunArgs) -> Result<()> {
    let code = match &args.code_file {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?,
        ),
        None => args.code.clone(),
    };

    let inputs = ModeInputs {
        prompt: args.prompt,
        code,
        language: args.language,
        style: args.style,
        custom_instructions: args.custom_instructions,
        lab_domain: args.lab_domain,
        image: args.image.map(MediaSource::File),
    };

    let generator: Box<dyn TextGenerator> = if args.dry_run || config.dry_run {
        info!("Dry run: answers come from the mock generator");
        Box::new(MockTextGenerator::new())
    } else {
        let model = args.model.unwrap_or_else(|| config.model.clone());
        info!("Using Gemini model {}", model);
        Box::new(
            GeminiTextGenerator::new(model, config.timeout).with_base_url(config.base_url.clone()),
        )
    };

    let credentials = ChainedCredentials::new(vec![
        Box::new(StaticCredentials::new(args.api_key)),
        Box::new(EnvCredentials::default()),
        Box::new(key_store(&config)?),
    ]);

    let workbench = Workbench::new(generator, Box::new(credentials))
        .with_observer(Box::new(TerminalObserver));

    match workbench.run(&args.mode, &inputs).await {
        Ok(output) => {
            print_output(&output);
            Ok(())
        }
        Err(e) => {
            error!("Run failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn manage_key(config: &Config, action: KeyAction) -> Result<()> {
    let store = key_store(config)?;
    match action {
        KeyAction::Set { key } => {
            store.set_key(&key)?;
            println!("✅ Key saved to {}", store.path().display());
        }
        KeyAction::Show => match store.get_key()? {
            Some(key) => println!("{} ({})", mask_key(&key), store.path().display()),
            None => println!("No key stored at {}", store.path().display()),
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_workbench=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    let config = Config::from_env()?;

    match args.command {
        Command::Run(run_args) => run_mode(config, run_args).await,
        Command::Key { action } => manage_key(&config, action),
        Command::Modes => {
            for mode in Mode::ALL {
                println!("{}", mode);
            }
            Ok(())
        }
    }
}
