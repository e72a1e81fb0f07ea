use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use moods_core::export::ExportFormat;
use moods_core::{KvStore, MoodsConfig, MoodsError, StorageBackend, SystemClock};
use moods_memory::{InMemoryStore, ReflectionSession, SqliteStore};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "moods", author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "MOODS_CONFIG", default_value = "moods.toml")]
    config: PathBuf,

    /// Path to the reflection database (overrides config)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Keep everything in memory for this run only
    #[arg(long)]
    in_memory: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show today's question, progress and entries (default)
    Today,
    /// Save a reflection for today's question; reads stdin when TEXT is omitted
    Save { text: Option<String> },
    /// List past reflections, newest first
    History {
        /// Only show entries whose question or text contains this
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Totals, active days and current streak
    Stats,
    /// Export all reflections
    Export {
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show or toggle the light/dark preference
    Theme {
        #[arg(long)]
        toggle: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Json,
    Text,
}

impl From<Format> for ExportFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Json => ExportFormat::Json,
            Format::Text => ExportFormat::Text,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = MoodsConfig::load_or_default(&args.config);
    let store = open_store(&args, &config).await?;
    let session = ReflectionSession::from_config(&config, store, Arc::new(SystemClock)).await?;

    match run(&session, args.command.unwrap_or(Command::Today)).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => match e.downcast_ref::<MoodsError>() {
            // user error: no state was touched, just say what to fix
            Some(err) if err.is_validation() => {
                eprintln!("{err}");
                Ok(ExitCode::from(2))
            }
            _ => Err(e),
        },
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // stdout is reserved for command output (exports may be piped)
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn open_store(args: &Args, config: &MoodsConfig) -> anyhow::Result<Arc<dyn KvStore>> {
    if args.in_memory || config.storage.backend == StorageBackend::Memory {
        info!("Using in-memory store; nothing will be kept after exit");
        return Ok(Arc::new(InMemoryStore::new()));
    }

    let db_path = args
        .db
        .clone()
        .or_else(|| config.storage.db_path.clone())
        .unwrap_or_else(default_db_path);
    info!("Opening reflection database at {}...", db_path.display());
    let store = SqliteStore::new(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    Ok(Arc::new(store))
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("moods")
        .join("moods.db")
}

async fn run(session: &ReflectionSession, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Today => {
            let progress = session.progress().await;
            let question = session.current_question().await;
            let entries = session.today_entries().await?;
            print!(
                "{}",
                render::today(session.today(), &question, &progress, session.rules(), &entries)
            );
        }
        Command::Save { text } => {
            let text = match text {
                Some(t) => t,
                None => read_stdin()?,
            };
            let outcome = session.save_reflection(&text).await?;
            print!("{}", render::saved(&outcome));
        }
        Command::History { search } => {
            let entries = session.history(search.as_deref()).await?;
            print!("{}", render::history(&entries, session.today()));
        }
        Command::Stats => {
            let stats = session.stats().await?;
            let progress = session.progress().await;
            print!("{}", render::stats(&stats, &progress, session.rules()));
        }
        Command::Export { format, output } => {
            let format = ExportFormat::from(format);
            let body = session.export(format).await?;
            match output {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(format.file_name(session.today()))
                    } else {
                        path
                    };
                    std::fs::write(&path, body)
                        .with_context(|| format!("Failed to write export to {}", path.display()))?;
                    println!("Exported to {}", path.display());
                }
                None => print!("{body}"),
            }
        }
        Command::Theme { toggle } => {
            let theme = if toggle {
                session.toggle_theme().await?
            } else {
                session.theme().await
            };
            println!("Theme: {theme}");
        }
    }
    Ok(())
}

fn read_stdin() -> anyhow::Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read reflection from stdin")?;
    Ok(buf)
}
