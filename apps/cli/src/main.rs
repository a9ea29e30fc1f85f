use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scansim_core::{
    attach_prompt, respond, start_scan, suggest_advisories, ChatTurn, FileMetadata, ScanEvent,
    ScanResult,
};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

mod config;
mod render;
mod store;

use config::{AppConfig, Overrides};

#[derive(Parser)]
#[command(name = "scansim")]
#[command(about = "Simulated file-risk scanner demo (no real malware detection)", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file (default: <config dir>/scansim/config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the last scan
    #[arg(long, global = true, env = "SCANSIM_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Milliseconds between progress ticks
    #[arg(long, global = true, env = "SCANSIM_TICK_MS")]
    tick_ms: Option<u64>,

    /// Seed for the random source, for reproducible demos
    #[arg(long, global = true, env = "SCANSIM_SEED")]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulated scan and remember its result
    Scan(ScanArgs),

    /// List official download sources for a filename
    Advise(AdviseArgs),

    /// Ask the assistant a single question
    Ask(AskArgs),

    /// Print the message that attaches the last scan to a chat
    Attach,

    /// Chat with the assistant line by line on stdin
    Chat(ChatArgs),

    /// Forget the last scan
    Reset,
}

#[derive(Args)]
struct ScanArgs {
    /// File whose name and size are used
    path: Option<PathBuf>,

    /// File name to simulate instead of reading a path
    #[arg(long, conflicts_with = "path", requires = "size")]
    name: Option<String>,

    /// File size in bytes, used with --name
    #[arg(long, requires = "name")]
    size: Option<u64>,

    /// Declared content type, e.g. application/pdf
    #[arg(long = "type")]
    declared_type: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AdviseArgs {
    filename: String,

    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AskArgs {
    #[arg(required = true, num_args = 1..)]
    question: Vec<String>,

    /// Answer without the stored last scan
    #[arg(long)]
    no_scan: bool,
}

#[derive(Args)]
struct ChatArgs {
    /// Write the conversation as JSON when the chat ends
    #[arg(long)]
    transcript: Option<PathBuf>,
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn make_rng(config: &AppConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn metadata_from_path(path: &Path) -> Result<FileMetadata> {
    let meta = fs::metadata(path).with_context(|| format!("File not found: {}", path.display()))?;
    if !meta.is_file() {
        bail!("Not a file: {}", path.display());
    }
    let name = path
        .file_name()
        .map(|value| value.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(FileMetadata::new(name, meta.len()))
}

async fn run_scan(args: ScanArgs, config: &AppConfig) -> Result<()> {
    let meta = match (&args.path, &args.name, args.size) {
        (Some(path), _, _) => Some(metadata_from_path(path)?),
        (None, Some(name), Some(size)) => Some(FileMetadata::new(name.clone(), size)),
        _ => None,
    };
    let meta = meta.map(|meta| match args.declared_type.clone() {
        Some(declared_type) => meta.with_declared_type(declared_type),
        None => meta,
    });

    if let Some(meta) = &meta {
        log::info!("scanning {}", render::file_summary(meta));
    }

    let mut handle = start_scan(meta, make_rng(config), config.tick_interval())
        .context("Please choose a file first")?;

    let mut result: Option<ScanResult> = None;
    while let Some(event) = handle.next_event().await {
        match event {
            ScanEvent::Progress(update) => eprintln!("{}", render::progress_line(&update)),
            ScanEvent::Completed(done) => result = Some(done),
        }
    }
    let result = result.context("Scan ended without a result")?;

    store::write_last_scan(&config.resolve_state_dir()?, &result)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render::scan_report(&result));
    }
    Ok(())
}

fn run_advise(args: AdviseArgs) -> Result<()> {
    let items = suggest_advisories(&args.filename);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        print!("{}", render::advisories(&items));
    }
    Ok(())
}

fn run_ask(args: AskArgs, config: &AppConfig) -> Result<()> {
    let question = args.question.join(" ");
    let last_scan = if args.no_scan {
        None
    } else {
        store::read_last_scan(&config.resolve_state_dir()?)
    };
    println!("{}", respond(&question, last_scan.as_ref()));
    Ok(())
}

fn run_attach(config: &AppConfig) -> Result<()> {
    let Some(scan) = store::read_last_scan(&config.resolve_state_dir()?) else {
        bail!("No scan available to attach. Run a simulated scan first.");
    };
    println!("{}", attach_prompt(&scan));
    Ok(())
}

fn run_chat(args: ChatArgs, config: &AppConfig) -> Result<()> {
    let last_scan = store::read_last_scan(&config.resolve_state_dir()?);
    let mut history: Vec<ChatTurn> = Vec::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read chat input")?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "/quit" {
            break;
        }

        let question = if input == "/attach" {
            match &last_scan {
                Some(scan) => attach_prompt(scan),
                None => {
                    eprintln!("No scan available to attach. Run a simulated scan first.");
                    continue;
                }
            }
        } else {
            input.to_string()
        };

        let answer = respond(&question, last_scan.as_ref());
        writeln!(out, "you> {question}")?;
        writeln!(out, "assistant> {answer}")?;
        history.push(ChatTurn::user(question));
        history.push(ChatTurn::assistant(answer));
    }

    if let Some(path) = args.transcript {
        let data = serde_json::to_string_pretty(&history)?;
        fs::write(&path, data).with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("wrote {} chat turns to {}", history.len(), path.display());
    }
    Ok(())
}

fn run_reset(config: &AppConfig) -> Result<()> {
    if store::clear_last_scan(&config.resolve_state_dir()?)? {
        println!("Last scan cleared.");
    } else {
        println!("No scan stored.");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = AppConfig::load(
        cli.config.as_deref(),
        Overrides {
            tick_ms: cli.tick_ms,
            seed: cli.seed,
            state_dir: cli.state_dir.clone(),
        },
    )?;
    log::debug!("config: {config:?}");

    match cli.command {
        Commands::Scan(args) => run_scan(args, &config).await,
        Commands::Advise(args) => run_advise(args),
        Commands::Ask(args) => run_ask(args, &config),
        Commands::Attach => run_attach(&config),
        Commands::Chat(args) => run_chat(args, &config),
        Commands::Reset => run_reset(&config),
    }
}
