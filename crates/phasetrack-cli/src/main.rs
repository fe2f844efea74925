mod cmd;
mod git;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{phase::PhaseSubcommand, task::AddArgs, task::EditArgs};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "phasetrack",
    about = "Phase-sharded YAML task tracker: list, start, commit and block tasks",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .phasetrack.yaml, phases/, tasks.yaml or .git/)
    #[arg(long, global = true, env = "PHASETRACK_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks, optionally filtered
    List {
        /// Only tasks with this status (pending, in-progress, completed, blocked)
        #[arg(long)]
        status: Option<String>,
        /// Only tasks in this phase (0 = legacy)
        #[arg(long)]
        phase: Option<u32>,
    },

    /// Show progress per phase, or one task's details
    Status {
        /// Task id (omit for the project overview)
        task_id: Option<String>,
    },

    /// Show full details for a single task
    Show { task_id: String },

    /// Mark a task in-progress and generate its context document
    Start { task_id: String },

    /// Mark a task completed, remove its context and commit with git
    Commit {
        task_id: String,
        /// Commit message (default: "Complete task: <id>")
        #[arg(long, short = 'm')]
        message: Option<String>,
        /// Update the task file only; skip `git add` / `git commit`
        #[arg(long)]
        no_git: bool,
    },

    /// Mark a task as blocked
    Block {
        task_id: String,
        #[arg(required = true)]
        reason: Vec<String>,
    },

    /// Append a new task to a phase
    Add(AddArgs),

    /// Edit task fields
    Edit(EditArgs),

    /// List phases with progress
    Phases,

    /// Manage phase files
    Phase {
        #[command(subcommand)]
        subcommand: PhaseSubcommand,
    },

    /// Print (or regenerate) a task's context document
    Context {
        task_id: String,
        /// Write the document to contexts/ instead of printing it
        #[arg(long)]
        write: bool,
    },

    /// Print the hand-off status report for a task
    Report { task_id: String },

    /// Serve the JSON dashboard API
    Serve {
        /// Port to listen on (default: server.port from config, 0 = OS-assigned)
        #[arg(long)]
        port: Option<u16>,

        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let json = cli.json;

    let result = match cli.command {
        Commands::List { status, phase } => {
            cmd::task::list(&root, status.as_deref(), phase, json)
        }
        Commands::Status { task_id } => match task_id {
            Some(id) => cmd::task::show(&root, &id, json),
            None => cmd::status::run(&root, json),
        },
        Commands::Show { task_id } => cmd::task::show(&root, &task_id, json),
        Commands::Start { task_id } => cmd::task::start(&root, &task_id, json),
        Commands::Commit {
            task_id,
            message,
            no_git,
        } => cmd::task::commit(&root, &task_id, message.as_deref(), !no_git, json),
        Commands::Block { task_id, reason } => {
            cmd::task::block(&root, &task_id, &reason.join(" "), json)
        }
        Commands::Add(args) => cmd::task::add(&root, args, json),
        Commands::Edit(args) => cmd::task::edit(&root, args, json),
        Commands::Phases => cmd::phase::run(&root, PhaseSubcommand::List, json),
        Commands::Phase { subcommand } => cmd::phase::run(&root, subcommand, json),
        Commands::Context { task_id, write } => cmd::task::context(&root, &task_id, write, json),
        Commands::Report { task_id } => cmd::task::report(&root, &task_id, json),
        Commands::Serve { port, no_open } => cmd::serve::run(&root, port, no_open),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
