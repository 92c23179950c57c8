//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "doit")]
#[command(version)]
#[command(about = "Do-it task tracker CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Check the current session status
    Status,

    /// Manage tasks (requires an active session)
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Two-factor authentication enrollment
    Twofactor {
        #[command(subcommand)]
        command: TwoFactorCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum TaskCommands {
    /// Lists tasks, optionally for a single category
    List {
        /// Only show tasks in this category (Personal, Freelance, Work)
        #[arg(long)]
        category: Option<String>,
    },
    /// Creates a task
    Add {
        /// Task title
        #[arg(short, long)]
        title: String,

        /// Task category (Personal, Freelance, Work)
        #[arg(short, long, default_value = "Personal")]
        category: String,

        /// Scheduled moment (RFC 3339, or YYYY-MM-DDTHH:MM in local time);
        /// defaults to now
        #[arg(long)]
        time: Option<String>,
    },
    /// Marks a task as completed
    Done {
        /// The id of the task
        #[arg(value_name = "TASK_ID")]
        id: String,
    },
    /// Marks a task as not completed
    Undone {
        /// The id of the task
        #[arg(value_name = "TASK_ID")]
        id: String,
    },
}

#[derive(clap::Subcommand)]
enum TwoFactorCommands {
    /// Fetches the enrollment QR payload
    Setup,
    /// Verifies a one-time code
    Verify {
        /// The 6-digit code from the authenticator app
        #[arg(value_name = "TOKEN")]
        token: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Prints the config file path
    Path,
    /// Writes the default config template if missing
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Status => commands::session::status().await,
        Commands::Tasks { command } => match command {
            TaskCommands::List { category } => commands::tasks::list(category.as_deref()).await,
            TaskCommands::Add {
                title,
                category,
                time,
            } => commands::tasks::add(&title, &category, time.as_deref()).await,
            TaskCommands::Done { id } => commands::tasks::set_completion(&id, true).await,
            TaskCommands::Undone { id } => commands::tasks::set_completion(&id, false).await,
        },
        Commands::Twofactor { command } => match command {
            TwoFactorCommands::Setup => commands::twofactor::setup().await,
            TwoFactorCommands::Verify { token } => commands::twofactor::verify(&token).await,
        },
        Commands::Config { command } => match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
