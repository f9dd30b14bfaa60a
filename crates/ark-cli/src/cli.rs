use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ark",
    about = "Ark: a minimal content-addressed version store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty repository in the current directory
    Init,
    /// Snapshot the whole working directory
    Commit(CommitArgs),
    /// Show history from HEAD back to the first commit
    Log(LogArgs),
    /// Restore the working directory to a commit
    Checkout(CheckoutArgs),
    /// Compare the working directory with HEAD
    Status,
}

#[derive(Args)]
pub struct CommitArgs {
    /// Commit description
    #[arg(required_unless_present = "message", conflicts_with = "message")]
    pub description: Option<String>,
    #[arg(short, long)]
    pub message: Option<String>,
}

impl CommitArgs {
    pub fn description(&self) -> &str {
        self.description
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(long)]
    pub oneline: bool,
}

#[derive(Args)]
pub struct CheckoutArgs {
    /// Commit fingerprint, or a unique prefix of at least 4 hex characters
    pub commit: String,
}
