use std::path::Path;

use anyhow::{anyhow, bail};
use ark_sdk::{Commit, Fingerprint, Repository, SdkResult, Status};
use colored::Colorize;
use serde::Serialize;

use crate::cli::*;

const LOG_SEPARATOR: &str = "\n----------\n";

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    run_in(cli, &cwd)
}

/// Run `cli` as if started from `cwd`.
pub fn run_in(cli: Cli, cwd: &Path) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Init => cmd_init(cwd),
        Command::Commit(args) => cmd_commit(cwd, args.description(), format),
        Command::Log(args) => cmd_log(cwd, &args, format),
        Command::Checkout(args) => cmd_checkout(cwd, &args.commit, format),
        Command::Status => cmd_status(cwd, format),
    }
}

fn open(cwd: &Path) -> anyhow::Result<Repository> {
    Repository::discover_or_none(cwd)?
        .ok_or_else(|| anyhow!("not an ark repository (run `ark init` first)"))
}

fn cmd_init(cwd: &Path) -> anyhow::Result<()> {
    if Repository::discover_or_none(cwd)?.is_some() {
        bail!("Repository is already initialized");
    }
    let repo = Repository::initialize(cwd)?;
    println!(
        "{} Initialized empty ark repository in {}",
        "✓".green().bold(),
        repo.storage_root().display().to_string().bold()
    );
    Ok(())
}

fn cmd_commit(cwd: &Path, description: &str, format: OutputFormat) -> anyhow::Result<()> {
    let mut repo = open(cwd)?;
    let id = repo.commit(description)?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "commit": id })),
        OutputFormat::Text => {
            println!("{} Committed {}", "✓".green().bold(), id.to_string().yellow());
            Ok(())
        }
    }
}

fn cmd_log(cwd: &Path, args: &LogArgs, format: OutputFormat) -> anyhow::Result<()> {
    let repo = open(cwd)?;
    let entries = repo.log().collect::<SdkResult<Vec<_>>>()?;
    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = entries.iter().map(LogEntry::from).collect();
            print_json(&entries)
        }
        OutputFormat::Text if args.oneline => {
            for (id, commit) in &entries {
                println!("{} {}", id.short_hex().yellow(), first_line(&commit.description));
            }
            Ok(())
        }
        OutputFormat::Text => {
            if !entries.is_empty() {
                println!("{}", render_log(&entries));
            }
            Ok(())
        }
    }
}

fn cmd_checkout(cwd: &Path, target: &str, format: OutputFormat) -> anyhow::Result<()> {
    let mut repo = open(cwd)?;
    let id = repo.resolve(target)?;
    let commit = repo.checkout(&id)?;
    match format {
        OutputFormat::Json => print_json(&LogEntry::from(&(id, commit))),
        OutputFormat::Text => {
            println!(
                "{} Checked out {} {}",
                "✓".green().bold(),
                id.short_hex().yellow(),
                first_line(&commit.description)
            );
            Ok(())
        }
    }
}

fn cmd_status(cwd: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let repo = open(cwd)?;
    let status = repo.status()?;
    match format {
        OutputFormat::Json => print_json(&StatusReport {
            root: repo.working_root().display().to_string(),
            status: &status,
        }),
        OutputFormat::Text => {
            println!("Repository: {}", repo.working_root().display().to_string().bold());
            match status.head {
                Some(head) => println!("HEAD: {}", head.to_string().yellow()),
                None => println!("HEAD: {}", "(no commits yet)".dimmed()),
            }
            if status.clean {
                println!("{}", "Working directory clean.".green());
            } else {
                println!("{}", "Working directory has uncommitted changes.".red());
            }
            Ok(())
        }
    }
}

// ---- Rendering ----

/// `sha:<fp>` followed by the stored commit text, commits separated by a
/// dashed line.
fn render_log(entries: &[(Fingerprint, Commit)]) -> String {
    entries
        .iter()
        .map(|(id, commit)| format!("sha:{id}\n{}", String::from_utf8_lossy(&commit.serialize())))
        .collect::<Vec<_>>()
        .join(LOG_SEPARATOR)
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct LogEntry<'a> {
    id: Fingerprint,
    tree: Fingerprint,
    parent: Option<Fingerprint>,
    description: &'a str,
}

impl<'a> From<&'a (Fingerprint, Commit)> for LogEntry<'a> {
    fn from((id, commit): &'a (Fingerprint, Commit)) -> Self {
        Self {
            id: *id,
            tree: commit.tree,
            parent: commit.parent,
            description: &commit.description,
        }
    }
}

#[derive(Serialize)]
struct StatusReport<'a> {
    root: String,
    #[serde(flatten)]
    status: &'a Status,
}
