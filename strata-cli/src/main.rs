//! Strata CLI
//!
//! Local front end to the version control engine. Commands load the
//! registry from a JSON state file, apply one operation, and save the
//! file back, so the CLI and the server can share state.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use strata_core::{FileDiff, RepositoryRegistry};
use strata_http::{StateStore, DEFAULT_REPOSITORY};

#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(author = "Strata Contributors")]
#[command(version = "0.1.0")]
#[command(about = "In-memory version control engine")]
struct Cli {
    /// JSON state file
    #[arg(long, default_value = "strata.json")]
    state_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage repositories
    Repo {
        #[command(subcommand)]
        command: RepoCommands,
    },

    /// List all repositories
    Repos,

    /// Initialize the active repository
    Init,

    /// Stage a file
    Add { filename: String, content: String },

    /// Commit staged files
    Commit { message: String },

    /// Show commit history
    Log,

    /// Show working tree status
    Status,

    /// Compare a file with the last commit
    Diff { filename: String },

    /// Create a new branch
    Branch { name: String },

    /// List all branches
    Branches,

    /// Delete a branch
    BranchDelete { name: String },

    /// Switch to a branch
    Checkout { name: String },

    /// Merge a branch into the current one
    Merge { branch: String },

    /// Undo the last history change
    Undo,

    /// Redo the last undone change
    Redo,

    /// Revert to a specific commit
    Revert { commit_id: String },

    /// Clear the active repository back to its uninitialized state
    Reset,
}

#[derive(Subcommand, Debug)]
enum RepoCommands {
    /// Create a new repository and switch to it
    Create { name: String },

    /// Switch to a repository
    Switch { name: String },

    /// Delete a repository
    Delete { name: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = StateStore::new(&cli.state_file);
    let mut registry = store.load()?;
    if registry.is_empty() {
        let _ = registry.create(DEFAULT_REPOSITORY);
    }

    run(cli.command, &mut registry)?;

    store.save(&registry)?;
    Ok(())
}

fn run(command: Commands, registry: &mut RepositoryRegistry) -> Result<()> {
    match command {
        Commands::Repo { command } => match command {
            RepoCommands::Create { name } => {
                registry.create(&name)?;
                println!("  Created and switched to repository: {}", name);
            }
            RepoCommands::Switch { name } => {
                registry.switch_to(&name)?;
                println!("  Switched to repo: {}", name);
            }
            RepoCommands::Delete { name } => {
                registry.delete(&name)?;
                println!("  Deleted repository: {}", name);
            }
        },

        Commands::Repos => {
            println!("  === Repositories ===");
            for repo in registry.list() {
                if repo.active {
                    println!("  * {} (active)", repo.name);
                } else {
                    println!("    {}", repo.name);
                }
            }
            println!("  Total: {} repo(s)", registry.len());
        }

        Commands::Init => {
            registry.active_mut()?.init()?;
            println!("  Initialized empty Strata repository.");
        }

        Commands::Add { filename, content } => {
            let digest = registry.active_mut()?.add(&filename, &content)?;
            println!("  Staged: {}  [hash: {}]", filename, digest);
        }

        Commands::Commit { message } => {
            let receipt = registry.active_mut()?.commit(&message)?;
            println!("  [{} {}] {}", receipt.branch, receipt.id, message);
            println!("  {} file(s) committed.", receipt.file_count);
        }

        Commands::Log => {
            let page = registry.active()?.log()?;
            if page.commits.is_empty() {
                println!("  No commits yet.");
            } else {
                println!("  === Commit History ({}) ===", page.branch);
                println!();
                for commit in &page.commits {
                    println!("  commit {}", commit.id);
                    println!("  Date:   {}", commit.timestamp);
                    println!("  Msg:    {}", commit.message);
                    println!("  Files:  {}", commit.file_count);
                    println!();
                }
                println!("  Total: {} commit(s)", page.total);
            }
        }

        Commands::Status => {
            let report = registry.active()?.status()?;
            println!("  On branch: {}", report.branch);
            if !report.staged.is_empty() {
                println!();
                println!("  Staged files:");
                for file in &report.staged {
                    println!("    + {}", file.name);
                }
            }
            println!();
            println!("  Working directory:");
            if report.working.is_empty() {
                println!("    (empty)");
            } else {
                for file in &report.working {
                    println!("    {}  [{}]", file.name, file.hash);
                }
            }
            println!();
            println!("  Undo stack: {} operation(s)", report.undo_count);
            println!("  Redo stack: {} operation(s)", report.redo_count);
        }

        Commands::Diff { filename } => match registry.active()?.diff(&filename)? {
            FileDiff::New { working_hash, .. } => {
                println!("  No commits to compare against.");
                println!("  + {} [{}] (new file)", filename, working_hash);
            }
            FileDiff::Added { .. } => {
                println!("  + {} (new - not in last commit)", filename);
            }
            FileDiff::Unchanged { .. } => {
                println!("  {} - no changes.", filename);
            }
            FileDiff::Modified {
                committed_hash,
                working_hash,
                committed_content,
                working_content,
            } => {
                println!("  {} - MODIFIED", filename);
                println!("  Last commit: [{}]", committed_hash);
                println!("  Working:     [{}]", working_hash);
                println!();
                println!("  --- committed version ---");
                println!("  {}", committed_content);
                println!("  --- working version ---");
                println!("  {}", working_content);
            }
        },

        Commands::Branch { name } => {
            registry.active_mut()?.branch_create(&name)?;
            println!("  Created branch: {}", name);
        }

        Commands::Branches => {
            let branches = registry.active()?.branch_list()?;
            println!("  === Branches ===");
            for branch in &branches {
                if branch.active {
                    println!("  * {} (active)", branch.name);
                } else {
                    println!("    {}", branch.name);
                }
            }
            println!("  Total: {} branch(es)", branches.len());
        }

        Commands::BranchDelete { name } => {
            registry.active_mut()?.branch_delete(&name)?;
            println!("  Deleted branch: {}", name);
        }

        Commands::Checkout { name } => {
            let out = registry.active_mut()?.checkout(&name)?;
            println!("  Switched to branch: {}", out.branch);
            match out.head {
                Some(_) => println!("  Restored {} file(s).", out.file_count),
                None => println!("  Branch has no commits yet."),
            }
        }

        Commands::Merge { branch } => {
            let out = registry.active_mut()?.merge(&branch)?;
            println!("  {}", out.message);
            println!("  [{}] {} file(s)", out.id, out.file_count);
        }

        Commands::Undo => {
            let out = registry.active_mut()?.undo()?;
            match out.restored {
                Some(id) => println!("  Undo: reverted to commit {}", id),
                None => println!("  Undo: reverted to initial state (no commits)."),
            }
        }

        Commands::Redo => {
            let out = registry.active_mut()?.redo()?;
            println!("  Redo: restored commit {} - {}", out.restored, out.message);
        }

        Commands::Revert { commit_id } => {
            let out = registry.active_mut()?.revert(&commit_id)?;
            println!("  Reverted to commit {}", out.target);
            println!("  Created revert commit [{}]", out.new_commit);
            println!("  {} file(s) restored.", out.file_count);
        }

        Commands::Reset => {
            registry.active_mut()?.reset();
            println!("  Repository reset.");
        }
    }

    Ok(())
}
