#![allow(dead_code)]

use crate::areas::repository::Repository;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod areas;
mod artifacts;
mod commands;
mod errors;

#[derive(Parser)]
#[command(
    name = "rit",
    version = "0.1.0",
    about = "A Git-compatible version control engine",
    long_about = "rit manages repositories using Git's on-disk format: the same \
    loose objects, packfile indexes, DIRC staging index and refs a standard \
    Git client reads and writes."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "init", about = "Initialize a new repository")]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(name = "add", about = "Add files or directories to the index")]
    Add {
        #[arg(required = true, help = "The files or directories to add (`.` adds everything)")]
        paths: Vec<String>,
    },
    #[command(name = "status", about = "Show the working tree status")]
    Status,
    #[command(name = "commit", about = "Record a snapshot of the index")]
    Commit {
        #[arg(short, long, help = "The commit message; the editor opens without it")]
        message: Option<String>,
    },
    #[command(name = "log", about = "Show the commit history of the current branch")]
    Log,
    #[command(name = "ls-files", about = "List the files tracked by the index")]
    LsFiles,
    #[command(name = "branch", about = "List, create or delete branches")]
    Branch {
        #[arg(short = 'd', help = "Delete the named branch")]
        delete: bool,
        #[arg(index = 1, help = "The branch name")]
        name: Option<String>,
    },
    #[command(name = "switch", about = "Switch to another branch")]
    Switch {
        #[arg(index = 1, help = "The branch to switch to")]
        branch: String,
    },
    #[command(name = "restore", about = "Restore working tree files or unstage them")]
    Restore {
        #[arg(long, help = "Restore the index entry instead of the working tree file")]
        staged: bool,
        #[arg(index = 1, help = "The path to restore")]
        path: String,
    },
    #[command(name = "cat-file", about = "Print the content of an object")]
    CatFile {
        #[arg(short = 'p', help = "The object SHA to print")]
        sha: String,
    },
    #[command(name = "hash-object", about = "Hash a file, optionally storing the blob")]
    HashObject {
        #[arg(short, long, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1, help = "The file to hash")]
        file: String,
    },
}

fn open_repository(root: Option<&str>) -> Result<Repository> {
    let root = match root {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir()?,
    };

    if !root.exists() {
        std::fs::create_dir_all(&root)?;
    }

    Repository::new(&root, Box::new(std::io::stdout()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { path } => open_repository(path.as_deref())?.init(),
        Commands::Add { paths } => open_repository(None)?.add(paths),
        Commands::Status => open_repository(None)?.status(),
        Commands::Commit { message } => open_repository(None)?.commit(message.as_deref()),
        Commands::Log => open_repository(None)?.log(),
        Commands::LsFiles => open_repository(None)?.ls_files(),
        Commands::Branch { delete, name } => {
            open_repository(None)?.branch(name.as_deref(), *delete)
        }
        Commands::Switch { branch } => open_repository(None)?.switch(branch),
        Commands::Restore { staged, path } => open_repository(None)?.restore(path, *staged),
        Commands::CatFile { sha } => open_repository(None)?.cat_file(sha),
        Commands::HashObject { write, file } => {
            open_repository(None)?.hash_object(file, *write)
        }
    }
}
