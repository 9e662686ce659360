// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `sj`: command-line client for the script jobs daemon.

mod client;
mod color;
mod commands;
mod exit_error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "sj", version, about = "Run and manage script jobs", styles = color::styles())]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the daemon is answering
    Ping,
    /// Show daemon status
    Status,
    /// List active jobs, oldest first
    Active,
    /// Start a script as a job (`-` reads the script from stdin)
    Start {
        file: PathBuf,
        /// Cancel the job after this many seconds (0 disables)
        #[arg(long, default_value_t = 0)]
        timeout: u64,
        /// Request a diagnostic bundle when the job ends
        #[arg(long)]
        dump: bool,
    },
    /// Cancel an active job
    Cancel { id: String },
    /// List published bus objects
    Objects,
    /// Invoke a method on a bus object (e.g. `call /sj/jobs/<id> cancel`)
    Call { path: String, method: String },
    /// Stop the daemon, terminating running scripts
    Shutdown,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<ExitError>() {
            Some(exit) => {
                eprintln!("{}", exit.message);
                ExitCode::from(exit.code)
            }
            None => {
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.output;
    if let Command::Status = cli.command {
        return commands::daemon::status(DaemonClient::connect(), format).await;
    }

    let client = DaemonClient::connect()?;
    match cli.command {
        Command::Ping => commands::daemon::ping(&client, format).await,
        Command::Status => commands::daemon::status(Ok(client), format).await,
        Command::Active => commands::job::active(&client, format).await,
        Command::Start { file, timeout, dump } => {
            commands::job::start(&client, &file, timeout, dump, format).await
        }
        Command::Cancel { id } => commands::job::cancel(&client, &id, format).await,
        Command::Objects => commands::bus::objects(&client, format).await,
        Command::Call { path, method } => commands::bus::call(&client, &path, &method, format).await,
        Command::Shutdown => commands::daemon::shutdown(&client, format).await,
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
