// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vox` - voice-agent fleet operations CLI.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod env;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vox", version, about = "Operate voice-agent deployments")]
struct Cli {
    /// Emit JSON instead of plain text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Supervise the agent process on this node
    Agent(commands::agent::AgentArgs),
    /// Manage customer records in the fleet registry
    Customer(commands::customer::CustomerArgs),
    /// Operate on deployments across the fleet
    Fleet(commands::fleet::FleetArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Agent(args) => commands::agent::run(args, cli.json).await,
        Command::Customer(args) => commands::customer::run(args, cli.json).await,
        Command::Fleet(args) => commands::fleet::run(args, cli.json).await,
    }
}
