// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vox agent` - supervise the agent process on this node

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use vox_core::{AgentStatus, StartOutcome, StopOutcome};
use vox_supervisor::{Supervisor, SupervisorConfig, UnixProcessControl};

use crate::env;

#[derive(Args)]
pub struct AgentArgs {
    /// Command that launches the agent process
    #[arg(long, default_value = "python3")]
    pub launch_command: String,

    /// Argument passed to the launch command (repeatable)
    #[arg(long = "launch-arg")]
    pub launch_args: Vec<String>,

    /// Working directory for the agent process
    #[arg(long)]
    pub working_dir: Option<PathBuf>,

    /// Status record path (default: <state>/agent/status.json)
    #[arg(long)]
    pub status_file: Option<PathBuf>,

    /// Agent log path (default: <state>/agent/agent.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: AgentCommand,
}

#[derive(Subcommand)]
pub enum AgentCommand {
    /// Show the agent's persisted status, corrected against the process table
    Status,
    /// Start the agent and wait for launch confirmation
    Start {
        /// Restart if already running instead of refusing
        #[arg(long)]
        force: bool,
    },
    /// Stop the agent (graceful, then escalate)
    Stop,
    /// Stop and relaunch the agent
    Restart,
    /// Show the agent's resource usage
    Metrics,
    /// Show recent agent log output
    Logs {
        /// Number of recent lines to show
        #[arg(short = 'n', long, default_value = "50")]
        lines: usize,
    },
}

pub async fn run(args: AgentArgs, json: bool) -> Result<()> {
    let state = env::state_dir()?;
    let status_path = args.status_file.unwrap_or_else(|| state.join("agent/status.json"));
    let log_path = args.log_file.unwrap_or_else(|| state.join("agent/agent.log"));

    let mut config = SupervisorConfig::new(args.launch_command, status_path, log_path);
    config.args = args.launch_args;
    config.working_dir = args.working_dir;
    let supervisor = Supervisor::new(config, UnixProcessControl::new());

    match args.command {
        AgentCommand::Status => {
            print_status(&supervisor.status(), json)?;
            Ok(())
        }
        AgentCommand::Start { force } => report_start(supervisor.start(force).await, json),
        AgentCommand::Stop => {
            match supervisor.stop().await {
                StopOutcome::Stopped(status) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&status)?);
                    } else {
                        println!("agent stopped");
                    }
                }
                StopOutcome::NotRunning => println!("agent not running"),
            }
            Ok(())
        }
        AgentCommand::Restart => report_start(supervisor.restart().await, json),
        AgentCommand::Metrics => {
            let metrics = supervisor.metrics();
            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                println!("state:    {}", metrics.state);
                println!("uptime:   {}s", metrics.uptime_secs);
                println!("memory:   {} bytes", metrics.memory_bytes);
                println!("cpu:      {:.1}%", metrics.cpu_percent);
            }
            Ok(())
        }
        AgentCommand::Logs { lines } => {
            println!("{}", supervisor.recent_logs(lines));
            Ok(())
        }
    }
}

fn report_start(outcome: StartOutcome, json: bool) -> Result<()> {
    match outcome {
        StartOutcome::Started(status) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else if let Some(pid) = status.pid {
                println!("agent started (pid {pid})");
            } else {
                println!("agent started");
            }
            Ok(())
        }
        StartOutcome::AlreadyRunning(status) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else if let Some(pid) = status.pid {
                println!("agent already running (pid {pid})");
            } else {
                println!("agent already running");
            }
            Ok(())
        }
        StartOutcome::Failed { message, .. } => bail!("agent start failed: {message}"),
    }
}

fn print_status(status: &AgentStatus, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(status)?);
        return Ok(());
    }
    println!("state:          {}", status.state);
    if let Some(pid) = status.pid {
        println!("pid:            {pid}");
    }
    if let Some(t) = status.start_time {
        println!("started:        {t}");
    }
    if let Some(t) = status.stop_time {
        println!("stopped:        {t}");
    }
    println!("restart count:  {}", status.restart_count);
    if let Some(msg) = &status.error_message {
        println!("last error:     {msg}");
    }
    Ok(())
}
