// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vox fleet` - controller operations across all deployments

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use vox_core::{FleetAction, FleetStatus, TenantOutcome, TenantStatus};
use vox_fleet::{AwsCliCompute, ComputeControl, FleetController, FleetTimeouts};

use crate::commands::customer::open_registry;
use crate::env;

#[derive(Args)]
pub struct FleetArgs {
    #[command(subcommand)]
    pub command: FleetCommand,
}

#[derive(Subcommand)]
pub enum FleetCommand {
    /// Check one tenant: compute power state plus agent health
    Status { customer_id: String },
    /// Check every tenant concurrently
    StatusAll {
        /// Overall budget in seconds; unfinished tenants report as timed out
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Fleet-wide aggregate counts with one row per tenant
    Overview {
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Power on a tenant's compute instance
    Start { customer_id: String },
    /// Power off a tenant's compute instance
    Stop { customer_id: String },
    /// Restart a tenant's agent process via its management endpoint
    Restart { customer_id: String },
    /// Push a config overlay (JSON file) to one or more tenants
    Deploy {
        #[arg(long)]
        config: PathBuf,
        #[arg(required = true)]
        customer_ids: Vec<String>,
    },
    /// Apply one action to many tenants, one isolated result per tenant
    Bulk {
        #[arg(long)]
        action: FleetAction,
        /// Target tenants; all registered customers when omitted
        customer_ids: Vec<String>,
        #[arg(long)]
        timeout: Option<u64>,
    },
}

fn controller() -> Result<FleetController> {
    let registry = open_registry()?;
    let compute: Arc<dyn ComputeControl> = Arc::new(AwsCliCompute::new(env::aws_region()));
    Ok(FleetController::new(registry, compute, FleetTimeouts::default(), env::state_dir()?))
}

pub async fn run(args: FleetArgs, json: bool) -> Result<()> {
    let controller = controller()?;
    let budget = |secs: Option<u64>| secs.map(Duration::from_secs);

    match args.command {
        FleetCommand::Status { customer_id } => {
            let status = controller.check_instance_status(&customer_id).await?;
            print_fleet_status(&status, json)
        }
        FleetCommand::StatusAll { timeout } => {
            let rows = controller.bulk_status_check(budget(timeout)).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }
            for row in &rows {
                print_row(row);
            }
            Ok(())
        }
        FleetCommand::Overview { timeout } => {
            let overview = controller.overview(budget(timeout)).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&overview)?);
                return Ok(());
            }
            println!("customers:          {}", overview.total_customers);
            println!("running instances:  {}", overview.running_instances);
            println!("active agents:      {}", overview.active_agents);
            println!("failed instances:   {}", overview.failed_instances);
            println!();
            for row in &overview.rows {
                print_row(row);
            }
            Ok(())
        }
        FleetCommand::Start { customer_id } => {
            if !controller.start_instance(&customer_id).await? {
                bail!("failed to start instance for {customer_id}");
            }
            println!("instance start triggered for {customer_id}");
            Ok(())
        }
        FleetCommand::Stop { customer_id } => {
            if !controller.stop_instance(&customer_id).await? {
                bail!("failed to stop instance for {customer_id}");
            }
            println!("instance stop triggered for {customer_id}");
            Ok(())
        }
        FleetCommand::Restart { customer_id } => {
            if !controller.restart_agent(&customer_id).await? {
                bail!("failed to restart agent for {customer_id}");
            }
            println!("agent restarted for {customer_id}");
            Ok(())
        }
        FleetCommand::Deploy { config, customer_ids } => {
            let raw = std::fs::read_to_string(&config)?;
            let overlay: vox_core::AgentConfig = serde_json::from_str(&raw)?;
            let mut results = Vec::with_capacity(customer_ids.len());
            for customer_id in &customer_ids {
                let deployed = match controller.deploy_config(customer_id, &overlay).await {
                    Ok(deployed) => deployed,
                    Err(e) => {
                        tracing::warn!(customer_id = %customer_id, error = %e, "deploy failed");
                        false
                    }
                };
                results.push((customer_id.clone(), deployed));
            }
            if json {
                let map: serde_json::Map<String, serde_json::Value> = results
                    .into_iter()
                    .map(|(id, ok)| (id, serde_json::Value::Bool(ok)))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&map)?);
                return Ok(());
            }
            for (customer_id, deployed) in results {
                println!("{customer_id:<20} {}", if deployed { "deployed" } else { "failed" });
            }
            Ok(())
        }
        FleetCommand::Bulk { action, customer_ids, timeout } => {
            let ids = if customer_ids.is_empty() {
                controller.registry().ids()
            } else {
                customer_ids
            };
            let results = controller.bulk_action(&ids, action, budget(timeout)).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
                return Ok(());
            }
            for (customer_id, outcome) in &results {
                let label = match outcome {
                    vox_core::ActionOutcome::Ok => "ok".to_string(),
                    vox_core::ActionOutcome::Failed { error } => format!("failed: {error}"),
                    vox_core::ActionOutcome::TimedOut => "timed out".to_string(),
                };
                println!("{customer_id:<20} {label}");
            }
            Ok(())
        }
    }
}

fn print_row(row: &TenantStatus) {
    match &row.outcome {
        TenantOutcome::Status(status) => {
            println!(
                "{:<20} compute={:<12} agent={}",
                row.customer_id, status.compute_state, status.agent_state
            );
        }
        TenantOutcome::Failed { error } => {
            println!("{:<20} failed: {error}", row.customer_id);
        }
        TenantOutcome::TimedOut => {
            println!("{:<20} timed out", row.customer_id);
        }
    }
}

fn print_fleet_status(status: &FleetStatus, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(status)?);
        return Ok(());
    }
    println!("customer:  {} ({})", status.customer_id, status.customer_name);
    println!("compute:   {}", status.compute_state);
    println!("agent:     {}", status.agent_state);
    println!("address:   {}", status.instance_address);
    if let Some(metrics) = &status.metrics {
        println!(
            "metrics:   uptime {}s, {} bytes, {:.1}% cpu",
            metrics.uptime_secs, metrics.memory_bytes, metrics.cpu_percent
        );
    }
    Ok(())
}
