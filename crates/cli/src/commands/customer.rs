// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vox customer` - registry CRUD

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use vox_core::{AgentConfig, CustomerRecord};
use vox_fleet::{AwsCliCompute, FleetRegistry, NewCustomer, UpdateCustomer};

use crate::env;

#[derive(Args)]
pub struct CustomerArgs {
    #[command(subcommand)]
    pub command: CustomerCommand,
}

#[derive(Subcommand)]
pub enum CustomerCommand {
    /// Register a customer deployment; the instance address is resolved
    /// from the compute provider
    Add {
        customer_id: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Compute instance id hosting this tenant
        #[arg(long)]
        instance: String,
        /// Credential reference for the tenant's management API
        #[arg(long)]
        credential: String,
        /// Management API port
        #[arg(long)]
        port: Option<u16>,
        /// Initial agent config (JSON file)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List all customers
    List,
    /// Show one customer record
    Show { customer_id: String },
    /// Rename and/or merge config into a customer record
    Update {
        customer_id: String,
        #[arg(long)]
        name: Option<String>,
        /// Config overlay (JSON file), deep-merged into the record
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Remove a customer from the registry
    Remove { customer_id: String },
}

pub fn open_registry() -> Result<Arc<FleetRegistry>> {
    let path = env::state_dir()?.join("customers.json");
    let registry = FleetRegistry::open(&path)
        .with_context(|| format!("failed to open registry at {}", path.display()))?;
    Ok(Arc::new(registry))
}

fn load_config(path: &Path) -> Result<AgentConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("config file {} is not a JSON object", path.display()))
}

pub async fn run(args: CustomerArgs, json: bool) -> Result<()> {
    let registry = open_registry()?;

    match args.command {
        CustomerCommand::Add { customer_id, name, instance, credential, port, config } => {
            let agent_config = config.as_deref().map(load_config).transpose()?;
            let compute = AwsCliCompute::new(env::aws_region());
            let record = registry
                .add(
                    NewCustomer {
                        customer_id,
                        customer_name: name,
                        compute_instance_id: instance,
                        credential_reference: credential,
                        api_port: port,
                        agent_config,
                    },
                    &compute,
                )
                .await?;
            print_record(&record, json)
        }
        CustomerCommand::List => {
            let records = registry.list();
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(());
            }
            if records.is_empty() {
                println!("no customers registered");
                return Ok(());
            }
            for record in records {
                println!(
                    "{:<20} {:<24} {:<20} {}",
                    record.customer_id,
                    record.customer_name,
                    record.compute_instance_id,
                    record.endpoint().unwrap_or_else(|| "(unresolved)".to_string()),
                );
            }
            Ok(())
        }
        CustomerCommand::Show { customer_id } => {
            let record = registry
                .get(&customer_id)
                .with_context(|| format!("customer not found: {customer_id}"))?;
            print_record(&record, json)
        }
        CustomerCommand::Update { customer_id, name, config } => {
            let agent_config = config.as_deref().map(load_config).transpose()?;
            let record = registry
                .update(&customer_id, UpdateCustomer { customer_name: name, agent_config })?;
            print_record(&record, json)
        }
        CustomerCommand::Remove { customer_id } => {
            registry.remove(&customer_id)?;
            println!("removed {customer_id}");
            Ok(())
        }
    }
}

fn print_record(record: &CustomerRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }
    println!("customer:    {} ({})", record.customer_id, record.customer_name);
    println!("instance:    {}", record.compute_instance_id);
    println!(
        "endpoint:    {}",
        record.endpoint().unwrap_or_else(|| "(unresolved)".to_string())
    );
    println!("credential:  {}", record.credential_reference);
    if !record.agent_config.is_empty() {
        println!("config:      {}", serde_json::to_string(&record.agent_config)?);
    }
    Ok(())
}
