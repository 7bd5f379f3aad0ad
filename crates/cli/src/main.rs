//! Playdeck CLI - Command-line interface for the Playdeck daemon

mod rpc;
mod views;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::time::Duration;
use tabled::{Table, Tabled};

use crate::rpc::RpcClient;
use crate::views::{
    format_duration, paint_status, CheckRow, CheckView, HostRow, InventoryRow, InventoryView,
    LogRow, LogView, PageOf, RunRow, RunView,
};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9627";
const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Parser)]
#[command(name = "playdeck")]
#[command(about = "Playdeck playbook run orchestrator CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "PLAYDECK_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a playbook run
    Run {
        /// Playbook file name under the daemon's playbook directory
        playbook: String,

        /// Stored inventory name
        #[arg(short, long)]
        inventory: Option<String>,

        /// Extra variable (repeatable)
        #[arg(short = 'e', long = "extra-var", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        extra_vars: Vec<(String, String)>,

        /// Wait for the run to finish and print its output
        #[arg(short, long)]
        wait: bool,
    },

    /// List runs
    Runs {
        #[command(flatten)]
        page: PageArgs,

        /// started | completed | failed
        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        playbook: Option<String>,
    },

    /// Show one run with its output
    ShowRun { id: i64 },

    /// List execution logs
    Logs {
        #[command(flatten)]
        page: PageArgs,

        /// Only successful (true) or failed (false) executions
        #[arg(long)]
        success: Option<bool>,

        #[arg(long)]
        playbook: Option<String>,
    },

    /// Show one execution log
    ShowLog { id: i64 },

    /// List available playbooks
    Playbooks,

    /// Manage stored inventories
    #[command(subcommand)]
    Inventory(InventoryCommands),

    /// Start a reachability check for an inventory
    Check {
        /// Inventory name
        inventory: String,

        /// Wait for the check to finish and print per-host results
        #[arg(short, long)]
        wait: bool,
    },

    /// List reachability checks
    Checks {
        #[command(flatten)]
        page: PageArgs,

        /// pending | running | completed | failed
        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        inventory_id: Option<i64>,
    },

    /// Show one reachability check
    ShowCheck { id: i64 },

    /// Run a retention sweep now
    Sweep,
}

#[derive(Subcommand)]
enum InventoryCommands {
    /// Create an inventory from a file
    Add {
        name: String,
        /// Inventory file (INI or YAML inventory syntax)
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Print an inventory's content
    Show { name: String },
    /// List inventories
    List,
    /// Replace an inventory's content from a file
    Update {
        name: String,
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete an inventory
    Rm { name: String },
}

#[derive(clap::Args)]
struct PageArgs {
    /// Page number (1-based)
    #[arg(short, long, default_value = "1")]
    page: i64,

    /// Only records started at or after this RFC3339 time
    #[arg(long)]
    from: Option<String>,

    /// Only records started at or before this RFC3339 time
    #[arg(long)]
    to: Option<String>,
}

impl PageArgs {
    fn params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("page".into(), json!(self.page));
        insert_opt(&mut params, "from", self.from.as_ref());
        insert_opt(&mut params, "to", self.to.as_ref());
        params
    }
}

#[derive(Deserialize)]
struct SubmitResult {
    run_id: i64,
}

#[derive(Deserialize)]
struct CheckResult {
    check_id: i64,
}

#[derive(Deserialize)]
struct PlaybookList {
    playbooks: Vec<String>,
}

#[derive(Deserialize)]
struct InventoryList {
    inventories: Vec<InventoryView>,
}

#[derive(Deserialize, Tabled)]
struct SweepResult {
    cutoff: String,
    #[tabled(display_with = "display_count")]
    logs_deleted: Option<u64>,
    #[tabled(display_with = "display_count")]
    runs_deleted: Option<u64>,
    #[tabled(display_with = "display_count")]
    checks_deleted: Option<u64>,
}

fn display_count(count: &Option<u64>) -> String {
    match count {
        Some(n) => n.to_string(),
        None => "failed".red().to_string(),
    }
}

/// Parse a `KEY=VALUE` argument; the value may itself contain `=`
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("invalid KEY=VALUE: no `=` or empty key in `{}`", s)),
    }
}

fn insert_opt<T: serde::Serialize>(params: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        params.insert(key.to_string(), json!(value));
    }
}

fn print_page_footer<T>(page: &PageOf<T>) {
    println!(
        "Page {} of {} ({} total)",
        page.current_page, page.total_pages, page.total_count
    );
}

fn print_run(run: &RunView) {
    println!("{} {}", "Run".cyan().bold(), run.id);
    println!("  {} {}", "Playbook:".bold(), run.playbook);
    println!(
        "  {} {}",
        "Inventory:".bold(),
        run.inventory.as_deref().unwrap_or("-")
    );
    println!("  {} {}", "Status:".bold(), paint_status(&run.status));
    println!("  {} {}", "Started:".bold(), run.start_time);
    println!(
        "  {} {}",
        "Ended:".bold(),
        run.end_time.as_deref().unwrap_or("-")
    );
    println!("  {} {}", "Duration:".bold(), format_duration(run.duration));
    println!("  {} {}", "Triggered by:".bold(), run.triggered_by);
    if !run.extra_vars.is_empty() {
        println!("  {}", "Extra vars:".bold());
        for (key, value) in &run.extra_vars {
            println!("    {}={}", key, value);
        }
    }
    if !run.error.is_empty() {
        println!("  {} {}", "Error:".bold(), run.error.red());
    }
    if !run.output.is_empty() {
        println!();
        println!("{}", run.output);
    }
}

fn print_check(check: &CheckView) {
    println!("{} {}", "Check".cyan().bold(), check.id);
    println!("  {} {}", "Inventory id:".bold(), check.inventory_id);
    println!("  {} {}", "Status:".bold(), paint_status(&check.status));
    println!("  {} {}", "Started:".bold(), check.started_at);
    println!(
        "  {} {}",
        "Completed:".bold(),
        check.completed_at.as_deref().unwrap_or("-")
    );
    if !check.error.is_empty() {
        println!("  {} {}", "Error:".bold(), check.error.red());
    }
    if !check.results.is_empty() {
        let rows: Vec<HostRow> = check
            .results
            .iter()
            .map(|(host, status)| HostRow {
                host: host.clone(),
                status: paint_status(status),
            })
            .collect();
        println!();
        println!("{}", Table::new(rows));
    }
}

async fn wait_for_run(client: &RpcClient, id: i64) -> Result<RunView> {
    loop {
        let run: RunView = client.call("run.get.v1", json!({ "id": id })).await?;
        if run.status != "started" {
            return Ok(run);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

async fn wait_for_check(client: &RpcClient, id: i64) -> Result<CheckView> {
    loop {
        let check: CheckView = client.call("check.get.v1", json!({ "id": id })).await?;
        if check.status == "completed" || check.status == "failed" {
            return Ok(check);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

async fn inventory_command(client: &RpcClient, command: InventoryCommands) -> Result<()> {
    match command {
        InventoryCommands::Add { name, file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let inventory: InventoryView = client
                .call(
                    "inventory.create.v1",
                    json!({ "name": name, "content": content }),
                )
                .await?;
            println!(
                "{}",
                format!("✓ Inventory {} created (id {})", inventory.name, inventory.id)
                    .green()
                    .bold()
            );
        }
        InventoryCommands::Update { name, file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let inventory: InventoryView = client
                .call(
                    "inventory.update.v1",
                    json!({ "name": name, "content": content }),
                )
                .await?;
            println!(
                "{}",
                format!("✓ Inventory {} updated", inventory.name).green().bold()
            );
        }
        InventoryCommands::Show { name } => {
            let inventory: InventoryView = client
                .call("inventory.get.v1", json!({ "name": name }))
                .await?;
            println!("{} {}", "Inventory".cyan().bold(), inventory.name);
            println!("  {} {}", "Id:".bold(), inventory.id);
            println!("  {} {}", "Created:".bold(), inventory.created_at);
            println!("  {} {}", "Updated:".bold(), inventory.updated_at);
            println!();
            println!("{}", inventory.content);
        }
        InventoryCommands::List => {
            let list: InventoryList = client.call("inventory.list.v1", json!({})).await?;
            if list.inventories.is_empty() {
                println!("{}", "No inventories".yellow());
            } else {
                let rows: Vec<InventoryRow> =
                    list.inventories.iter().map(InventoryRow::from).collect();
                println!("{}", Table::new(rows));
            }
        }
        InventoryCommands::Rm { name } => {
            client
                .call::<Value>("inventory.delete.v1", json!({ "name": name }))
                .await?;
            println!("{}", format!("✓ Inventory {} deleted", name).green().bold());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = RpcClient::new(cli.rpc_url);

    match cli.command {
        Commands::Run {
            playbook,
            inventory,
            extra_vars,
            wait,
        } => {
            let vars: Map<String, Value> = extra_vars
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            let params = json!({
                "playbook": playbook,
                "inventory": inventory,
                "extra_vars": vars,
            });

            let submitted: SubmitResult = client.call("run.submit.v1", params).await?;
            println!(
                "{}",
                format!("✓ Run {} started", submitted.run_id).green().bold()
            );

            if wait {
                let run = wait_for_run(&client, submitted.run_id).await?;
                println!();
                print_run(&run);
            }
        }

        Commands::Runs {
            page,
            status,
            playbook,
        } => {
            let mut params = page.params();
            insert_opt(&mut params, "status", status);
            insert_opt(&mut params, "playbook", playbook);

            let runs: PageOf<RunView> = client.call("run.list.v1", Value::Object(params)).await?;
            if runs.items.is_empty() {
                println!("{}", "No runs".yellow());
            } else {
                let rows: Vec<RunRow> = runs.items.iter().map(RunRow::from).collect();
                println!("{}", Table::new(rows));
            }
            print_page_footer(&runs);
        }

        Commands::ShowRun { id } => {
            let run: RunView = client.call("run.get.v1", json!({ "id": id })).await?;
            print_run(&run);
        }

        Commands::Logs {
            page,
            success,
            playbook,
        } => {
            let mut params = page.params();
            insert_opt(&mut params, "success", success);
            insert_opt(&mut params, "playbook", playbook);

            let logs: PageOf<LogView> = client.call("log.list.v1", Value::Object(params)).await?;
            if logs.items.is_empty() {
                println!("{}", "No logs".yellow());
            } else {
                let rows: Vec<LogRow> = logs.items.iter().map(LogRow::from).collect();
                println!("{}", Table::new(rows));
            }
            print_page_footer(&logs);
        }

        Commands::ShowLog { id } => {
            let log: LogView = client.call("log.get.v1", json!({ "id": id })).await?;
            println!("{} {}", "Log".cyan().bold(), log.id);
            println!("  {} {}", "Playbook:".bold(), log.playbook);
            println!(
                "  {} {}",
                "Result:".bold(),
                if log.success {
                    "success".green()
                } else {
                    "failure".red()
                }
            );
            println!("  {} {} → {}", "Window:".bold(), log.start_time, log.end_time);
            println!("  {} {}", "Duration:".bold(), format_duration(Some(log.duration)));
            if !log.error.is_empty() {
                println!("  {} {}", "Error:".bold(), log.error.red());
            }
            println!();
            println!("{}", log.output);
        }

        Commands::Playbooks => {
            let list: PlaybookList = client.call("playbook.list.v1", json!({})).await?;
            if list.playbooks.is_empty() {
                println!("{}", "No playbooks found".yellow());
            }
            for name in list.playbooks {
                println!("{}", name);
            }
        }

        Commands::Inventory(command) => inventory_command(&client, command).await?,

        Commands::Check { inventory, wait } => {
            let started: CheckResult = client
                .call("inventory.check.v1", json!({ "name": inventory }))
                .await?;
            println!(
                "{}",
                format!("✓ Check {} started", started.check_id).green().bold()
            );

            if wait {
                let check = wait_for_check(&client, started.check_id).await?;
                println!();
                print_check(&check);
            }
        }

        Commands::Checks {
            page,
            status,
            inventory_id,
        } => {
            let mut params = page.params();
            insert_opt(&mut params, "status", status);
            insert_opt(&mut params, "inventory_id", inventory_id);

            let checks: PageOf<CheckView> =
                client.call("check.list.v1", Value::Object(params)).await?;
            if checks.items.is_empty() {
                println!("{}", "No checks".yellow());
            } else {
                let rows: Vec<CheckRow> = checks.items.iter().map(CheckRow::from).collect();
                println!("{}", Table::new(rows));
            }
            print_page_footer(&checks);
        }

        Commands::ShowCheck { id } => {
            let check: CheckView = client.call("check.get.v1", json!({ "id": id })).await?;
            print_check(&check);
        }

        Commands::Sweep => {
            println!("{}", "Running retention sweep...".cyan().bold());
            let result: SweepResult = client.call("admin.sweep.v1", json!({})).await?;
            println!("{}", Table::new(vec![result]));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("version=1.0.0"),
            Ok(("version".to_string(), "1.0.0".to_string()))
        );
        assert_eq!(
            parse_key_val("opts=a=b"),
            Ok(("opts".to_string(), "a=b".to_string()))
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_run_command_parses_vars() {
        let cli = Cli::try_parse_from([
            "playdeck",
            "run",
            "deploy.yml",
            "-i",
            "production",
            "-e",
            "version=1.0.0",
            "-e",
            "env=prod",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                playbook,
                inventory,
                extra_vars,
                wait,
            } => {
                assert_eq!(playbook, "deploy.yml");
                assert_eq!(inventory.as_deref(), Some("production"));
                assert_eq!(extra_vars.len(), 2);
                assert!(!wait);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_page_params() {
        let args = PageArgs {
            page: 3,
            from: Some("2024-01-01T00:00:00Z".to_string()),
            to: None,
        };
        let params = args.params();
        assert_eq!(params["page"], json!(3));
        assert_eq!(params["from"], json!("2024-01-01T00:00:00Z"));
        assert!(!params.contains_key("to"));
    }
}
