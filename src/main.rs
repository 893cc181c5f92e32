//! instance-health CLI.
//!
//! ```text
//! instance-health check -i main          # exit 0 healthy, 1 unhealthy, 3 unknown
//! instance-health batch main staging     # table, exit 0 only if all healthy
//! instance-health batch --json a b c     # JSON array
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use instance_health::config::{load_config, HealthConfig};
use instance_health::lifecycle::signals::cancel_on_ctrl_c;
use instance_health::observability::logging;
use instance_health::{HealthChecker, HealthState, HealthStatus, ProbeContext};

#[derive(Parser)]
#[command(name = "instance-health")]
#[command(about = "Health checks for locally installed service instances", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a single instance
    Check {
        /// Name of the service instance
        #[arg(short, long)]
        instance: String,
    },
    /// Check several instances concurrently
    Batch {
        /// Instance names, reported in the order given
        #[arg(required = true)]
        instances: Vec<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => HealthConfig::default(),
    };
    logging::init(&config.observability)?;

    let checker = HealthChecker::from_config(&config);
    let ctx = ProbeContext::background();
    let interrupt = cancel_on_ctrl_c(&ctx);

    let code = match cli.command {
        Commands::Check { instance } => {
            let status = checker.get_status(&ctx, &instance).await;
            report_single(&status)
        }
        Commands::Batch { instances, json } => {
            tracing::debug!(
                instances = instances.len(),
                concurrency = checker.batch_concurrency(instances.len()),
                "Checking batch"
            );
            let statuses = checker.get_status_batch(&ctx, &instances).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&statuses)?);
            } else {
                print_table(&statuses);
            }
            if statuses.iter().all(HealthStatus::is_healthy) {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
    };

    interrupt.abort();
    Ok(code)
}

fn report_single(status: &HealthStatus) -> ExitCode {
    match status.state() {
        HealthState::Healthy => {
            println!("healthy");
            ExitCode::SUCCESS
        }
        HealthState::Unhealthy => {
            println!("unhealthy");
            ExitCode::from(1)
        }
        HealthState::Unknown => {
            if let Some(error) = status.error() {
                eprintln!("Error: {}: {}", status.instance(), error);
            }
            ExitCode::from(3)
        }
    }
}

fn print_table(statuses: &[HealthStatus]) {
    let width = statuses
        .iter()
        .map(|s| s.instance().len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    println!("{:<width$}  {:<9}  ERROR", "NAME", "STATUS");
    for status in statuses {
        let error = status.error().map(ToString::to_string).unwrap_or_default();
        println!(
            "{:<width$}  {:<9}  {}",
            status.instance(),
            status.state().as_str(),
            error
        );
    }
}
