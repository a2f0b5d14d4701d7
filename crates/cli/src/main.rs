use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use lf_protocol::{DeliveryStatus, JumpPolicy, Principal};
use std::path::PathBuf;
use uuid::Uuid;

mod commands;
mod output;
mod telemetry;

#[derive(Parser)]
#[command(name = "labflow")]
#[command(about = "Track lab cases through their manufacturing stages, delivery and approval")]
#[command(version)]
struct Cli {
    /// Project root containing the .labflow directory
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Log accepted commands to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a .labflow directory with example configuration and Types
    Init {
        /// Rewrite configuration files in an existing .labflow directory
        #[arg(long)]
        force: bool,
        /// Only write the crown Type
        #[arg(long)]
        minimal: bool,
    },
    /// List Types and their stages
    Types,
    /// Load the configuration and report problems
    Validate,
    /// Work on a single case
    Case {
        #[command(subcommand)]
        command: CaseCommand,
    },
    /// List a doctor's cases
    Cases {
        /// Doctor identifier
        #[arg(long)]
        doctor: String,
        /// Only cases with this delivery status
        #[arg(long, value_parser = parse_delivery_status)]
        status: Option<DeliveryStatus>,
        /// Only cases the doctor acknowledged
        #[arg(long, conflicts_with = "not_received")]
        received: bool,
        /// Only cases the doctor has not acknowledged
        #[arg(long)]
        not_received: bool,
    },
}

#[derive(Subcommand)]
enum CaseCommand {
    /// Create a case from a Type
    Create {
        /// Type identifier
        #[arg(long = "type")]
        type_id: String,
        /// Doctor identifier
        #[arg(long)]
        doctor: String,
        /// Jump policy; defaults to the one in config.toml
        #[arg(long)]
        policy: Option<JumpPolicy>,
    },
    /// Show a case with its stages and progress
    Show { id: Uuid },
    /// Jump to the stage with the given order
    Jump {
        id: Uuid,
        #[arg(long = "to")]
        order: u32,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Move to the next stage
    Advance {
        id: Uuid,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Move back to the previous stage
    Rewind {
        id: Uuid,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Mark the current stage done
    Complete {
        id: Uuid,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Schedule delivery of a finished case
    Schedule {
        id: Uuid,
        /// RFC 3339 date, e.g. 2026-11-02T09:00:00Z
        #[arg(long)]
        date: DateTime<Utc>,
    },
    /// Record delivery of a finished case
    Deliver {
        id: Uuid,
        /// Delivery date; defaults to now
        #[arg(long)]
        date: Option<DateTime<Utc>>,
    },
    /// Record that a delivered case came back
    Return { id: Uuid },
    /// Record the doctor's acknowledgment of a delivered case
    Approve {
        id: Uuid,
        #[arg(long)]
        doctor: String,
    },
}

/// Identity used for stage role checks.
#[derive(Args, Clone)]
struct ActorArgs {
    /// Acting user
    #[arg(long, default_value = "cli")]
    user: String,
    /// Role held by the acting user; repeat for several
    #[arg(long = "role")]
    roles: Vec<String>,
}

impl ActorArgs {
    fn principal(&self) -> Principal {
        Principal::new(self.user.clone(), self.roles.iter().cloned())
    }
}

fn parse_delivery_status(value: &str) -> Result<DeliveryStatus, String> {
    [
        DeliveryStatus::Pending,
        DeliveryStatus::Scheduled,
        DeliveryStatus::Delivered,
        DeliveryStatus::Returned,
    ]
    .into_iter()
    .find(|status| status.as_str().eq_ignore_ascii_case(value))
    .ok_or_else(|| format!("unknown delivery status `{value}`"))
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    telemetry::init_tracing(cli.verbose);

    commands::run(cli).await
}
