//! Command handlers.

use crate::output;
use crate::{CaseCommand, Cli, Commands};
use color_eyre::eyre::{eyre, Result};
use colored::Colorize;
use lf_core::config::loader::{load_config, PROJECT_DIR};
use lf_core::config::models::AppConfig;
use lf_core::init::{generate_labflow_structure, InitOptions};
use lf_core::repository::JsonFileCaseRepository;
use lf_core::state::delivery::DoctorCaseFilter;
use lf_core::state::manager::CaseManager;
use lf_protocol::{CaseView, DoctorRef};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { force, minimal } => {
            generate_labflow_structure(InitOptions {
                target_dir: cli.root.clone(),
                force,
                minimal,
            })
            .await?;
            println!(
                "{} Initialized {}",
                "✓".green(),
                cli.root.join(PROJECT_DIR).display()
            );
            Ok(())
        }
        Commands::Types => {
            let config = open_config(&cli.root).await?;
            if cli.json {
                let types: Vec<_> = config.types.list_types();
                println!("{}", serde_json::to_string_pretty(&types)?);
            } else {
                output::print_types(&config.types);
            }
            Ok(())
        }
        Commands::Validate => {
            let config = open_config(&cli.root).await?;
            println!(
                "{} {} type(s) valid, default policy {}",
                "✓".green(),
                config.types.list_types().len(),
                config.global.default_jump_policy
            );
            Ok(())
        }
        Commands::Cases {
            doctor,
            status,
            received,
            not_received,
        } => {
            let (_, manager) = open_project(&cli.root).await?;
            let filter = DoctorCaseFilter {
                delivery_status: status,
                received: match (received, not_received) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
            };
            let views = manager.list_for_doctor(&doctor, &filter).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else {
                output::print_case_list(&views);
            }
            Ok(())
        }
        Commands::Case { command } => {
            let (config, manager) = open_project(&cli.root).await?;
            let view = run_case_command(command, &config, &manager).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                output::print_case(&view);
            }
            Ok(())
        }
    }
}

async fn run_case_command(
    command: CaseCommand,
    config: &AppConfig,
    manager: &CaseManager,
) -> Result<CaseView> {
    let view = match command {
        CaseCommand::Create {
            type_id,
            doctor,
            policy,
        } => {
            // The config default is resolved here; the core always gets an
            // explicit policy.
            let policy = policy.unwrap_or(config.global.default_jump_policy);
            manager
                .create_case(&type_id, DoctorRef::Unresolved(doctor), policy)
                .await?
        }
        CaseCommand::Show { id } => manager.get_case(id).await?,
        CaseCommand::Jump { id, order, actor } => {
            manager.transition(id, &actor.principal(), order).await?
        }
        CaseCommand::Advance { id, actor } => manager.advance(id, &actor.principal()).await?,
        CaseCommand::Rewind { id, actor } => manager.rewind(id, &actor.principal()).await?,
        CaseCommand::Complete { id, actor } => {
            manager
                .complete_current_stage(id, &actor.principal())
                .await?
        }
        CaseCommand::Schedule { id, date } => manager.schedule(id, date).await?,
        CaseCommand::Deliver { id, date } => manager.deliver(id, date).await?,
        CaseCommand::Return { id } => manager.return_case(id).await?,
        CaseCommand::Approve { id, doctor } => manager.approve(id, &doctor).await?,
    };
    Ok(view)
}

async fn open_config(root: &Path) -> Result<AppConfig> {
    let lf_dir = root.join(PROJECT_DIR);
    if !lf_dir.is_dir() {
        return Err(eyre!(
            "no {} directory under {}; run `labflow init` first",
            PROJECT_DIR,
            root.display()
        ));
    }
    Ok(load_config(root).await?)
}

async fn open_project(root: &Path) -> Result<(AppConfig, CaseManager)> {
    let config = open_config(root).await?;
    let repository = Arc::new(JsonFileCaseRepository::new(
        root.join(PROJECT_DIR).join("cases"),
    ));

    let (events_tx, mut events_rx) = mpsc::channel(64);
    tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            debug!(?event, "event");
        }
    });

    let manager = CaseManager::from_config(
        &config.global,
        Arc::new(config.types.clone()),
        repository,
        events_tx,
    );
    Ok((config, manager))
}
