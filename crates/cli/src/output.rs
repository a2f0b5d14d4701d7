//! Human-readable rendering.

use colored::{ColoredString, Colorize};
use lf_core::template_store::TemplateStore;
use lf_protocol::{CaseView, DeliveryStatus, Stage, StageStatus};

pub fn print_types(store: &TemplateStore) {
    let types = store.list_types();
    if types.is_empty() {
        println!("{}", "No types defined".dimmed());
        return;
    }

    for lab_type in types {
        println!("{} {}", lab_type.id.bold(), format!("({})", lab_type.name).dimmed());
        for stage in &lab_type.stages {
            let roles = if stage.allowed_roles.is_empty() {
                "any role".to_string()
            } else {
                stage
                    .allowed_roles
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            println!(
                "  {:>2}. {:<16} {}",
                stage.order,
                stage.key,
                roles.dimmed()
            );
        }
    }
}

pub fn print_case(view: &CaseView) {
    let case = &view.case;
    println!("{} {}", "Case".bold(), case.id);
    println!(
        "  type {}  doctor {}  policy {}  version {}",
        case.type_id.cyan(),
        case.doctor.id().cyan(),
        case.jump_policy,
        case.version
    );
    println!(
        "  progress {}%{}",
        view.progress,
        if view.fully_done {
            format!(" {}", "(all stages done)".green())
        } else {
            String::new()
        }
    );

    for stage in &case.stages {
        let marker = if case.current_stage_order == Some(stage.order) {
            "▶".yellow()
        } else {
            " ".normal()
        };
        println!(
            "  {} {:>2}. {:<16} {}",
            marker,
            stage.order,
            stage.name,
            status_label(stage)
        );
    }

    let delivery = match case.delivery.date {
        Some(date) => format!("{} ({})", delivery_label(case.delivery.status), date.to_rfc3339()),
        None => delivery_label(case.delivery.status).to_string(),
    };
    println!("  delivery {}", delivery);

    if case.case_approval.approved {
        println!(
            "  {} by {}",
            "received".green(),
            case.case_approval.by.as_deref().unwrap_or("-")
        );
    }
}

pub fn print_case_list(views: &[CaseView]) {
    if views.is_empty() {
        println!("{}", "No cases".dimmed());
        return;
    }

    for view in views {
        let case = &view.case;
        println!(
            "{}  {:<10} {:>3}%  {}{}",
            case.id,
            case.type_id,
            view.progress,
            delivery_label(case.delivery.status),
            if case.case_approval.approved {
                format!("  {}", "received".green())
            } else {
                String::new()
            }
        );
    }
}

fn status_label(stage: &Stage) -> ColoredString {
    match stage.status {
        StageStatus::Done => "done".green(),
        StageStatus::InProgress => "in progress".yellow(),
        StageStatus::Pending => "pending".dimmed(),
    }
}

fn delivery_label(status: DeliveryStatus) -> ColoredString {
    match status {
        DeliveryStatus::Pending => status.as_str().dimmed(),
        DeliveryStatus::Scheduled => status.as_str().cyan(),
        DeliveryStatus::Delivered => status.as_str().green(),
        DeliveryStatus::Returned => status.as_str().red(),
    }
}
