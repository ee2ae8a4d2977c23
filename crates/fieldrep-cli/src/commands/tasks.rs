use std::path::Path;

use fieldrep_core::models::{TaskStatus, TaskUpdate};

use crate::commands::common::{
    format_task_lines, normalize_identifier, normalize_notes, open_coordinator, open_service,
};
use crate::error::CliError;

pub async fn run_tasks(
    rep: &str,
    refresh: bool,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let rep_id = normalize_identifier(rep, "Representative ID")?;
    let tasks = if refresh {
        let (coordinator, _) = open_coordinator(db_path).await?;
        match coordinator.refresh_tasks(&rep_id).await? {
            Some(stored) => eprintln!("Refreshed {stored} task(s)"),
            None => eprintln!("Task refresh skipped: offline"),
        }
        coordinator.store().tasks_for_rep(&rep_id).await?
    } else {
        open_service(db_path).await?.tasks_for_rep(&rep_id).await?
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else if tasks.is_empty() {
        println!("No tasks assigned.");
    } else {
        for line in format_task_lines(&tasks) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn run_complete_task(
    id: &str,
    notes: Option<String>,
    db_path: &Path,
) -> Result<(), CliError> {
    let task_id = normalize_identifier(id, "Task ID")?;
    let update = TaskUpdate {
        status: Some(TaskStatus::Completed),
        notes: normalize_notes(notes),
        ..TaskUpdate::default()
    };

    let service = open_service(db_path).await?;
    let Some(task) = service.update_task(&task_id, update).await? else {
        return Err(CliError::TaskNotFound(task_id.to_string()));
    };
    println!("Completed {}", task.title);
    Ok(())
}
