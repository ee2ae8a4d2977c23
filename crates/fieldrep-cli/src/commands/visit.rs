use std::path::Path;

use fieldrep_core::models::{Visit, VisitOutcome};

use crate::commands::common::{normalize_identifier, normalize_notes, open_service};
use crate::error::CliError;

pub async fn run_visit(
    rep: &str,
    client: &str,
    outcome: Option<VisitOutcome>,
    notes: Option<String>,
    db_path: &Path,
) -> Result<(), CliError> {
    let rep_id = normalize_identifier(rep, "Representative ID")?;
    let client_id = normalize_identifier(client, "Client ID")?;

    let mut visit = Visit::check_in(rep_id, client_id);
    let notes = normalize_notes(notes);
    match outcome {
        Some(outcome) => visit = visit.check_out(outcome, notes),
        None => visit.notes = notes,
    }

    open_service(db_path).await?.save_visit(&visit).await?;
    println!("{}", visit.id);
    Ok(())
}

pub async fn run_discard_visit(id: &str, db_path: &Path) -> Result<(), CliError> {
    let visit_id = normalize_identifier(id, "Visit ID")?;
    let service = open_service(db_path).await?;
    if service.delete_visit(&visit_id).await?.is_none() {
        return Err(CliError::VisitNotFound(visit_id.to_string()));
    }
    println!("Discarded {visit_id}");
    Ok(())
}
