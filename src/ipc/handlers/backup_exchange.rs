use std::path::PathBuf;

use serde_json::json;
use tracing::info;

use crate::backup;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, open_roster, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store;

fn handle_export(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (workspace, _) = open_roster(state)?;
    let out_path = PathBuf::from(get_required_str(&req.params, "outPath")?);

    let summary = backup::export_roster_bundle(&workspace, &out_path).map_err(|e| HandlerErr {
        code: "export_failed",
        message: format!("{e:#}"),
        details: None,
    })?;
    info!(out = %out_path.to_string_lossy(), "roster bundle exported");
    Ok(json!({
        "bundleFormat": summary.bundle_format,
        "entryCount": summary.entry_count,
        "rosterSha256": summary.roster_sha256,
        "outPath": out_path.to_string_lossy(),
    }))
}

fn handle_import(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let workspace = state.workspace.clone().ok_or(HandlerErr {
        code: "no_workspace",
        message: "no workspace selected".to_string(),
        details: None,
    })?;
    let in_path = PathBuf::from(get_required_str(&req.params, "inPath")?);

    let summary = backup::import_roster_bundle(&in_path, &workspace).map_err(|e| HandlerErr {
        code: "import_failed",
        message: format!("{e:#}"),
        details: None,
    })?;
    // reload so the in-memory roster reflects the imported document
    let roster = store::load_roster(&workspace).map_err(|e| HandlerErr {
        code: "roster_load_failed",
        message: format!("{e:#}"),
        details: None,
    })?;
    info!(persons = roster.len(), "roster bundle imported");
    let person_count = roster.len();
    state.roster = Some(roster);
    Ok(json!({
        "bundleFormatDetected": summary.bundle_format_detected,
        "rosterSha256": summary.roster_sha256,
        "personCount": person_count,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "backup.export" => handle_export(state, req),
        "backup.import" => handle_import(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
