use std::path::PathBuf;

use serde_json::json;
use tracing::info;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "personCount": state.roster.as_ref().map(|r| r.len()),
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    if let Err(e) = std::fs::create_dir_all(&path) {
        return err(&req.id, "workspace_open_failed", format!("{e}"), None);
    }
    match store::load_roster(&path) {
        Ok(roster) => {
            info!(workspace = %path.to_string_lossy(), persons = roster.len(), "workspace opened");
            state.workspace = Some(path.clone());
            state.roster = Some(roster);
            ok(
                &req.id,
                json!({
                    "workspacePath": path.to_string_lossy(),
                    "personCount": state.roster.as_ref().map(|r| r.len()),
                }),
            )
        }
        Err(e) => err(&req.id, "roster_load_failed", format!("{e:#}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
