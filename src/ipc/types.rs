use std::path::PathBuf;

use serde::Deserialize;

use crate::model::Roster;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Sidecar state: the selected workspace and the last committed roster
/// value. Handlers never edit the roster in place; they build a replacement
/// and swap it in after the save succeeds.
#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub roster: Option<Roster>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
