use std::path::{Path, PathBuf};

use serde_json::json;

use crate::ipc::error::err;
use crate::ipc::types::AppState;
use crate::model::{Lesson, Person, Roster, ScheduleError};
use crate::store;

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }

    pub fn bad_params(message: impl Into<String>) -> Self {
        Self {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }
}

impl From<ScheduleError> for HandlerErr {
    fn from(e: ScheduleError) -> Self {
        Self {
            code: e.code(),
            message: e.to_string(),
            details: None,
        }
    }
}

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_optional_str(
    params: &serde_json::Value,
    key: &str,
) -> Result<Option<String>, HandlerErr> {
    match params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a string", key))),
    }
}

/// Reads a one-based positive index from the params and translates it to
/// zero-based. `0`, negatives and non-integers are rejected here; whether
/// the index fits the current collection is the model's call.
pub fn get_one_based_index(params: &serde_json::Value, key: &str) -> Result<usize, HandlerErr> {
    let raw = params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {} (one-based index)", key)))?;
    if raw < 1 {
        return Err(HandlerErr::bad_params(format!(
            "{} must be a positive one-based index",
            key
        )));
    }
    Ok((raw - 1) as usize)
}

/// Snapshot of the open workspace and its committed roster. Cloned out so
/// the handler can build a replacement roster without holding a borrow on
/// the state.
pub fn open_roster(state: &AppState) -> Result<(PathBuf, Roster), HandlerErr> {
    let workspace = state.workspace.clone().ok_or(HandlerErr {
        code: "no_workspace",
        message: "no workspace selected".to_string(),
        details: None,
    })?;
    let roster = state.roster.clone().ok_or(HandlerErr {
        code: "no_workspace",
        message: "no roster loaded".to_string(),
        details: None,
    })?;
    Ok((workspace, roster))
}

/// Persists the replacement roster, then makes it the committed state. On a
/// failed save the previous committed roster stays in effect.
pub fn commit(state: &mut AppState, workspace: &Path, roster: Roster) -> Result<(), HandlerErr> {
    store::save_roster(workspace, &roster).map_err(|e| HandlerErr {
        code: "store_failed",
        message: format!("{e:#}"),
        details: None,
    })?;
    state.roster = Some(roster);
    Ok(())
}

pub fn resolve_person<'a>(roster: &'a Roster, index: usize) -> Result<&'a Person, HandlerErr> {
    roster
        .get(index)
        .ok_or_else(|| ScheduleError::InvalidPersonIndex.into())
}

pub fn person_summary(index: usize, person: &Person) -> serde_json::Value {
    json!({
        "person": index + 1,
        "id": person.id,
        "name": person.name,
        "phone": person.phone,
        "email": person.email,
        "address": person.address,
        "remark": person.remark,
        "tags": person.tags,
        "attributes": person.attributes,
        "lessonCount": person.lessons.len(),
        "attendedLessonCount": person.lessons.attended_lesson_count(),
    })
}

pub fn lesson_json(index: usize, lesson: &Lesson) -> serde_json::Value {
    json!({
        "lesson": index + 1,
        "start": lesson.start.format("%H:%M").to_string(),
        "end": lesson.end.format("%H:%M").to_string(),
        "date": lesson.start_date.format("%Y-%m-%d").to_string(),
        "endDate": lesson.end_date.format("%Y-%m-%d").to_string(),
        "subject": lesson.subject,
        "isPresent": lesson.is_present,
        "display": lesson.to_string(),
    })
}

pub fn lessons_json(person: &Person) -> serde_json::Value {
    person
        .lessons
        .lessons()
        .iter()
        .enumerate()
        .map(|(index, lesson)| lesson_json(index, lesson))
        .collect()
}
