use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::{
    commit, get_one_based_index, lesson_json, open_roster, resolve_person, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::ops;

fn handle_toggle(
    state: &mut AppState,
    req: &Request,
    present: bool,
) -> Result<serde_json::Value, HandlerErr> {
    let (workspace, roster) = open_roster(state)?;
    let index = get_one_based_index(&req.params, "person")?;
    let lesson_index = get_one_based_index(&req.params, "lesson")?;
    let person = resolve_person(&roster, index)?;

    let updated = if present {
        ops::mark(person, lesson_index)?
    } else {
        ops::unmark(person, lesson_index)?
    };
    // replace_at keeps the toggled lesson at its index
    let lesson = updated.lessons.get(lesson_index).ok_or(HandlerErr {
        code: "internal",
        message: "toggled lesson vanished".to_string(),
        details: None,
    })?;
    let result = json!({
        "name": updated.name,
        "lesson": lesson_json(lesson_index, lesson),
        "attendedLessonCount": updated.lessons.attended_lesson_count(),
    });
    commit(state, &workspace, roster.replace_person(index, updated))?;
    Ok(result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.mark" => handle_toggle(state, req, true),
        "attendance.unmark" => handle_toggle(state, req, false),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
