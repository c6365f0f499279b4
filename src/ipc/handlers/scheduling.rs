use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::{
    commit, get_one_based_index, get_optional_str, get_required_str, lesson_json, lessons_json,
    open_roster, resolve_person, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{ops, Lesson};
use crate::store;

/// Builds the candidate lesson from raw request strings. Parsing and range
/// checks happen here; the model only sees validated primitives.
fn parse_lesson(params: &serde_json::Value) -> Result<Lesson, HandlerErr> {
    let start = store::parse_time(&get_required_str(params, "start")?)
        .map_err(|e| HandlerErr::bad_params(format!("{e:#}")))?;
    let end = store::parse_time(&get_required_str(params, "end")?)
        .map_err(|e| HandlerErr::bad_params(format!("{e:#}")))?;
    let date = store::parse_date(&get_required_str(params, "date")?)
        .map_err(|e| HandlerErr::bad_params(format!("{e:#}")))?;
    let end_date = get_optional_str(params, "endDate")?
        .map(|text| store::parse_date(&text))
        .transpose()
        .map_err(|e| HandlerErr::bad_params(format!("{e:#}")))?;
    let subject = get_required_str(params, "subject")?;

    // Same-day lessons must end strictly after they start; a cross-midnight
    // lesson declares its later end date explicitly.
    if end_date.map_or(true, |d| d == date) && end <= start {
        return Err(HandlerErr::bad_params(
            "end time must be after start time for a same-day lesson",
        ));
    }

    Ok(Lesson::new(start, end, date, end_date, subject)?)
}

fn handle_schedule(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (workspace, roster) = open_roster(state)?;
    let index = get_one_based_index(&req.params, "person")?;
    let lesson = parse_lesson(&req.params)?;
    let person = resolve_person(&roster, index)?;

    let updated = ops::schedule(person, lesson)?;
    let result = json!({
        "name": updated.name,
        "lessonCount": updated.lessons.len(),
        "lessons": lessons_json(&updated),
    });
    commit(state, &workspace, roster.replace_person(index, updated))?;
    Ok(result)
}

fn handle_unschedule(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (workspace, roster) = open_roster(state)?;
    let index = get_one_based_index(&req.params, "person")?;
    let lesson_index = get_one_based_index(&req.params, "lesson")?;
    let person = resolve_person(&roster, index)?;

    let (updated, removed) = ops::unschedule(person, lesson_index)?;
    let result = json!({
        "name": updated.name,
        "removed": removed.to_string(),
        "lessonCount": updated.lessons.len(),
        "lessons": lessons_json(&updated),
    });
    commit(state, &workspace, roster.replace_person(index, updated))?;
    Ok(result)
}

fn handle_list(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (_, roster) = open_roster(state)?;
    let index = get_one_based_index(&req.params, "person")?;
    let person = resolve_person(&roster, index)?;
    Ok(json!({
        "name": person.name,
        "lessonCount": person.lessons.len(),
        "attendedLessonCount": person.lessons.attended_lesson_count(),
        "lessons": person
            .lessons
            .lessons()
            .iter()
            .enumerate()
            .map(|(i, lesson)| lesson_json(i, lesson))
            .collect::<Vec<_>>(),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "lessons.schedule" => handle_schedule(state, req),
        "lessons.unschedule" => handle_unschedule(state, req),
        "lessons.list" => handle_list(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
