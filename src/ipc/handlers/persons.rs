use serde_json::json;
use tracing::debug;

use crate::ipc::error::ok;
use crate::ipc::helpers::{
    commit, get_one_based_index, get_optional_str, get_required_str, open_roster, person_summary,
    resolve_person, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{Grade, Person, PersonDetails};

fn read_tags(params: &serde_json::Value) -> Result<Vec<String>, HandlerErr> {
    match params.get("tags") {
        None => Ok(Vec::new()),
        Some(v) if v.is_null() => Ok(Vec::new()),
        Some(v) => v
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .map(|s| s.to_string())
                    .collect()
            })
            .ok_or_else(|| HandlerErr::bad_params("tags must be an array of strings")),
    }
}

fn handle_add(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (workspace, roster) = open_roster(state)?;
    let details = PersonDetails {
        name: get_required_str(&req.params, "name")?,
        phone: get_optional_str(&req.params, "phone")?.unwrap_or_default(),
        email: get_optional_str(&req.params, "email")?.unwrap_or_default(),
        address: get_optional_str(&req.params, "address")?.unwrap_or_default(),
        remark: get_optional_str(&req.params, "remark")?.unwrap_or_default(),
        tags: read_tags(&req.params)?,
    };
    let person = Person::new(details)?;
    let summary = person_summary(roster.len(), &person);
    debug!(name = %person.name, "person added");
    commit(state, &workspace, roster.add_person(person))?;
    Ok(summary)
}

fn handle_list(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (_, roster) = open_roster(state)?;
    if roster.is_empty() {
        return Ok(json!({ "personCount": 0, "persons": [] }));
    }
    Ok(json!({
        "personCount": roster.len(),
        "persons": roster
            .persons()
            .iter()
            .enumerate()
            .map(|(index, person)| person_summary(index, person))
            .collect::<Vec<_>>(),
    }))
}

fn handle_edit(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (workspace, roster) = open_roster(state)?;
    let index = get_one_based_index(&req.params, "person")?;
    let person = resolve_person(&roster, index)?;

    let mut details = person.details();
    if let Some(name) = get_optional_str(&req.params, "name")? {
        details.name = name;
    }
    if let Some(phone) = get_optional_str(&req.params, "phone")? {
        details.phone = phone;
    }
    if let Some(email) = get_optional_str(&req.params, "email")? {
        details.email = email;
    }
    if let Some(address) = get_optional_str(&req.params, "address")? {
        details.address = address;
    }
    if let Some(remark) = get_optional_str(&req.params, "remark")? {
        details.remark = remark;
    }
    if req.params.get("tags").is_some() {
        details.tags = read_tags(&req.params)?;
    }

    let edited = person.with_details(details)?;
    let summary = person_summary(index, &edited);
    commit(state, &workspace, roster.replace_person(index, edited))?;
    Ok(summary)
}

fn handle_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (workspace, roster) = open_roster(state)?;
    let index = get_one_based_index(&req.params, "person")?;
    let removed = resolve_person(&roster, index)?.clone();
    commit(state, &workspace, roster.remove_person(index))?;
    debug!(name = %removed.name, "person deleted");
    Ok(json!({ "deleted": removed.name, "id": removed.id }))
}

fn handle_find(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (_, roster) = open_roster(state)?;
    let query = get_required_str(&req.params, "query")?;
    let matches: Vec<_> = roster
        .persons()
        .iter()
        .enumerate()
        .filter(|(_, person)| person.name_matches(&query))
        .map(|(index, person)| person_summary(index, person))
        .collect();
    Ok(json!({ "count": matches.len(), "persons": matches }))
}

fn handle_filter(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (_, roster) = open_roster(state)?;
    let key = get_required_str(&req.params, "key")?;
    let value = get_optional_str(&req.params, "value")?;
    let matches: Vec<_> = roster
        .persons()
        .iter()
        .enumerate()
        .filter(|(_, person)| person.attribute_matches(&key, value.as_deref()))
        .map(|(index, person)| person_summary(index, person))
        .collect();
    Ok(json!({ "count": matches.len(), "persons": matches }))
}

fn handle_attribute_set(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (workspace, roster) = open_roster(state)?;
    let index = get_one_based_index(&req.params, "person")?;
    let key = get_required_str(&req.params, "key")?;
    let value = get_required_str(&req.params, "value")?;
    if key.trim().is_empty() {
        return Err(HandlerErr::bad_params("attribute key must not be blank"));
    }
    let person = resolve_person(&roster, index)?;

    let mut attributes = person.attributes.clone();
    attributes.insert(key.trim().to_string(), value);
    let edited = person.with_attributes(attributes);
    let summary = person_summary(index, &edited);
    commit(state, &workspace, roster.replace_person(index, edited))?;
    Ok(summary)
}

fn handle_attribute_delete(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let (workspace, roster) = open_roster(state)?;
    let index = get_one_based_index(&req.params, "person")?;
    let key = get_required_str(&req.params, "key")?;
    let person = resolve_person(&roster, index)?;

    let mut attributes = person.attributes.clone();
    let existed = attributes.remove(key.trim()).is_some();
    let edited = person.with_attributes(attributes);
    let summary = person_summary(index, &edited);
    commit(state, &workspace, roster.replace_person(index, edited))?;
    Ok(json!({ "removed": existed, "personSummary": summary }))
}

fn handle_grade_set(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (workspace, roster) = open_roster(state)?;
    let index = get_one_based_index(&req.params, "person")?;
    let grade = Grade::new(
        get_required_str(&req.params, "subject")?,
        get_required_str(&req.params, "assessment")?,
        get_required_str(&req.params, "score")?,
    )?;
    let person = resolve_person(&roster, index)?;

    let previous = person
        .grades
        .get_grade(&grade.subject, &grade.assessment)
        .map(|g| g.score.clone());
    let edited = person.with_grades(person.grades.set_grade(grade.clone()));
    let grade_count = edited.grades.len();
    commit(state, &workspace, roster.replace_person(index, edited))?;
    Ok(json!({
        "subject": grade.subject,
        "assessment": grade.assessment,
        "score": grade.score,
        "previousScore": previous,
        "gradeCount": grade_count,
    }))
}

fn handle_grade_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (workspace, roster) = open_roster(state)?;
    let index = get_one_based_index(&req.params, "person")?;
    let subject = get_required_str(&req.params, "subject")?;
    let assessment = get_required_str(&req.params, "assessment")?;
    let person = resolve_person(&roster, index)?;

    let existed = person.grades.has_grade(&subject, &assessment);
    let edited = person.with_grades(person.grades.remove_grade(&subject, &assessment));
    let grade_count = edited.grades.len();
    commit(state, &workspace, roster.replace_person(index, edited))?;
    Ok(json!({ "removed": existed, "gradeCount": grade_count }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "persons.add" => handle_add(state, req),
        "persons.list" => handle_list(state, req),
        "persons.edit" => handle_edit(state, req),
        "persons.delete" => handle_delete(state, req),
        "persons.find" => handle_find(state, req),
        "persons.filter" => handle_filter(state, req),
        "attributes.set" => handle_attribute_set(state, req),
        "attributes.delete" => handle_attribute_delete(state, req),
        "grades.set" => handle_grade_set(state, req),
        "grades.delete" => handle_grade_delete(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
