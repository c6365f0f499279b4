//! Roster persistence: one JSON document per workspace, rewritten in full
//! after every committed mutation. Stored records are plain string DTOs that
//! are validated while being converted back into model values, so a corrupt
//! file fails the load instead of smuggling bad state into the model.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::model::{Grade, GradeList, Lesson, LessonList, Person, PersonDetails, Roster};

pub const ROSTER_FILE: &str = "roster.json";
pub const ROSTER_FORMAT: &str = "rosterd-roster-v1";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRoster {
    pub format: String,
    pub persons: Vec<StoredPerson>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPerson {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub remark: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub grades: Vec<StoredGrade>,
    #[serde(default)]
    pub lessons: Vec<StoredLesson>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredGrade {
    pub subject: String,
    pub assessment: String,
    pub score: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredLesson {
    pub start: String,
    pub end: String,
    pub date: String,
    pub end_date: Option<String>,
    pub subject: String,
    #[serde(default)]
    pub is_present: bool,
}

pub fn roster_path(workspace: &Path) -> PathBuf {
    workspace.join(ROSTER_FILE)
}

/// Loads the workspace roster; a missing file means a fresh empty roster.
pub fn load_roster(workspace: &Path) -> anyhow::Result<Roster> {
    let path = roster_path(workspace);
    if !path.is_file() {
        return Ok(Roster::new());
    }
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read roster file {}", path.to_string_lossy()))?;
    let stored: StoredRoster = serde_json::from_str(&text)
        .with_context(|| format!("roster file {} is invalid JSON", path.to_string_lossy()))?;
    if stored.format != ROSTER_FORMAT {
        bail!("unsupported roster format: {}", stored.format);
    }
    stored
        .persons
        .into_iter()
        .map(to_model_person)
        .collect::<anyhow::Result<Vec<_>>>()
        .map(Roster::from_vec)
}

/// Writes the roster atomically: serialize to a temp file in the workspace,
/// then rename over the previous document.
pub fn save_roster(workspace: &Path, roster: &Roster) -> anyhow::Result<()> {
    std::fs::create_dir_all(workspace).with_context(|| {
        format!("failed to create workspace {}", workspace.to_string_lossy())
    })?;
    let stored = StoredRoster {
        format: ROSTER_FORMAT.to_string(),
        persons: roster.persons().iter().map(to_stored_person).collect(),
    };
    let text =
        serde_json::to_string_pretty(&stored).context("failed to serialize roster")?;

    let path = roster_path(workspace);
    let tmp_path = workspace.join(format!("{ROSTER_FILE}.writing"));
    let mut tmp = File::create(&tmp_path).with_context(|| {
        format!("failed to create temp file {}", tmp_path.to_string_lossy())
    })?;
    tmp.write_all(text.as_bytes())
        .context("failed to write roster")?;
    tmp.flush().context("failed to flush roster")?;
    drop(tmp);
    std::fs::rename(&tmp_path, &path).with_context(|| {
        format!("failed to move roster into place at {}", path.to_string_lossy())
    })?;
    Ok(())
}

fn to_stored_person(person: &Person) -> StoredPerson {
    StoredPerson {
        id: person.id.clone(),
        name: person.name.clone(),
        phone: person.phone.clone(),
        email: person.email.clone(),
        address: person.address.clone(),
        remark: person.remark.clone(),
        tags: person.tags.clone(),
        attributes: person.attributes.clone(),
        grades: person
            .grades
            .grades()
            .map(|grade| StoredGrade {
                subject: grade.subject.clone(),
                assessment: grade.assessment.clone(),
                score: grade.score.clone(),
            })
            .collect(),
        lessons: person
            .lessons
            .lessons()
            .iter()
            .map(|lesson| StoredLesson {
                start: lesson.start.format("%H:%M").to_string(),
                end: lesson.end.format("%H:%M").to_string(),
                date: lesson.start_date.format("%Y-%m-%d").to_string(),
                end_date: (lesson.end_date != lesson.start_date)
                    .then(|| lesson.end_date.format("%Y-%m-%d").to_string()),
                subject: lesson.subject.clone(),
                is_present: lesson.is_present,
            })
            .collect(),
    }
}

fn to_model_person(stored: StoredPerson) -> anyhow::Result<Person> {
    let person = Person::with_id(
        stored.id,
        PersonDetails {
            name: stored.name,
            phone: stored.phone,
            email: stored.email,
            address: stored.address,
            remark: stored.remark,
            tags: stored.tags,
        },
    )
    .map_err(|e| anyhow::anyhow!("invalid stored person: {e}"))?;

    let mut grades = GradeList::new();
    for stored_grade in stored.grades {
        let grade = Grade::new(stored_grade.subject, stored_grade.assessment, stored_grade.score)
            .map_err(|e| anyhow::anyhow!("invalid stored grade: {e}"))?;
        grades = grades.set_grade(grade);
    }

    let lessons = stored
        .lessons
        .into_iter()
        .map(to_model_lesson)
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(person
        .with_attributes(stored.attributes)
        .with_grades(grades)
        .with_lessons(LessonList::from_vec(lessons)))
}

fn to_model_lesson(stored: StoredLesson) -> anyhow::Result<Lesson> {
    let start = parse_time(&stored.start)?;
    let end = parse_time(&stored.end)?;
    let start_date = parse_date(&stored.date)?;
    let end_date = stored.end_date.as_deref().map(parse_date).transpose()?;
    let lesson = Lesson::new(start, end, start_date, end_date, stored.subject)
        .map_err(|e| anyhow::anyhow!("invalid stored lesson: {e}"))?;
    Ok(if stored.is_present {
        lesson.with_presence(true)
    } else {
        lesson
    })
}

pub fn parse_time(text: &str) -> anyhow::Result<chrono::NaiveTime> {
    chrono::NaiveTime::parse_from_str(text.trim(), "%H:%M")
        .with_context(|| format!("invalid time (expected HH:MM): {text}"))
}

pub fn parse_date(text: &str) -> anyhow::Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date (expected YYYY-MM-DD): {text}"))
}
