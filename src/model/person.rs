use std::collections::BTreeMap;

use uuid::Uuid;

use super::{GradeList, LessonList, ScheduleError};

/// One managed person. Immutable: edits go through the `with_*` constructors,
/// which copy the record with one field replaced, and the roster commits the
/// replacement wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub remark: String,
    pub tags: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub grades: GradeList,
    pub lessons: LessonList,
}

/// Editable plain fields for construction and edits.
#[derive(Debug, Clone, Default)]
pub struct PersonDetails {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub remark: String,
    pub tags: Vec<String>,
}

impl Person {
    pub fn new(details: PersonDetails) -> Result<Self, ScheduleError> {
        Self::with_id(Uuid::new_v4().to_string(), details)
    }

    pub fn with_id(id: String, details: PersonDetails) -> Result<Self, ScheduleError> {
        if details.name.trim().is_empty() {
            return Err(ScheduleError::InvalidArgument(
                "person name must not be blank".to_string(),
            ));
        }
        Ok(Self {
            id,
            name: details.name.trim().to_string(),
            phone: details.phone,
            email: details.email,
            address: details.address,
            remark: details.remark,
            tags: details.tags,
            attributes: BTreeMap::new(),
            grades: GradeList::new(),
            lessons: LessonList::new(),
        })
    }

    pub fn details(&self) -> PersonDetails {
        PersonDetails {
            name: self.name.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            remark: self.remark.clone(),
            tags: self.tags.clone(),
        }
    }

    pub fn with_details(&self, details: PersonDetails) -> Result<Person, ScheduleError> {
        if details.name.trim().is_empty() {
            return Err(ScheduleError::InvalidArgument(
                "person name must not be blank".to_string(),
            ));
        }
        Ok(Person {
            name: details.name.trim().to_string(),
            phone: details.phone,
            email: details.email,
            address: details.address,
            remark: details.remark,
            tags: details.tags,
            ..self.clone()
        })
    }

    pub fn with_lessons(&self, lessons: LessonList) -> Person {
        Person {
            lessons,
            ..self.clone()
        }
    }

    pub fn with_grades(&self, grades: GradeList) -> Person {
        Person {
            grades,
            ..self.clone()
        }
    }

    pub fn with_attributes(&self, attributes: BTreeMap<String, String>) -> Person {
        Person {
            attributes,
            ..self.clone()
        }
    }

    /// Case-insensitive keyword match against the name, word by word.
    pub fn name_matches(&self, query: &str) -> bool {
        let name = self.name.to_lowercase();
        query
            .split_whitespace()
            .any(|keyword| name.contains(&keyword.to_lowercase()))
    }

    /// Attribute filter: key must exist; when a value is given it must match
    /// case-insensitively.
    pub fn attribute_matches(&self, key: &str, value: Option<&str>) -> bool {
        match self.attributes.get(key) {
            None => false,
            Some(stored) => match value {
                None => true,
                Some(wanted) => stored.eq_ignore_ascii_case(wanted),
            },
        }
    }
}
