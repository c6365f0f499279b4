use std::collections::BTreeMap;

use super::ScheduleError;

/// A grade for one subject/assessment pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grade {
    pub subject: String,
    pub assessment: String,
    pub score: String,
}

impl Grade {
    pub fn new(
        subject: impl Into<String>,
        assessment: impl Into<String>,
        score: impl Into<String>,
    ) -> Result<Self, ScheduleError> {
        let subject = subject.into().trim().to_string();
        let assessment = assessment.into().trim().to_string();
        let score = score.into().trim().to_string();
        if subject.is_empty() || assessment.is_empty() || score.is_empty() {
            return Err(ScheduleError::InvalidArgument(
                "grade subject, assessment and score must not be blank".to_string(),
            ));
        }
        Ok(Self {
            subject,
            assessment,
            score,
        })
    }

    pub fn key(&self) -> String {
        grade_key(&self.subject, &self.assessment)
    }
}

pub fn grade_key(subject: &str, assessment: &str) -> String {
    format!("{}/{}", subject.trim(), assessment.trim())
}

/// Immutable collection of grades, keyed by `subject/assessment`. Setting a
/// grade for an existing key overwrites it; removal of an absent key is a
/// no-op. Both return new collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeList {
    grades: BTreeMap<String, Grade>,
}

impl GradeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_grade(&self, grade: Grade) -> GradeList {
        let mut grades = self.grades.clone();
        grades.insert(grade.key(), grade);
        GradeList { grades }
    }

    pub fn remove_grade(&self, subject: &str, assessment: &str) -> GradeList {
        let mut grades = self.grades.clone();
        grades.remove(&grade_key(subject, assessment));
        GradeList { grades }
    }

    pub fn get_grade(&self, subject: &str, assessment: &str) -> Option<&Grade> {
        self.grades.get(&grade_key(subject, assessment))
    }

    pub fn has_grade(&self, subject: &str, assessment: &str) -> bool {
        self.grades.contains_key(&grade_key(subject, assessment))
    }

    pub fn len(&self) -> usize {
        self.grades.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.grades.is_empty()
    }

    pub fn grades(&self) -> impl Iterator<Item = &Grade> {
        self.grades.values()
    }
}
