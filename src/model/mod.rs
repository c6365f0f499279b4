//! The in-memory roster model: immutable values throughout. Mutation always
//! allocates a replacement value; the single commit point is the application
//! state swapping one roster for the next.

mod grades;
mod lesson;
mod lesson_list;
pub mod ops;
mod person;
mod roster;

pub use grades::{Grade, GradeList};
pub use lesson::Lesson;
pub use lesson_list::LessonList;
pub use person::{Person, PersonDetails};
pub use roster::Roster;

/// Validation failures of the scheduling subsystem. All are rejected single
/// operations, not system faults; committed state is never touched by a
/// failed operation.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("the person index provided is invalid")]
    InvalidPersonIndex,

    #[error("the lesson index provided is invalid")]
    InvalidLessonIndex,

    #[error("this lesson already exists for this person")]
    DuplicateLesson,

    #[error("this lesson overlaps with an existing lesson for this person")]
    OverlappingLesson,

    #[error("the selected person has no lessons scheduled")]
    NoLessonsScheduled,

    #[error("this lesson is already marked as attended")]
    AlreadyMarked,

    #[error("this lesson is already marked as not attended")]
    AlreadyUnmarked,
}

impl ScheduleError {
    /// Stable error code for the wire protocol.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::InvalidPersonIndex => "invalid_person_index",
            Self::InvalidLessonIndex => "invalid_lesson_index",
            Self::DuplicateLesson => "duplicate_lesson",
            Self::OverlappingLesson => "overlapping_lesson",
            Self::NoLessonsScheduled => "no_lessons_scheduled",
            Self::AlreadyMarked => "already_marked",
            Self::AlreadyUnmarked => "already_unmarked",
        }
    }
}
