use tracing::debug;

use super::{Lesson, Person, ScheduleError};

/// The four scheduling operations. Each is a pure function over one person
/// snapshot: it validates against the person's current lesson list and
/// either returns a replacement person or a typed error, never a partial
/// update.
///
/// Attendance transitions into the state the lesson is already in are
/// rejected rather than silently absorbed; the caller gets to surface that.

pub fn schedule(person: &Person, lesson: Lesson) -> Result<Person, ScheduleError> {
    if person.lessons.has_duplicate(&lesson) {
        debug!(person = %person.name, %lesson, "schedule rejected: duplicate");
        return Err(ScheduleError::DuplicateLesson);
    }
    if person.lessons.has_overlapping_lesson(&lesson) {
        debug!(person = %person.name, %lesson, "schedule rejected: overlap");
        return Err(ScheduleError::OverlappingLesson);
    }
    debug!(person = %person.name, %lesson, "lesson scheduled");
    Ok(person.with_lessons(person.lessons.add(lesson)))
}

pub fn unschedule(person: &Person, lesson_index: usize) -> Result<(Person, Lesson), ScheduleError> {
    if person.lessons.is_empty() {
        return Err(ScheduleError::NoLessonsScheduled);
    }
    let removed = person
        .lessons
        .get(lesson_index)
        .ok_or(ScheduleError::InvalidLessonIndex)?
        .clone();
    let updated = person.lessons.remove(&removed);
    debug_assert_eq!(updated.len(), person.lessons.len() - 1);
    debug!(person = %person.name, lesson = %removed, "lesson unscheduled");
    Ok((person.with_lessons(updated), removed))
}

pub fn mark(person: &Person, lesson_index: usize) -> Result<Person, ScheduleError> {
    let lesson = person
        .lessons
        .get(lesson_index)
        .ok_or(ScheduleError::InvalidLessonIndex)?;
    if lesson.is_present {
        return Err(ScheduleError::AlreadyMarked);
    }
    let marked = lesson.with_presence(true);
    debug!(person = %person.name, lesson = %marked, "attendance marked");
    Ok(person.with_lessons(person.lessons.replace_at(lesson_index, marked)))
}

pub fn unmark(person: &Person, lesson_index: usize) -> Result<Person, ScheduleError> {
    let lesson = person
        .lessons
        .get(lesson_index)
        .ok_or(ScheduleError::InvalidLessonIndex)?;
    if !lesson.is_present {
        return Err(ScheduleError::AlreadyUnmarked);
    }
    let unmarked = lesson.with_presence(false);
    debug!(person = %person.name, lesson = %unmarked, "attendance unmarked");
    Ok(person.with_lessons(person.lessons.replace_at(lesson_index, unmarked)))
}
