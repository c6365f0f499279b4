use super::Lesson;

/// A person's schedule: a persistent collection of lessons kept sorted
/// chronologically. Every mutating-looking operation returns a new list and
/// leaves the receiver untouched.
///
/// The list itself never rejects duplicates or overlaps; that gate belongs
/// to the scheduling operations, which check before adding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonList {
    lessons: Vec<Lesson>,
}

impl LessonList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from lessons in any order; the sort invariant is
    /// re-established here.
    pub fn from_vec(mut lessons: Vec<Lesson>) -> Self {
        lessons.sort_by(|a, b| a.cmp_chronological(b));
        Self { lessons }
    }

    /// Returns a new list with the lesson inserted in chronological order:
    /// before the first element that compares strictly greater, otherwise at
    /// the end. Equal-key lessons keep their existing relative order.
    pub fn add(&self, lesson: Lesson) -> LessonList {
        let insert_at = self
            .lessons
            .iter()
            .position(|existing| existing.cmp_chronological(&lesson).is_gt())
            .unwrap_or(self.lessons.len());
        let mut lessons = self.lessons.clone();
        lessons.insert(insert_at, lesson);
        LessonList { lessons }
    }

    /// Returns a new list with the first element equal to `lesson` removed.
    /// When no equal element exists the result equals the original.
    pub fn remove(&self, lesson: &Lesson) -> LessonList {
        let mut lessons = self.lessons.clone();
        if let Some(found) = lessons.iter().position(|existing| existing == lesson) {
            lessons.remove(found);
        }
        LessonList { lessons }
    }

    /// Position-preserving element replacement, used for attendance flips
    /// only: the replacement must share the replaced lesson's sort key, so
    /// no re-sort happens and equal-key neighbours are never reordered.
    pub(crate) fn replace_at(&self, index: usize, lesson: Lesson) -> LessonList {
        debug_assert!(index < self.lessons.len());
        debug_assert!(self.lessons[index].cmp_chronological(&lesson).is_eq());
        let mut lessons = self.lessons.clone();
        lessons[index] = lesson;
        LessonList { lessons }
    }

    pub fn get(&self, index: usize) -> Option<&Lesson> {
        self.lessons.get(index)
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// Whether some element is value-equal to `lesson`, attendance flag
    /// included.
    pub fn has_duplicate(&self, lesson: &Lesson) -> bool {
        self.lessons.iter().any(|existing| existing == lesson)
    }

    pub fn has_overlapping_lesson(&self, lesson: &Lesson) -> bool {
        self.lessons
            .iter()
            .any(|existing| existing.overlaps_with(lesson))
    }

    pub fn attended_lesson_count(&self) -> usize {
        self.lessons.iter().filter(|lesson| lesson.is_present).count()
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }
}
