//! Container for all available lessons
use super::Lesson;

#[derive(Clone, Debug, Default)]
pub struct LessonSet {
    pub lessons: Vec<Lesson>,
}

impl LessonSet {
    pub fn find(&self, id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    /// Adds a lesson, replacing any lesson with the same id.
    pub fn upsert(&mut self, lesson: Lesson) {
        match self.lessons.iter_mut().find(|l| l.id == lesson.id) {
            Some(existing) => *existing = lesson,
            None => self.lessons.push(lesson),
        }
    }
}
