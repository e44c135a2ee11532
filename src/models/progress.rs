use serde::{Deserialize, Serialize};

/// Attempt counters for one lesson.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    pub lesson_id: String,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub correct: u32,
    #[serde(default)]
    pub completions: u32,
}

/// What the progression gate sees of a lesson.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonProgressSnapshot {
    /// 0..=100
    pub accuracy: u8,
    pub completions: u32,
}

impl LessonProgress {
    pub fn new(lesson_id: &str) -> Self {
        Self {
            lesson_id: lesson_id.to_string(),
            ..Default::default()
        }
    }

    pub fn record(&mut self, was_correct: bool) {
        self.attempts = self.attempts.saturating_add(1);
        if was_correct {
            self.correct = self.correct.saturating_add(1);
        }
    }

    /// Rounded percentage of correct attempts, 0 when nothing was attempted.
    pub fn accuracy(&self) -> u8 {
        if self.attempts == 0 {
            return 0;
        }
        let correct = self.correct.min(self.attempts) as f64;
        (correct / self.attempts as f64 * 100.0).round() as u8
    }

    pub fn snapshot(&self) -> LessonProgressSnapshot {
        LessonProgressSnapshot {
            accuracy: self.accuracy(),
            completions: self.completions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_rounds() {
        let mut progress = LessonProgress::new("greetings");
        assert_eq!(progress.accuracy(), 0);

        progress.record(true);
        progress.record(true);
        progress.record(false);
        assert_eq!(progress.accuracy(), 67);

        progress.completions = 2;
        assert_eq!(
            progress.snapshot(),
            LessonProgressSnapshot {
                accuracy: 67,
                completions: 2
            }
        );
    }
}
