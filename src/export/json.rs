//! JSON import/export for lesson files and the progress document.
//!
//! A lesson file holds either one lesson object or an array of lessons.

use crate::error::ImportError;
use crate::models::{Lesson, UserData};
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum LessonFile {
    Many(Vec<Lesson>),
    One(Box<Lesson>),
}

fn read(path: &Path) -> Result<String, ImportError> {
    fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn write_pretty<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), ImportError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| ImportError::Json {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, json).map_err(|source| ImportError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Reads lessons from `path`.
pub fn import_lessons(path: impl AsRef<Path>) -> Result<Vec<Lesson>, ImportError> {
    let path = path.as_ref();
    let contents = read(path)?;
    let file: LessonFile = serde_json::from_str(&contents).map_err(|source| ImportError::Json {
        path: path.display().to_string(),
        source,
    })?;

    let lessons = match file {
        LessonFile::Many(lessons) => lessons,
        LessonFile::One(lesson) => vec![*lesson],
    };
    log::info!("imported {} lesson(s) from '{}'", lessons.len(), path.display());
    Ok(lessons)
}

pub fn export_lessons(lessons: &[Lesson], path: impl AsRef<Path>) -> Result<(), ImportError> {
    write_pretty(lessons, path.as_ref())
}

pub fn export_progress(data: &UserData, path: impl AsRef<Path>) -> Result<(), ImportError> {
    write_pretty(&data.to_json(), path.as_ref())
}

/// Reads a progress document. Only unreadable files and invalid JSON fail; the
/// document itself is repaired the same way stored progress is.
pub fn import_progress(path: impl AsRef<Path>) -> Result<UserData, ImportError> {
    let path = path.as_ref();
    let contents = read(path)?;
    let value = serde_json::from_str(&contents).map_err(|source| ImportError::Json {
        path: path.display().to_string(),
        source,
    })?;
    Ok(UserData::from_json(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LearnedWordRecord, Word};
    use chrono::DateTime;
    use tempfile::tempdir;

    fn create_test_lesson() -> Lesson {
        Lesson {
            id: "greetings".to_string(),
            title: "Greetings".to_string(),
            words: vec![Word::new("olá", "hello"), Word::new("adeus", "goodbye")],
            ..Default::default()
        }
    }

    #[test]
    fn test_import_single_lesson() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lesson.json");
        fs::write(
            &path,
            r#"{
  "id": "numbers",
  "title": "Numbers",
  "words": [
    {"pt": "um", "en": "one", "isNumber": true},
    {"pt": "dois", "en": "two", "isNumber": true}
  ]
}"#,
        )
        .unwrap();

        let lessons = import_lessons(&path).unwrap();
        assert_eq!(lessons.len(), 1);
        assert_eq!(lessons[0].id, "numbers");
        assert_eq!(lessons[0].template_id, "standard");
        assert!(lessons[0].words[1].is_number);
    }

    #[test]
    fn test_export_then_import_lessons() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lessons.json");
        let lessons = vec![create_test_lesson()];

        export_lessons(&lessons, &path).unwrap();
        assert_eq!(import_lessons(&path).unwrap(), lessons);
    }

    #[test]
    fn test_import_nonexistent_file() {
        let dir = tempdir().unwrap();
        let result = import_lessons(dir.path().join("nonexistent_file_xyz123.json"));
        assert!(matches!(result, Err(ImportError::Io { .. })));
    }

    #[test]
    fn test_import_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        assert!(matches!(import_lessons(&path), Err(ImportError::Json { .. })));
        assert!(matches!(import_progress(&path), Err(ImportError::Json { .. })));
    }

    #[test]
    fn test_progress_export_and_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.json");
        let now = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let mut data = UserData::default();
        data.learned_words
            .push(LearnedWordRecord::new(&Word::new("olá", "hello"), "greetings", "", now));
        data.progress_mut("greetings").record(true);

        export_progress(&data, &path).unwrap();
        assert_eq!(import_progress(&path).unwrap(), data);
    }

    #[test]
    fn test_damaged_progress_is_repaired_on_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.json");
        fs::write(&path, r#"{"version": 2, "learnedWords": "oops", "mistakes": []}"#).unwrap();

        let data = import_progress(&path).unwrap();
        assert!(data.learned_words.is_empty());
    }
}
