pub mod challenge;
pub mod learned_word;
pub mod lesson;
pub mod lesson_set;
pub mod progress;
pub mod sm2;
pub mod user_data;
pub mod word;
pub mod word_stat;

pub use challenge::{ChallengeContent, ChallengeInstance, ChallengeSource};
pub use learned_word::LearnedWordRecord;
pub use lesson::Lesson;
pub use lesson_set::LessonSet;
pub use progress::{LessonProgress, LessonProgressSnapshot};
pub use user_data::UserData;
pub use word::{Dialogue, DialogueLine, GrammarPattern, MinimalPair, Sentence, Word};
pub use word_stat::{MistakeRecord, SuccessRecord, WordStat};
