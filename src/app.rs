//! Terminal front end: runs lessons and prints progress reports.
//! All state changes go through `TutorSession`; this module only reads input and
//! renders exercises.

use chrono::Utc;
use rand::Rng;
use std::io::{self, BufRead, Write};
use tutor_core::database::store::PersistenceStore;
use tutor_core::engine::progression;
use tutor_core::models::{
    ChallengeContent, ChallengeInstance, Dialogue, DialogueLine, Lesson, MinimalPair, Sentence, Word,
};
use tutor_core::session::{LessonRun, SaveStatus, TutorSession};
use tutor_core::speech::{self, SpeechEngine, SpeechOptions};
use tutor_core::telemetry::Telemetry;

pub struct App<'a, S: PersistenceStore, T: Telemetry> {
    session: &'a mut TutorSession<S, T>,
    speech: Box<dyn SpeechEngine>,
}

impl<'a, S: PersistenceStore, T: Telemetry> App<'a, S, T> {
    pub fn new(session: &'a mut TutorSession<S, T>, speech: Box<dyn SpeechEngine>) -> Self {
        Self { session, speech }
    }

    /// Plays one lesson to the end or until input runs out.
    pub fn run_lesson<R: Rng + ?Sized>(
        &mut self,
        lesson: Lesson,
        rng: &mut R,
        input: &mut impl BufRead,
        out: &mut impl Write,
    ) -> io::Result<()> {
        let level = progression::effective_difficulty(
            self.session.settings().requested_difficulty,
            &self.session.snapshot(&lesson.id),
        );
        let challenges = self.session.generate(&lesson, rng);
        if challenges.is_empty() {
            writeln!(out, "Lesson '{}' has nothing to practice yet.", lesson.id)?;
            return Ok(());
        }
        writeln!(out, "== {} ({}) ==", display_title(&lesson), level)?;

        let mut run = LessonRun::new(lesson, challenges);
        let mut last_round = 0;
        let mut last_save = SaveStatus::Saved;
        while let Some(challenge) = run.current().cloned() {
            if run.round_number() != last_round {
                last_round = run.round_number();
                writeln!(out, "\n{}", run.phase_message())?;
            }

            self.render(&challenge, out)?;
            let Some(answer) = self.read_answer(&challenge, input, out)? else {
                if last_save.is_saved() {
                    writeln!(out, "\nStopped. Progress so far is saved.")?;
                } else {
                    writeln!(out, "\nStopped. The latest progress could not be saved.")?;
                }
                return Ok(());
            };

            let Some(outcome) = run.submit(&mut *self.session, &answer, Utc::now()) else {
                break;
            };
            if !matches!(challenge.content, ChallengeContent::Intro) {
                if outcome.correct {
                    writeln!(out, "Correct!")?;
                } else {
                    writeln!(out, "Not quite. Answer: {}", outcome.correct_answer)?;
                }
            }
            if let SaveStatus::Unsaved(message) = &outcome.save {
                writeln!(out, "({})", message)?;
            }
            last_save = outcome.save;
        }

        let id = run.lesson().id.clone();
        let snapshot = self.session.snapshot(&id);
        writeln!(
            out,
            "\nLesson complete: accuracy {}%, completed {} time(s).",
            snapshot.accuracy, snapshot.completions
        )?;
        if let Some(hint) = self.session.next_unlock(&id) {
            writeln!(
                out,
                "Next level: {} (needs +{}% accuracy, {} more completion(s))",
                hint.level, hint.accuracy_needed, hint.completions_needed
            )?;
        }
        Ok(())
    }

    fn render(&mut self, challenge: &ChallengeInstance, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "\n[{}]", challenge.challenge_type)?;
        if let Some(text) = challenge.audio_text.as_deref() {
            if self.session.settings().audio_enabled {
                let options = SpeechOptions {
                    rate: self.session.settings().speech_rate,
                    voice_key: Some(self.session.settings().voice_key.clone()),
                };
                if let Some(status) = speech::speak_or_status(self.speech.as_mut(), text, &options) {
                    writeln!(out, "({})", status)?;
                }
            }
        }

        match &challenge.content {
            ChallengeContent::Intro => {
                writeln!(out, "New: {} = {}", challenge.prompt, challenge.correct_answer)?;
                writeln!(out, "(press Enter)")?;
            }
            ChallengeContent::Options { options } => {
                if !challenge.prompt.is_empty() {
                    writeln!(out, "{}", challenge.prompt)?;
                }
                write_numbered(options, out)?;
            }
            ChallengeContent::Tiles { tiles } => {
                writeln!(out, "Translate: {}", challenge.prompt)?;
                writeln!(out, "Tiles: {}", tiles.join(" | "))?;
            }
            ChallengeContent::Cloze {
                before,
                after,
                options,
            } => {
                writeln!(out, "{} ___ {}", before, after)?;
                write_numbered(options, out)?;
            }
            ChallengeContent::FreeText { .. } => {
                writeln!(out, "Translate: {}", challenge.prompt)?;
            }
            ChallengeContent::Speech { expected } => {
                writeln!(out, "Say: {}", expected)?;
            }
            ChallengeContent::Pairs { left, right } => {
                writeln!(out, "Match (pt=en; pt=en ...)")?;
                writeln!(out, "  {}", left.join(", "))?;
                writeln!(out, "  {}", right.join(", "))?;
            }
        }
        Ok(())
    }

    /// `None` on end of input.
    fn read_answer(
        &mut self,
        challenge: &ChallengeInstance,
        input: &mut impl BufRead,
        out: &mut impl Write,
    ) -> io::Result<Option<String>> {
        if matches!(challenge.content, ChallengeContent::Speech { .. }) {
            match speech::recognize_or_status(self.speech.as_mut()) {
                Ok(transcript) => {
                    writeln!(out, "Heard: {}", transcript)?;
                    return Ok(Some(transcript));
                }
                Err(status) => writeln!(out, "({}; type it instead)", status)?,
            }
        }

        write!(out, "> ")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(resolve_choice(challenge, line.trim())))
    }
}

fn display_title(lesson: &Lesson) -> &str {
    if lesson.title.is_empty() {
        &lesson.id
    } else {
        &lesson.title
    }
}

fn write_numbered(options: &[String], out: &mut impl Write) -> io::Result<()> {
    for (i, option) in options.iter().enumerate() {
        writeln!(out, "  {}) {}", i + 1, option)?;
    }
    Ok(())
}

/// Maps a typed option number onto the option's text.
fn resolve_choice(challenge: &ChallengeInstance, answer: &str) -> String {
    challenge
        .options()
        .and_then(|options| {
            let n: usize = answer.parse().ok()?;
            options.get(n.checked_sub(1)?)
        })
        .cloned()
        .unwrap_or_else(|| answer.to_string())
}

pub fn print_status<S: PersistenceStore, T: Telemetry>(
    session: &TutorSession<S, T>,
    out: &mut impl Write,
) -> io::Result<()> {
    let data = session.data();
    writeln!(out, "Learned words: {}", data.learned_words.len())?;
    writeln!(out, "Due for review: {}", session.due_words(Utc::now()).len())?;
    if data.lesson_progress.is_empty() {
        writeln!(out, "No lessons practiced yet.")?;
    }
    for progress in &data.lesson_progress {
        let snapshot = progress.snapshot();
        writeln!(
            out,
            "  {:<20} accuracy {:>3}%  completions {:>2}  unlocked {}",
            progress.lesson_id,
            snapshot.accuracy,
            snapshot.completions,
            session.unlocked_level(&progress.lesson_id)
        )?;
    }
    Ok(())
}

pub fn print_skills<S: PersistenceStore, T: Telemetry>(
    session: &TutorSession<S, T>,
    out: &mut impl Write,
) -> io::Result<()> {
    for stat in session.skill_stats() {
        writeln!(
            out,
            "  {:<20} words {:>3}  misses {:>3}  accuracy {:>3}%",
            stat.label, stat.words, stat.misses, stat.accuracy
        )?;
    }
    let packs = session.fix_packs();
    if packs.is_empty() {
        writeln!(out, "No fix packs: no recorded mistakes on learned words.")?;
    }
    for pack in packs {
        let words: Vec<&str> = pack.words.iter().map(|w| w.pt.as_str()).collect();
        writeln!(out, "\nFix pack: {}\n  {}\n  {}", pack.label, pack.instruction, words.join(", "))?;
    }
    Ok(())
}

/// Lesson used when no lesson file is given.
pub fn sample_lesson() -> Lesson {
    let mut mae = Word::new("a mãe", "the mother");
    mae.is_gendered = true;
    let mut pai = Word::new("o pai", "the father");
    pai.is_gendered = true;
    let mut obrigado = Word::new("obrigado", "thank you");
    obrigado.pt_alternate = Some("obrigada".to_string());

    Lesson {
        id: "greetings".to_string(),
        title: "Greetings".to_string(),
        topic_id: "basics".to_string(),
        words: vec![
            Word::new("olá", "hello"),
            Word::new("bom dia", "good morning"),
            obrigado,
            Word::new("por favor", "please"),
            mae,
            pai,
        ],
        sentences: vec![
            Sentence::new("Bom dia, como está?", "Good morning, how are you?"),
            Sentence::new("Estou bem, obrigado.", "I am well, thank you."),
            Sentence::new("A minha mãe chama-se Ana.", "My mother is called Ana."),
        ],
        minimal_pairs: vec![MinimalPair {
            a: Word::new("avó", "grandmother"),
            b: Word::new("avô", "grandfather"),
            hint: Some("Open or closed o?".to_string()),
        }],
        dialogues: vec![Dialogue {
            title: "At the café".to_string(),
            lines: vec![
                DialogueLine {
                    speaker: "Empregado".to_string(),
                    pt: "Bom dia! O que deseja?".to_string(),
                    en: "Good morning! What would you like?".to_string(),
                },
                DialogueLine {
                    speaker: "Cliente".to_string(),
                    pt: "Um café, por favor.".to_string(),
                    en: "A coffee, please.".to_string(),
                },
            ],
        }],
        ..Default::default()
    }
}
