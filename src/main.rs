mod app;

use app::{App, print_skills, print_status, sample_lesson};
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tutor_core::database::SqliteStore;
use tutor_core::export::json::{export_lessons, export_progress, import_lessons, import_progress};
use tutor_core::models::LessonSet;
use tutor_core::speech::SilentSpeech;
use tutor_core::telemetry::LogTelemetry;
use tutor_core::{DifficultyLevel, SaveStatus, TemplateSet, TutorSession};

/// Portuguese tutor: generated lessons, spaced review and skill-based fix packs.
#[derive(Parser, Debug)]
#[command(name = "tutor")]
#[command(version, about, long_about = None)]
struct Cli {
    /// SQLite file holding progress and settings
    #[arg(long, value_name = "FILE", default_value = "tutor.sqlite3")]
    db: PathBuf,

    /// Seed for exercise generation (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with extra or overriding lesson templates
    #[arg(long, value_name = "FILE")]
    templates: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a lesson interactively
    Lesson {
        /// Lesson file (one lesson or an array); the built-in sample when omitted
        file: Option<PathBuf>,
        /// Lesson to run; the first lesson in the file when omitted
        lesson_id: Option<String>,
    },
    /// Review learned words, due words first
    Review,
    /// Show skill statistics and fix packs
    Skills,
    /// Practice the first fix pack
    Fix,
    /// Show per-lesson progress
    Status,
    /// Write the progress document to a JSON file
    Export { file: PathBuf },
    /// Write lessons, with defaults filled in, to a JSON file
    ExportLessons {
        file: PathBuf,
        /// Lesson file to read from; the built-in sample when omitted
        #[arg(long, value_name = "FILE")]
        from: Option<PathBuf>,
    },
    /// Replace progress with a previously exported JSON file
    Import { file: PathBuf },
    /// Clear all progress
    Reset,
    /// Show or change stored settings
    Settings {
        /// beginner, intermediate, advanced or hard
        #[arg(long)]
        difficulty: Option<String>,
        #[arg(long)]
        audio: Option<bool>,
        #[arg(long)]
        rate: Option<f32>,
        /// Generate drills marked optional in templates
        #[arg(long)]
        optional: Option<bool>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let templates = match &cli.templates {
        Some(path) => TemplateSet::from_json(&fs::read_to_string(path)?)?,
        None => TemplateSet::builtin(),
    };
    let store = SqliteStore::open(&cli.db)?;
    let mut session = TutorSession::open(store, LogTelemetry, templates);
    let seed = cli.seed.unwrap_or_else(rand::random);
    log::debug!("generation seed {}", seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    match cli.command {
        Command::Lesson { file, lesson_id } => {
            let lessons = load_lessons(file)?;
            let lesson = match lesson_id.as_deref() {
                Some(id) => lessons.find(id),
                None => lessons.lessons.first(),
            }
            .cloned()
            .ok_or("no such lesson")?;

            App::new(&mut session, Box::new(SilentSpeech))
                .run_lesson(lesson, &mut rng, &mut input, &mut out)?;
        }
        Command::Review => match session.review_lesson(Utc::now()) {
            Some(lesson) => {
                println!("{} word(s) due now.", session.due_words(Utc::now()).len());
                App::new(&mut session, Box::new(SilentSpeech))
                    .run_lesson(lesson, &mut rng, &mut input, &mut out)?;
            }
            None => println!("Nothing to review yet. Complete a lesson first."),
        },
        Command::Skills => print_skills(&session, &mut out)?,
        Command::Fix => match session.fix_packs().into_iter().next() {
            Some(pack) => {
                println!("{}", pack.instruction);
                App::new(&mut session, Box::new(SilentSpeech))
                    .run_lesson(pack.to_lesson(), &mut rng, &mut input, &mut out)?;
            }
            None => println!("No fix packs: no recorded mistakes on learned words."),
        },
        Command::Status => print_status(&session, &mut out)?,
        Command::Export { file } => {
            export_progress(session.data(), &file)?;
            println!("Progress written to '{}'", file.display());
        }
        Command::ExportLessons { file, from } => {
            let lessons = load_lessons(from)?;
            export_lessons(&lessons.lessons, &file)?;
            println!(
                "{} lesson(s) written to '{}'",
                lessons.lessons.len(),
                file.display()
            );
        }
        Command::Import { file } => {
            let data = import_progress(&file)?;
            println!("Imported {} learned word(s)", data.learned_words.len());
            report(session.replace_data(data));
        }
        Command::Reset => {
            report(session.reset_progress());
            println!("Progress cleared.");
        }
        Command::Settings {
            difficulty,
            audio,
            rate,
            optional,
        } => {
            let mut settings = session.settings().clone();
            if let Some(name) = difficulty {
                settings.requested_difficulty = DifficultyLevel::parse(&name)
                    .ok_or_else(|| format!("unknown difficulty '{}'", name))?;
            }
            if let Some(audio) = audio {
                settings.audio_enabled = audio;
            }
            if let Some(rate) = rate {
                settings.speech_rate = rate.clamp(0.5, 2.0);
            }
            if let Some(optional) = optional {
                settings.include_optional = optional;
            }
            if &settings != session.settings() {
                report(session.set_settings(settings));
            }
            println!("{}", serde_json::to_string_pretty(session.settings())?);
        }
    }
    Ok(())
}

fn load_lessons(file: Option<PathBuf>) -> Result<LessonSet, Box<dyn std::error::Error>> {
    let mut lessons = LessonSet::default();
    match file {
        Some(path) => import_lessons(path)?
            .into_iter()
            .for_each(|l| lessons.upsert(l)),
        None => lessons.upsert(sample_lesson()),
    }
    Ok(lessons)
}

fn report(status: SaveStatus) {
    if let SaveStatus::Unsaved(message) = status {
        eprintln!("{}", message);
    }
}
