use std::fmt;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quiz_core::model::{
    AnsweredQuestion, OPTION_LABELS, PoolMetadata, QuestionRecord, QuizSubmission, SessionId,
    validate_pool,
};
use services::{Clock, ManagerConfig, QuizManager};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingPool,
    InvalidNumber { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingPool => write!(f, "no question pool given (use --pool or QUIZ_POOL)"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number(flag: &'static str, raw: String) -> Result<usize, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz-app --pool <questions.json> [--count <n>] [--rounds <n>]");
    eprintln!("           [--session <id>] [--allow-repeats]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --count 10  --rounds 3  --session <random>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_POOL, QUIZ_COUNT, QUIZ_ROUNDS, QUIZ_SESSION, RUST_LOG");
}

struct Args {
    pool: PathBuf,
    count: usize,
    rounds: usize,
    session: SessionId,
    allow_repeats: bool,
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        config: &ManagerConfig,
    ) -> Result<Self, ArgsError> {
        let mut pool = std::env::var("QUIZ_POOL").ok().map(PathBuf::from);
        let mut count = std::env::var("QUIZ_COUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(config.default_quiz_size);
        let mut rounds = std::env::var("QUIZ_ROUNDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);
        let mut session = std::env::var("QUIZ_SESSION")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map_or_else(SessionId::generate, SessionId::new);
        let mut allow_repeats = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--pool" => pool = Some(PathBuf::from(require_value(args, "--pool")?)),
                "--count" => count = parse_number("--count", require_value(args, "--count")?)?,
                "--rounds" => {
                    rounds = parse_number("--rounds", require_value(args, "--rounds")?)?;
                }
                "--session" => session = SessionId::new(require_value(args, "--session")?),
                "--allow-repeats" => allow_repeats = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            pool: pool.ok_or(ArgsError::MissingPool)?,
            count: config.clamp(count),
            rounds,
            session,
            allow_repeats,
        })
    }
}

/// Accepts either `{"questions": [...]}` or a bare array of questions.
#[derive(Deserialize)]
#[serde(untagged)]
enum PoolFile {
    Wrapped { questions: Vec<QuestionRecord> },
    Bare(Vec<QuestionRecord>),
}

impl PoolFile {
    fn into_questions(self) -> Vec<QuestionRecord> {
        match self {
            PoolFile::Wrapped { questions } | PoolFile::Bare(questions) => questions,
        }
    }
}

fn load_pool(path: &Path) -> Result<Vec<QuestionRecord>, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    let questions = serde_json::from_str::<PoolFile>(&raw)?.into_questions();
    validate_pool(&questions).map_err(quiz_core::Error::from)?;
    Ok(questions)
}

/// Stand-in for a user: answers correctly about two times in three.
fn simulate_answers(questions: &[QuestionRecord]) -> Vec<AnsweredQuestion> {
    let mut rng = rand::rng();
    questions
        .iter()
        .map(|q| {
            let pick = if rng.random_bool(2.0 / 3.0) {
                q.correct_answer.as_str()
            } else {
                OPTION_LABELS.choose(&mut rng).copied().unwrap_or("A")
            };
            let secs = rng.random_range(2.0..20.0);
            AnsweredQuestion::grade(q, Some(pick), Some(secs))
        })
        .collect()
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ManagerConfig::default();
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv, &config).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let questions = load_pool(&args.pool)?;
    let manager = QuizManager::new(storage::Storage::in_memory(), Clock::system(), config);

    let mut metadata = PoolMetadata::new();
    metadata.insert("source".into(), args.pool.display().to_string());
    let ingested = manager.ingest(&args.session, questions, metadata);
    info!(session = %args.session, pool_size = ingested.pool_size, "Ready to generate quizzes");

    for _ in 0..args.rounds {
        let quiz = manager.generate(&args.session, args.count, args.allow_repeats)?;
        println!("{}", serde_json::to_string_pretty(&quiz)?);

        let answers = simulate_answers(&quiz.questions);
        let submission = QuizSubmission::from_answers(answers, None, None)
            .map_err(quiz_core::Error::from)?;
        let outcome = manager.submit(&args.session, submission);
        info!(quiz_number = outcome.quiz_number, "Submitted simulated attempt");
    }

    println!("{}", serde_json::to_string_pretty(&manager.stats(&args.session))?);
    if let Some(report) = manager.analytics(&args.session) {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
