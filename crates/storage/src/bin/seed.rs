use std::fmt;

use pathway_core::model::{CompletionRecord, LevelId, StudentId};
use storage::seed::{SeedPlan, seed_sqlite};
use storage::sqlite::SqliteRepository;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    student: Option<StudentId>,
    completions: Vec<CompletionRecord>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidStudent { raw: String },
    InvalidCompletion { raw: String },
    CompletionsWithoutStudent,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidStudent { raw } => write!(f, "invalid --student value: {raw}"),
            ArgsError::InvalidCompletion { raw } => {
                write!(f, "invalid --complete value (expected LEVEL:POINTS): {raw}")
            }
            ArgsError::CompletionsWithoutStudent => {
                write!(f, "--complete requires --student")
            }
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

fn parse_completion(raw: &str) -> Result<CompletionRecord, ArgsError> {
    let invalid = || ArgsError::InvalidCompletion {
        raw: raw.to_string(),
    };
    let (level, points) = raw.split_once(':').ok_or_else(invalid)?;
    let level: LevelId = level.parse().map_err(|_| invalid())?;
    let points: u32 = points.trim().parse().map_err(|_| invalid())?;
    Ok(CompletionRecord::new(level, points))
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("PATHWAY_DB_URL").unwrap_or_else(|_| "sqlite:pathway.sqlite3?mode=rwc".into());
        let mut student = None;
        let mut completions = Vec::new();

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--student" => {
                    let value = require_value(&mut args, "--student")?;
                    student = Some(
                        StudentId::new(&value).ok_or(ArgsError::InvalidStudent { raw: value })?,
                    );
                }
                "--complete" => {
                    let value = require_value(&mut args, "--complete")?;
                    completions.push(parse_completion(&value)?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if student.is_none() && !completions.is_empty() {
            return Err(ArgsError::CompletionsWithoutStudent);
        }

        Ok(Self {
            db_url,
            student,
            completions,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:pathway.sqlite3?mode=rwc)");
    eprintln!("  --student <id>            Student to record completions for");
    eprintln!("  --complete <level:points> Completion to record (repeatable)");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PATHWAY_DB_URL");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let repo = SqliteRepository::connect(&args.db_url).await?;
    repo.migrate().await?;

    let mut plan = SeedPlan::with_default_levels();
    if let Some(student) = &args.student {
        plan.completions = args
            .completions
            .iter()
            .map(|record| (student.clone(), *record))
            .collect();
    }
    seed_sqlite(&repo, &plan).await?;

    println!(
        "Seeded {} levels and {} completions into {}",
        plan.levels.len(),
        plan.completions.len(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
