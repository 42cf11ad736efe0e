use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use pathway_core::model::{CurrentUser, LevelId, Role, StudentId};
use services::{AppServices, PathwayService, SessionService, SignIn};
use storage::remote::RemoteConfig;
use storage::seed::{SeedPlan, seed_sqlite};
use storage::sqlite::SqliteRepository;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use ui::{App, UiApp, build_app_context};

const DB_URL_ENV: &str = "PATHWAY_DB_URL";
const DEFAULT_DB_URL: &str = "sqlite://pathway.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidStudent { raw: String },
    InvalidRole { raw: String },
    InvalidLevel { raw: String },
    MissingIdentity,
    MissingLevel,
    RemoteNotConfigured,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidStudent { raw } => write!(f, "invalid --student value: {raw}"),
            ArgsError::InvalidRole { raw } => write!(f, "invalid --role value: {raw}"),
            ArgsError::InvalidLevel { raw } => write!(f, "invalid --level value: {raw}"),
            ArgsError::MissingIdentity => {
                write!(f, "sign-in needs --student, --user-id or --account")
            }
            ArgsError::MissingLevel => write!(f, "unlock needs --level"),
            ArgsError::RemoteNotConfigured => {
                write!(f, "--remote requires PATHWAY_STORE_URL and PATHWAY_STORE_KEY")
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

struct DesktopApp {
    pathway: Arc<PathwayService>,
    sessions: Arc<SessionService>,
}

impl UiApp for DesktopApp {
    fn pathway_service(&self) -> Arc<PathwayService> {
        Arc::clone(&self.pathway)
    }

    fn session_service(&self) -> Arc<SessionService> {
        Arc::clone(&self.sessions)
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  pathway ui       [--db <sqlite_url>] [--remote]");
    eprintln!("  pathway seed     [--db <sqlite_url>]");
    eprintln!("  pathway sign-in  [--db <sqlite_url>] [--role <role>] [--student <id>]");
    eprintln!("                   [--user-id <id>] [--account <number>]");
    eprintln!("  pathway sign-out [--db <sqlite_url>]");
    eprintln!("  pathway unlock   [--db <sqlite_url>] --level <number>");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --role student");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PATHWAY_DB_URL, PATHWAY_STORE_URL, PATHWAY_STORE_KEY, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Seed,
    SignIn,
    SignOut,
    Unlock,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "seed" => Some(Self::Seed),
            "sign-in" => Some(Self::SignIn),
            "sign-out" => Some(Self::SignOut),
            "unlock" => Some(Self::Unlock),
            _ => None,
        }
    }
}

#[derive(Default)]
struct SignInArgs {
    role: Option<Role>,
    student: Option<StudentId>,
    user_id: Option<String>,
    account: Option<String>,
}

impl SignInArgs {
    fn into_sign_in(self) -> Result<SignIn, ArgsError> {
        let user = match (self.user_id, self.account) {
            (Some(id), _) => CurrentUser::with_id(id),
            (None, Some(account)) => CurrentUser::with_account_number(account),
            (None, None) => match &self.student {
                Some(student) => CurrentUser::with_id(student.as_str()),
                None => return Err(ArgsError::MissingIdentity),
            },
        };
        Ok(SignIn {
            role: self.role.unwrap_or(Role::Student),
            user,
            student_id: self.student,
        })
    }
}

struct Args {
    db_url: String,
    remote: bool,
    sign_in: SignInArgs,
    level: Option<LevelId>,
}

impl Args {
    fn parse(cmd: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var(DB_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut remote = false;
        let mut sign_in = SignInArgs::default();
        let mut level = None;

        while let Some(arg) = args.next() {
            match (cmd, arg.as_str()) {
                (_, "--db") => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                (Command::Ui, "--remote") => remote = true,
                (Command::SignIn, "--role") => {
                    let value = require_value(args, "--role")?;
                    sign_in.role =
                        Some(Role::parse(&value).ok_or(ArgsError::InvalidRole { raw: value })?);
                }
                (Command::SignIn, "--student") => {
                    let value = require_value(args, "--student")?;
                    sign_in.student = Some(
                        StudentId::new(&value).ok_or(ArgsError::InvalidStudent { raw: value })?,
                    );
                }
                (Command::SignIn, "--user-id") => {
                    sign_in.user_id = Some(require_value(args, "--user-id")?);
                }
                (Command::SignIn, "--account") => {
                    sign_in.account = Some(require_value(args, "--account")?);
                }
                (Command::Unlock, "--level") => {
                    let value = require_value(args, "--level")?;
                    level = Some(
                        value
                            .parse::<LevelId>()
                            .map_err(|_| ArgsError::InvalidLevel { raw: value })?,
                    );
                }
                (_, "--help" | "-h") => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            remote,
            sign_in,
            level,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand launches the UI.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            ArgsError::UnknownArg(first.to_string())
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(cmd, &mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;

    match cmd {
        Command::Ui => {
            if parsed.remote && RemoteConfig::from_env()?.is_none() {
                return Err(ArgsError::RemoteNotConfigured.into());
            }
            let services = AppServices::from_env(&parsed.db_url).await?;
            tracing::info!(db = %parsed.db_url, "launching pathway ui");

            let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
                pathway: services.pathway(),
                sessions: services.sessions(),
            });
            let context = build_app_context(&app);

            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Learning Pathway")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Seed => {
            let repo = SqliteRepository::connect(&parsed.db_url).await?;
            repo.migrate().await?;
            let plan = SeedPlan::with_default_levels();
            seed_sqlite(&repo, &plan).await?;
            println!("Seeded {} levels into {}", plan.levels.len(), parsed.db_url);
            Ok(())
        }
        Command::SignIn => {
            let sign_in = parsed.sign_in.into_sign_in()?;
            let services = AppServices::new_sqlite(&parsed.db_url).await?;
            services.sessions().sign_in(&sign_in).await?;
            println!("Signed in as {}", sign_in.role);
            Ok(())
        }
        Command::SignOut => {
            let services = AppServices::new_sqlite(&parsed.db_url).await?;
            services.sessions().sign_out().await?;
            println!("Signed out");
            Ok(())
        }
        Command::Unlock => {
            let level = parsed.level.ok_or(ArgsError::MissingLevel)?;
            let services = AppServices::new_sqlite(&parsed.db_url).await?;
            let unlocked = services.sessions().unlock_level(level).await?;
            println!("Unlocked levels: {}", unlocked.to_json());
            Ok(())
        }
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
