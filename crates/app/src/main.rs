use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use quiz_core::Clock;
use quiz_core::model::{ViewerSettings, ViewerSettingsDraft};
use services::audit::audit_resources;
use services::documents::PdfRenderer;
use services::{AppServices, ViewerService, open_resource_store};
use storage::resources::ResourceLayout;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as log_fmt, layer::SubscriberExt, util::SubscriberInitExt};
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidChoices { raw: String },
    InvalidDbUrl { raw: String },
    InvalidResources { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidChoices { raw } => write!(f, "invalid --choices value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidResources { raw } => write!(f, "invalid --resources value: {raw}"),
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

struct Args {
    resources: String,
    db_url: String,
    settings: ViewerSettingsDraft,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui    [options]   # launch the viewer (default)");
    eprintln!("  cargo run -p app -- check [options]   # audit the resource tree");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --resources <dir|url>   exam resources root (default ./site)");
    eprintln!("  --db <sqlite_url>       session history database (default sqlite://quiz.sqlite3)");
    eprintln!("  --subjects <a,b,...>    selectable subjects (default kanka)");
    eprintln!("  --choices <n>           answer buttons per question, 1-9 (default 5)");
    eprintln!("  --retry-unknown         allow re-answering questions that had no key data");
    eprintln!();
    eprintln!("Environment (also read from .env):");
    eprintln!("  QUIZ_RESOURCES, QUIZ_DB_URL, QUIZ_SUBJECTS, QUIZ_CHOICES, QUIZ_RETRY_UNKNOWN, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Check,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "check" => Some(Self::Check),
            _ => None,
        }
    }
}

fn split_subjects(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|subject| !subject.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_choices(raw: String) -> Result<u8, ArgsError> {
    raw.trim()
        .parse::<u8>()
        .map_err(|_| ArgsError::InvalidChoices { raw })
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut resources = std::env::var("QUIZ_RESOURCES").unwrap_or_else(|_| "./site".into());
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut subjects = std::env::var("QUIZ_SUBJECTS")
            .ok()
            .map_or_else(|| vec!["kanka".to_string()], |raw| split_subjects(&raw));
        let mut choice_count = std::env::var("QUIZ_CHOICES")
            .ok()
            .map(parse_choices)
            .transpose()?;
        let mut allow_retry_after_unknown = env_flag("QUIZ_RETRY_UNKNOWN");

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--resources" => {
                    let value = require_value(args, "--resources")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidResources { raw: value });
                    }
                    resources = value;
                }
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--subjects" => {
                    subjects = split_subjects(&require_value(args, "--subjects")?);
                }
                "--choices" => {
                    choice_count = Some(parse_choices(require_value(args, "--choices")?)?);
                }
                "--retry-unknown" => allow_retry_after_unknown = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            resources,
            db_url,
            settings: ViewerSettingsDraft {
                subjects,
                choice_count,
                allow_retry_after_unknown,
            },
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
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(log_fmt::layer().with_target(false))
        .init();
}

async fn run_check(args: Args, settings: ViewerSettings) -> Result<bool, Box<dyn std::error::Error>> {
    let store = open_resource_store(&args.resources)?;
    let viewer = ViewerService::new(
        Arc::clone(&store),
        Arc::new(PdfRenderer::new(store)),
        ResourceLayout::default(),
    );
    let report = audit_resources(&viewer, settings.subjects()).await;
    print!("{report}");
    Ok(report.is_clean())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

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
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let settings = parsed.settings.clone().validate()?;

    match cmd {
        Command::Ui => {
            info!(resources = %parsed.resources, db = %parsed.db_url, "starting viewer");
            let services = AppServices::new_sqlite(
                &parsed.db_url,
                &parsed.resources,
                Clock::system(),
                settings,
            )
            .await?;
            let app: Arc<dyn UiApp> = Arc::new(services);
            let context = build_app_context(app);

            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Exam Viewer")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Check => {
            if !run_check(parsed, settings).await? {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
