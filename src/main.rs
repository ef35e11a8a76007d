use clap::{Parser, Subcommand, ValueEnum};
use fintracker::config::{Config, DEFAULT_LOG_FILTER};
use fintracker::db::open_database;
use fintracker::db::queries::settings::{
    load_settings, load_settings_or_default, reset_settings, save_settings,
};
use fintracker::error::{AppError, AppResult};
use fintracker::models::{parse_summary, Language, Theme};
use fintracker::report::render_text;
use fintracker::services::settlement::settle;
use fintracker::VERSION;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "fintracker", version = VERSION)]
#[command(about = "Settle shared household expenses for a month")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute balances and suggested transfers from a monthly summary
    Settle {
        /// Monthly summary JSON file, or "-" for stdin
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show or change stored preferences
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print the current preferences
    Show,
    /// Set the report language (en, it)
    SetLang { lang: String },
    /// Set the theme (light, dark)
    SetTheme { theme: String },
    /// Forget stored preferences and go back to the defaults
    Reset,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON settlement report
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    match run(args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(args: Args, config: &Config) -> AppResult<()> {
    match args.command {
        Command::Settle { file, format } => {
            let settings = load_settings_or_default(&config.database_path);
            let json = read_input(&file)?;
            let summary = parse_summary(&json)?;
            tracing::info!(
                period = %summary.period.label(),
                users = summary.allocations.len(),
                "Settling monthly summary"
            );
            let report = settle(&summary);
            match format {
                OutputFormat::Text => print!("{}", render_text(&report, &settings)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }
        Command::Settings { action } => {
            let mut conn = open_database(&config.database_path)?;
            let mut settings = load_settings(&conn)?;
            match action {
                SettingsAction::Show => {}
                SettingsAction::Reset => {
                    settings = reset_settings(&conn)?;
                }
                SettingsAction::SetLang { lang } => {
                    settings.lang = lang.parse::<Language>()?;
                    save_settings(&mut conn, &settings)?;
                }
                SettingsAction::SetTheme { theme } => {
                    settings.theme = theme.parse::<Theme>()?;
                    save_settings(&mut conn, &settings)?;
                }
            }
            println!("lang = {}", settings.lang);
            println!("theme = {}", settings.theme);
        }
    }

    Ok(())
}

fn read_input(file: &Path) -> AppResult<String> {
    if file.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(file).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => AppError::NotFound(file.display().to_string()),
        _ => AppError::Io(e),
    })
}
