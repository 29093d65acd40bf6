//! Woodworks CLI - Estimates from the command line
//!
//! Commands: estimate, charts, report, filename, sample
//! Outputs JSON to stdout (report prints text)
//! Returns non-zero when the config or project cannot be loaded

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

use woodworks_core::{
    export_filename, project_fingerprint, report::render_summary, EstimatorConfig, ProjectError,
    ProjectFile, Session,
};

#[derive(Parser)]
#[command(name = "woodworks-cli")]
#[command(about = "Woodworks CLI - Woodworking Cost Estimator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to estimator config (lumber catalog and default financials)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log to stderr; repeat for more detail
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print derived totals
    Estimate {
        /// Project file (JSON). Defaults to the sample project
        #[arg(short, long)]
        project: Option<PathBuf>,
    },

    /// Print chart-ready series
    Charts {
        /// Project file (JSON). Defaults to the sample project
        #[arg(short, long)]
        project: Option<PathBuf>,
    },

    /// Print the cost overview as text
    Report {
        /// Project file (JSON). Defaults to the sample project
        #[arg(short, long)]
        project: Option<PathBuf>,
    },

    /// Print the export filename for a project name
    Filename {
        #[arg(short, long)]
        name: String,
    },

    /// Print the sample project file
    Sample,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn print_error(message: impl Display) {
    println!("{}", serde_json::json!({ "error": message.to_string() }));
}

fn print_json(value: &impl Serialize) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_error(e);
            ExitCode::FAILURE
        }
    }
}

fn fail(message: impl Display) -> ExitCode {
    print_error(message);
    ExitCode::FAILURE
}

fn print_estimate(session: &mut Session) -> ExitCode {
    let fingerprint = match project_fingerprint(session.project()) {
        Ok(f) => f,
        Err(e) => return fail(e),
    };
    let totals = session.estimate().clone();
    let name = &session.project().details.name;
    print_json(&serde_json::json!({
        "project": name,
        "filename": export_filename(name),
        "fingerprint": fingerprint,
        "totals": totals,
    }))
}

fn open_session(config: &EstimatorConfig, project: Option<&Path>) -> Result<Session, ProjectError> {
    match project {
        Some(path) => Session::load_project(config, path),
        None => Ok(Session::with_sample(config)),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => match EstimatorConfig::load_from_file(path) {
            Ok(c) => c,
            Err(e) => return fail(e),
        },
        None => EstimatorConfig::default(),
    };

    match cli.command {
        Commands::Estimate { project } => match open_session(&config, project.as_deref()) {
            Ok(mut session) => print_estimate(&mut session),
            Err(e) => fail(e),
        },

        Commands::Charts { project } => match open_session(&config, project.as_deref()) {
            Ok(mut session) => print_json(&session.chart_data()),
            Err(e) => fail(e),
        },

        Commands::Report { project } => match open_session(&config, project.as_deref()) {
            Ok(mut session) => {
                let totals = session.estimate().clone();
                print!("{}", render_summary(session.project(), &totals));
                ExitCode::SUCCESS
            }
            Err(e) => fail(e),
        },

        Commands::Filename { name } => {
            print_json(&serde_json::json!({ "filename": export_filename(&name) }))
        }

        Commands::Sample => {
            let project = Session::with_sample(&config).into_project();
            print_json(&ProjectFile::from_project(&project))
        }
    }
}
