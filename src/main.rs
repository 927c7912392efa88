//! learning-intel entrypoint: generate a synthetic cohort, train artifacts, and
//! serve predict / difficulty / insights requests as one-shot commands.
//! Results go to stdout as JSON; logs go to stderr.

use anyhow::Context;
use clap::{Parser, Subcommand};
use learning_intel::{
    config::AppConfig,
    error::InsightError,
    events,
    logging::{ErrorLine, StructuredLogger},
    service::InsightService,
    training,
};
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser)]
#[command(name = "learning-intel")]
#[command(about = "Completion-risk prediction and chapter difficulty insights", long_about = None)]
struct Cli {
    /// JSON config file (default: $LEARNING_INTEL_CONFIG or config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a labelled synthetic cohort to CSV
    Generate {
        #[arg(long, default_value = "data/student_data.csv")]
        out: PathBuf,
        #[arg(long)]
        students: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Train classifier, scaler and difficulty table from labelled events
    Train {
        #[arg(long, default_value = "data/student_data.csv")]
        data: PathBuf,
    },
    /// Print per-student feature vectors for an event batch
    Aggregate {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Predict completion and risk for every student in an event batch
    Predict {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print the precomputed chapter difficulty table
    Difficulty,
    /// Print model and readiness information
    Insights,
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(|| {
        std::env::var("LEARNING_INTEL_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.json"))
    })
}

fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Generate { out: path, students, seed } => {
            let mut synthetic = config.synthetic.clone();
            synthetic.students = students.unwrap_or(synthetic.students);
            synthetic.seed = seed.unwrap_or(synthetic.seed);
            let rows = events::generate(&synthetic);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::File::create(&path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            events::write_labelled(&rows, file)?;
            info!(rows = rows.len(), students = synthetic.students, path = %path.display(), "synthetic data written");
            StructuredLogger::emit_json(&json!({ "rows": rows.len(), "path": path }), &mut out)?;
        }
        Commands::Train { data } => {
            let rows = events::read_labelled_path(&data)?;
            let trained = training::train(&rows, &config.training)?;
            let manifest = training::persist(&trained, &config)?;
            StructuredLogger::emit_json(
                &json!({ "report": trained.report, "trained_at": manifest.trained_at }),
                &mut out,
            )?;
        }
        Commands::Aggregate { csv } => {
            let batch = events::read_events_path(&csv)?;
            for vector in learning_intel::aggregate(&batch)?.values() {
                StructuredLogger::emit_json(vector, &mut out)?;
            }
        }
        Commands::Predict { csv } => {
            let service = InsightService::load(&config);
            let batch = events::read_events_path(&csv)?;
            let predictions = service.predict(&batch)?;
            StructuredLogger::emit_json(&json!({ "predictions": predictions }), &mut out)?;
        }
        Commands::Difficulty => {
            let service = InsightService::load(&config);
            let table = service.difficulty()?;
            StructuredLogger::emit_json(&json!({ "difficulty_analysis": table }), &mut out)?;
        }
        Commands::Insights => {
            let service = InsightService::load(&config);
            StructuredLogger::emit_json(&service.insights(), &mut out)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn report_failure(e: &anyhow::Error) -> ExitCode {
    let line = match e.downcast_ref::<InsightError>() {
        Some(err) => ErrorLine::from(err),
        None => ErrorLine {
            error: format!("{:#}", e),
            code: "INTERNAL_ERROR",
            status: 500,
        },
    };
    tracing::error!(code = line.code, status = line.status, "{}", line.error);
    let _ = StructuredLogger::emit_json(&line, &mut std::io::stdout());
    if line.status < 500 {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match AppConfig::load(&config_path(&cli)) {
        Ok(c) => c,
        Err(e) => return report_failure(&e.into()),
    };

    StructuredLogger::init(config.log.json, &config.log.level);
    info!(artifacts_dir = ?config.artifacts_dir, "learning-intel starting");

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_failure(&e),
    }
}
