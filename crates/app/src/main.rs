mod cli;
mod db;
mod output;

use anyhow::Context;
use clap::Parser;
use services::{AppServices, AuthContext, CatalogSource, Clock};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::output::Output;

async fn run(cli: Cli) -> anyhow::Result<()> {
    let db_url = db::normalize_sqlite_url(&cli.db)?;
    // Open + migrate SQLite at startup; core and services stay storage-agnostic.
    db::prepare_sqlite_file(&db_url)?;

    let catalog = match cli.catalog.as_deref() {
        Some(path) => CatalogSource::File(path),
        None => CatalogSource::Builtin,
    };
    let app = AppServices::new_sqlite(&db_url, Clock::system(), catalog)
        .await
        .with_context(|| format!("failed to open {db_url}"))?;
    let service = app.enrollment_service();
    let auth = AuthContext::from(cli.user);
    let out = Output::new(cli.json);

    match cli.command {
        Command::Programs => {
            let catalog = app.catalog();
            out.programs(catalog.list_programs())?;
        }
        Command::Lesson { program, week, day } => {
            let catalog = app.catalog();
            let lesson = catalog.lesson(&program, week, day)?;
            out.lesson(&program, week, lesson)?;
        }
        Command::Enroll { program } => {
            let enrollment = service.create_enrollment(auth, &program).await?;
            out.enrolled(&enrollment)?;
        }
        Command::Complete {
            program,
            week,
            day,
            ignore_lock,
        } => {
            let enrollment = service
                .get_enrollment(auth, &program)
                .await?
                .with_context(|| format!("not enrolled in {program}; run `enroll` first"))?;
            let updated = if ignore_lock {
                service
                    .record_day_completion(auth, enrollment.id(), week, day)
                    .await?
            } else {
                service
                    .complete_unlocked_day(auth, enrollment.id(), week, day)
                    .await?
            };
            let snapshot = service
                .progress(auth, &program)
                .await?
                .with_context(|| format!("enrollment in {program} disappeared"))?;
            out.completed(&updated, week, day, &snapshot)?;
        }
        Command::Status { program: Some(program) } => {
            let snapshot = service
                .progress(auth, &program)
                .await?
                .with_context(|| format!("not enrolled in {program}"))?;
            out.snapshot(&snapshot)?;
        }
        Command::Status { program: None } => {
            let snapshots = service.dashboard(auth).await?;
            out.dashboard(&snapshots)?;
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("error: {err:#}");
        std::process::exit(2);
    }
}
