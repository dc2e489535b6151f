use std::{collections::HashMap, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use marks_client::{AutosaveEvent, EditOutcome, EvaluationView, HttpMarksClient, SaveStatus};
use shared::domain::{CourseId, StudentId, SubjectCode};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::warn;

mod config;
mod render;

use config::load_settings;

/// Enter marks for one course subject. Each stdin line `<enrollmentNo|studentId> <value>`
/// is one edit; a bare student clears the field; `wait <ms>` pauses between edits.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    course_id: String,
    #[arg(long)]
    subject_code: String,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long, default_value = "evaluator.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(&args.config);
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();

    let client = Arc::new(HttpMarksClient::new(settings.server_url()?));
    let view = EvaluationView::load(
        client.as_ref(),
        client.clone(),
        &CourseId::new(args.course_id),
        &SubjectCode::new(args.subject_code),
        settings.autosave(),
    )
    .await
    .map_err(|err| {
        let message = err.user_message();
        anyhow::Error::new(err).context(message)
    })?;

    println!("{}\n", render::header(&view));
    println!("{}\n", render::grid(&view).await);

    let names: HashMap<StudentId, String> = view
        .roster()
        .iter()
        .map(|entry| (entry.student_id.clone(), entry.enrollment_no.clone()))
        .collect();
    let controller = Arc::clone(view.controller());
    let printer = tokio::spawn(print_events(names, BroadcastStream::new(controller.subscribe_events())));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (who, raw) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(who, raw)| (who, raw.trim()));

        if who == "wait" {
            match raw.parse::<u64>() {
                Ok(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
                Err(_) => warn!(line, "evaluator: wait needs milliseconds"),
            }
            continue;
        }

        let Some(entry) = view.find_student(who) else {
            warn!(student = who, "evaluator: unknown student");
            continue;
        };
        match controller.handle_input(&entry.student_id, raw).await {
            Ok(EditOutcome::Applied(_)) => {}
            Ok(EditOutcome::Rejected) => println!(
                "{:<14} '{}' ignored: marks must be between 0 and {}",
                entry.enrollment_no,
                raw,
                view.scale().max()
            ),
            Err(err) => warn!(error = %err, "evaluator: edit failed"),
        }
    }

    controller.wait_settled().await;
    printer.abort();
    println!("\n{}", render::grid(&view).await);
    Ok(())
}

async fn print_events(
    names: HashMap<StudentId, String>,
    mut events: BroadcastStream<AutosaveEvent>,
) {
    let name = |id: &StudentId| names.get(id).cloned().unwrap_or_else(|| id.to_string());
    while let Some(event) = events.next().await {
        match event {
            Ok(AutosaveEvent::StatusChanged { student_id, status }) => match status {
                SaveStatus::Saving => println!("{:<14} Saving...", name(&student_id)),
                SaveStatus::Saved => println!("{:<14} Saved", name(&student_id)),
                SaveStatus::Idle | SaveStatus::Error => {}
            },
            Ok(AutosaveEvent::PersistFailed {
                student_id,
                message,
            }) => println!("{:<14} Error saving: {message}", name(&student_id)),
            Ok(AutosaveEvent::ValueChanged { .. } | AutosaveEvent::Persisted { .. }) => {}
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "evaluator: event stream lagged")
            }
        }
    }
}
