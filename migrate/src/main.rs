use std::path::PathBuf;

use clap::Parser;
use mui_migrate::{migrate_tree, Event, MigrationOptions, MigrationReport, Pipeline};
use tracing_subscriber::EnvFilter;

const PROGRESS_EVERY: usize = 50;

/// Replace Material UI layout components with plain HTML elements.
#[derive(Debug, Parser)]
#[command(name = "mui-migrate", version)]
struct Cli {
    /// Directory to scan for .jsx and .tsx files.
    #[arg(default_value = "src")]
    root: PathBuf,

    /// Report files that would change without writing them.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = MigrationOptions::new(cli.root).dry_run(cli.dry_run);
    let pipeline = Pipeline::mui_to_html();

    let report = migrate_tree(&options, &pipeline, |event| {
        if let Some(line) = event_line(&event) {
            println!("{line}");
        }
    })?;

    for line in summary(&report, cli.dry_run) {
        println!("{line}");
    }
    Ok(())
}

/// Progress every `PROGRESS_EVERY` modified files, and every failure.
fn event_line(event: &Event<'_>) -> Option<String> {
    match event {
        Event::Rewritten { modified, .. } if modified % PROGRESS_EVERY == 0 => {
            Some(format!("Processed {modified} files..."))
        }
        Event::Rewritten { .. } => None,
        Event::Failed { path, error } => Some(format!("Error processing {}: {error}", path.display())),
    }
}

fn summary(report: &MigrationReport, dry_run: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if dry_run {
        lines.extend(report.modified.iter().map(|p| format!("would modify {}", p.display())));
        lines.push(format!(
            "Dry run complete! {} of {} files would change.",
            report.modified.len(),
            report.scanned
        ));
    } else {
        lines.push(format!("Migration complete! Modified {} files.", report.modified.len()));
    }
    if !report.failures.is_empty() {
        lines.push(format!("{} file(s) could not be processed.", report.failures.len()));
    }
    lines
}
