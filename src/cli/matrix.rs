//! Matrix command - run every environment.

use std::path::Path;

use crate::cli::{output, project};
use crate::core::matrix::{DescriptorOutcome, MatrixRunner, Outcome};
use crate::error::{Error, Result, Stage};

/// Print one descriptor's outcome.
pub(crate) fn print_outcome(outcome: &DescriptorOutcome) {
    let seconds = outcome.duration_ms as f64 / 1000.0;
    match &outcome.outcome {
        Outcome::Passed => {
            output::success(&format!("{} passed ({:.1}s)", outcome.descriptor, seconds));
        }
        Outcome::Failed { stage, error } => {
            let stage = stage.as_ref().map(Stage::as_str).unwrap_or("setup");
            output::error(&format!(
                "{} failed at {} ({:.1}s)",
                outcome.descriptor, stage, seconds
            ));
            output::dimmed(&format!("  {}", error));
            if !outcome.transcript.is_empty() {
                for line in outcome.transcript.lines() {
                    output::dimmed(&format!("  │ {}", line));
                }
            }
        }
    }
}

/// Run the whole matrix.
pub fn execute(json: bool, config: Option<&Path>) -> Result<()> {
    let project = project::load(config)?;
    let report = MatrixRunner::new(&project.config, &project.root).run_matrix();

    if json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|e| Error::Other(format!("failed to render report: {}", e)))?;
        println!("{}", rendered);
    } else {
        output::section("Matrix");
        for outcome in &report.outcomes {
            print_outcome(outcome);
        }
    }

    let failed = report.failures().count();
    if failed > 0 {
        return Err(Error::Other(format!(
            "{} of {} environments failed",
            failed,
            report.outcomes.len()
        )));
    }
    if !json {
        println!();
        output::success(&format!("all {} environments passed", report.outcomes.len()));
    }
    Ok(())
}
