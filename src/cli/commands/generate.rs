//! Generate command implementation
//!
//! Draws one variant per question for each selected student, records the
//! draw in a new ledger spreadsheet and builds the student workspaces.

use super::{print_failures, student_filter};
use crate::cli::FolderArgs;
use crate::config::ExamGenConfig;
use crate::core::coordinator::ExamCoordinator;
use crate::core::summary::error_exit_code;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the generate command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub target: FolderArgs,
}

impl GenerateArgs {
    /// Execute the generate command
    pub async fn execute(
        &self,
        config: ExamGenConfig,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(folder = %self.target.folder, "Starting generate command");

        let filter = match student_filter(&self.target) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        let coordinator = ExamCoordinator::new(config, shutdown_signal)?;

        println!("🎲 Generating exams for '{}'...", self.target.folder);
        println!();

        let summary = match coordinator.generate(&self.target.folder, &filter).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Generate failed");
                eprintln!("❌ Generate failed: {e}");
                return Ok(error_exit_code(&e));
            }
        };
        summary.log_summary();

        println!("📊 Generate Summary:");
        println!("  Students: {}", summary.students);
        println!("  Workspaces built: {}", summary.succeeded);
        println!("  Already complete: {}", summary.skipped);
        println!("  Failed: {}", summary.failures.len());
        if let Some(url) = &summary.ledger_url {
            println!("  Variant ledger: {url}");
        }
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();
        print_failures(&summary);

        if summary.interrupted {
            println!("⚠️  Interrupted before workspaces were built. Re-run to build them.");
        } else if summary.is_successful() {
            println!("✅ Exams generated successfully!");
        } else {
            println!("⚠️  Generate completed with failures. Re-run to retry them.");
        }

        Ok(summary.exit_code())
    }
}
