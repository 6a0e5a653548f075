//! Unshare command implementation

use super::{print_failures, student_filter};
use crate::cli::FolderArgs;
use crate::config::ExamGenConfig;
use crate::core::coordinator::ExamCoordinator;
use crate::core::summary::error_exit_code;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the unshare command
#[derive(Args, Debug)]
pub struct UnshareArgs {
    #[command(flatten)]
    pub target: FolderArgs,
}

impl UnshareArgs {
    /// Execute the unshare command
    pub async fn execute(
        &self,
        config: ExamGenConfig,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(folder = %self.target.folder, "Starting unshare command");

        let filter = match student_filter(&self.target) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        let coordinator = ExamCoordinator::new(config, shutdown_signal)?;

        println!("🔒 Revoking access to '{}'...", self.target.folder);
        println!();

        let summary = match coordinator.unshare(&self.target.folder, &filter).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Unshare failed");
                eprintln!("❌ Unshare failed: {e}");
                return Ok(error_exit_code(&e));
            }
        };
        summary.log_summary();

        println!("📊 Unshare Summary:");
        println!("  Students: {}", summary.students);
        println!("  Revoked: {}", summary.succeeded);
        println!("  Not shared: {}", summary.skipped);
        println!("  Failed: {}", summary.failures.len());
        println!();
        print_failures(&summary);

        if summary.is_successful() {
            println!("✅ Access revoked!");
        } else {
            println!("⚠️  Some grants could not be revoked. Re-run to retry them.");
        }

        Ok(summary.exit_code())
    }
}
