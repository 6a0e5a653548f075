//! Share command implementation
//!
//! Grants every selected student access to their workspace, then keeps the
//! minute clock running until each timed share has been revoked.

use super::{print_failures, student_filter};
use crate::cli::FolderArgs;
use crate::config::ExamGenConfig;
use crate::core::coordinator::ExamCoordinator;
use crate::core::summary::error_exit_code;
use crate::domain::Minutes;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the share command
#[derive(Args, Debug)]
pub struct ShareArgs {
    #[command(flatten)]
    pub target: FolderArgs,

    /// Exam length in minutes; omit to share until `unshare`
    #[arg(short, long)]
    pub minutes: Option<u32>,
}

impl ShareArgs {
    /// Execute the share command
    pub async fn execute(
        &self,
        config: ExamGenConfig,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(folder = %self.target.folder, minutes = ?self.minutes, "Starting share command");

        let filter = match student_filter(&self.target) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        let coordinator = ExamCoordinator::new(config, shutdown_signal)?;

        match self.minutes {
            Some(m) => println!("🔓 Sharing '{}' for {m} minutes...", self.target.folder),
            None => println!("🔓 Sharing '{}' until unshared...", self.target.folder),
        }
        println!();

        let summary = match coordinator
            .share(&self.target.folder, &filter, self.minutes.map(Minutes::new))
            .await
        {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Share failed");
                eprintln!("❌ Share failed: {e}");
                return Ok(error_exit_code(&e));
            }
        };
        summary.log_summary();

        println!("📊 Share Summary:");
        println!("  Students: {}", summary.students);
        println!("  Shared: {}", summary.succeeded);
        println!("  Already shared: {}", summary.skipped);
        println!("  Failed: {}", summary.failures.len());
        println!("  Still shared: {}", summary.still_shared);
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();
        print_failures(&summary);

        if summary.interrupted {
            println!("⚠️  Clock stopped early; {} workspace(s) remain shared.", summary.still_shared);
            println!("   Run `examgen unshare {}` to revoke them.", self.target.folder);
        } else if summary.is_successful() {
            println!("✅ Sharing completed!");
        } else {
            println!("⚠️  Sharing completed with failures");
        }

        Ok(summary.exit_code())
    }
}
