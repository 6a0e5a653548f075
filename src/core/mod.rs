//! Core workflows for examgen.
//!
//! # Modules
//!
//! - [`exam`] - Locating the exam folder, question bank and class list
//! - [`assembly`] - Building student workspaces and the variant ledger
//! - [`sharing`] - The minute clock that grants and revokes workspace access
//! - [`batch`] - Bulk permission mutations with per-item outcomes
//! - [`retry`] - Exponential backoff for single remote calls
//! - [`coordinator`] - The `generate`, `share` and `unshare` runs
//! - [`summary`] - Run summaries and exit codes
//!
//! # Example
//!
//! ```rust,no_run
//! use examgen::config::load_config;
//! use examgen::core::coordinator::ExamCoordinator;
//! use examgen::core::exam::StudentFilter;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("examgen.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = ExamCoordinator::new(config, shutdown_rx)?;
//! let summary = coordinator.generate("Midterm", &StudentFilter::All).await?;
//!
//! println!("Workspaces: {}", summary.succeeded);
//! println!("Failed: {}", summary.failures.len());
//! # Ok(())
//! # }
//! ```

pub mod assembly;
pub mod batch;
pub mod coordinator;
pub mod exam;
pub mod retry;
pub mod sharing;
pub mod summary;
