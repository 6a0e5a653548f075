// Examgen - Randomized exam generation and timed sharing
// Copyright (c) 2025 Examgen Contributors
// Licensed under the MIT License

//! # examgen - Randomized exams on Google Drive
//!
//! examgen builds a personal exam for every student in a class from a bank of
//! question variants kept in Google Drive, then shares each exam with its
//! student for a fixed number of minutes.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Drawing** one variant per question for each student and recording the
//!   draw in a variant ledger spreadsheet
//! - **Assembling** a workspace folder per student holding copies of the
//!   drawn variants, resumable after partial failures
//! - **Sharing** every workspace at once and revoking each when its
//!   deadline passes, with per-student time overrides from the class list
//!
//! ## Architecture
//!
//! examgen follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Workflows (exam loading, assembly, sharing clock, retry)
//! - [`adapters`] - Google Drive and Sheets clients behind store traits
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use examgen::config::load_config;
//! use examgen::core::coordinator::ExamCoordinator;
//! use examgen::core::exam::StudentFilter;
//! use examgen::domain::Minutes;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("examgen.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     let coordinator = ExamCoordinator::new(config, shutdown_rx)?;
//!
//!     coordinator.generate("Midterm", &StudentFilter::All).await?;
//!     let summary = coordinator
//!         .share("Midterm", &StudentFilter::All, Some(Minutes::new(90)))
//!         .await?;
//!
//!     println!("Shared with {} students", summary.succeeded);
//!     Ok(())
//! }
//! ```
//!
//! ## Sharing Clock
//!
//! Sharing runs on a clock of whole minutes. Each share's deadline is the
//! minute it started plus the student's effective duration; on every tick all
//! shares whose deadline has arrived are revoked in a single batch. A share is
//! revoked exactly once, whether by the clock or by an explicit stop.
//!
//! ## Error Handling
//!
//! examgen uses the [`domain::ExamGenError`] type for all errors:
//!
//! ```rust,no_run
//! use examgen::domain::ExamGenError;
//!
//! fn example() -> Result<(), ExamGenError> {
//!     let config = examgen::config::load_config("examgen.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! Problems that affect one student never stop the run; they are collected
//! in the run summary and turn into exit code 1.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
