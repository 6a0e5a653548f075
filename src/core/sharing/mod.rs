//! Timed access sharing

pub mod scheduler;

pub use scheduler::{
    effective_duration, AccessScheduler, ClockOutcome, GrantOutcome, RevokeOutcome,
    SchedulerStatus, ShareTarget, TickOutcome,
};
