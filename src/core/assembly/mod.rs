//! Workspace assembly and the variant ledger

pub mod assembler;
pub mod ledger;

pub use assembler::{AssemblyOutcome, ExamAssembler};
pub use ledger::{ledger_title, VariantLedger};
