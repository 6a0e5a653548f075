//! Store abstraction traits and shared types

#[cfg(test)]
pub mod memory;
pub mod traits;

pub use traits::{
    apply_mutation, escape_query_literal, DocumentStore, DriveItem, DriveQuery, LedgerSink,
    Mutation, MutationOutput, Permission, RosterSource, FOLDER_MIME_TYPE, SPREADSHEET_MIME_TYPE,
};
