//! Loading the question bank and the class roster

pub mod filter;
pub mod locator;
pub mod roster;

pub use filter::StudentFilter;
pub use locator::ExamLocator;
pub use roster::{load_roster, parse_roster};
