//! Google Drive and Sheets REST clients

pub mod drive;
pub mod http;
pub mod models;
pub mod sheets;

pub use drive::DriveClient;
pub use sheets::SheetsClient;
