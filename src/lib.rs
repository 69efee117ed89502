pub mod changelog;
pub mod config;
pub mod conventional;
pub mod error;
pub mod git;
pub mod report;
pub mod schema;
pub mod tag;
pub mod ui;

pub use error::{PrereleaseError, Result};
