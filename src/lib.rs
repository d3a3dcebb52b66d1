pub mod archive;
pub mod config;
pub mod error;
pub mod fetch;
pub mod platform;
pub mod release;
pub mod updater;

pub use error::UpdateError;
pub use updater::{download_url, UpdatePlan, UpdateReport, Updater};
