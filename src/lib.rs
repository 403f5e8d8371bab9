pub mod api;
pub mod config;
pub mod driver;
pub mod error;
pub mod report;
pub mod scenarios;
pub mod screens;
pub mod store;

pub use error::TesterError;
