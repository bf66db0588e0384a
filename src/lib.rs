pub mod coerce;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod outcome;
pub mod sheets;
pub mod snapshot;
pub mod store;
pub mod types;
