pub mod auth;
pub mod client;
pub mod sync;

pub use client::{SheetsClient, Worksheet};
pub use sync::{PushMode, PushOutcome, SheetSync};
