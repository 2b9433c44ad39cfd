//! Part-number cross-reference lookup for wiper blades and brake pads.
//!
//! Rows come from a spreadsheet of "main part → alternates", are classified
//! and normalized into equivalence facts on every request, and searched for
//! the family a queried part belongs to.

pub mod classify;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod search;
pub mod server;
pub mod service;
pub mod sheets;
pub mod types;

pub use error::{Result, XrefError};
pub use service::LookupService;
