//! solarbudget-sources
//!
//! Production HTTP clients implementing the typed source traits:
//! [`SolcastSource`] for the rooftop production forecast and
//! [`PseSource`] for the day-ahead energy price report. Both accept an
//! overridable base URL so tests can run against a local mock server.
#![warn(missing_docs)]

/// PSE day-ahead price client.
pub mod pse;
/// Solcast rooftop forecast client.
pub mod solcast;

pub use pse::PseSource;
pub use solcast::{ApiKey, SolcastSource};
