//! Data models for the intake pipeline.
//!
//! Field names follow the camelCase attribute names stored in the record stores.

mod envelope;
mod payload;
mod record;

pub use envelope::*;
pub use payload::*;
pub use record::*;
