//! Input/output helpers.
//!
//! - chart spec export (JSON) (`export`)

pub mod export;

pub use export::*;
