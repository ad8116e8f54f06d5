//! Common types used across cva-* crates

pub mod common;

pub use common::{Assembly, Program, ReportEventType};
