//! Data models for CVA API responses
//!
//! Domain entities (cases, variants, report events) are exchanged as opaque
//! JSON. This crate only models what the transport itself needs to understand:
//! the response envelope, the pagination cursor, and the variant identifiers
//! used by lift overs.

pub mod cursor;
pub mod envelope;
pub mod results;
pub mod variant;

pub use cursor::Cursor;
pub use envelope::{ResponseBlock, ResponseEnvelope};
pub use results::{results_to_list, results_to_map};
pub use variant::{VariantCoordinates, VariantsCoordinates};
