//! Input/output helpers.
//!
//! - series CSV export + reload (`series`)
//! - prediction responses as JSON (`response`)

pub mod response;
pub mod series;

pub use response::*;
pub use series::*;
