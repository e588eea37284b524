//! Price history sources.

pub mod generator;

pub use generator::*;
