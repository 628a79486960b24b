// Pet Adventure Schema - Shared type definitions
// This crate contains the static data types that are shared between the
// engine and the RON data files it loads at startup: elemental attributes,
// species definitions and shop items.

pub use attributes::*;
pub use shop_data::*;
pub use species_data::*;

pub mod attributes;
pub mod shop_data;
pub mod species_data;
