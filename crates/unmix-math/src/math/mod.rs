//! Core math modules.

pub mod density;
pub mod summary;
pub mod vect;
