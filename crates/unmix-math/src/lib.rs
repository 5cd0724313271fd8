//! unmix math utilities.

pub mod math;

pub use math::density::*;
pub use math::summary::*;
pub use math::vect::*;
