//! # Resin Sim
//!
//! Randomised inputs and the investment optimizer for the resin planner.
//!
//! This crate provides:
//! - A seedable RNG wrapper
//! - Random equipment generation
//! - Domain material drops
//! - Spending policies
//! - The greedy resin optimizer and track comparison

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod comparison;
pub mod drops;
pub mod generator;
pub mod optimizer;
pub mod policy;
pub mod rng;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::comparison::*;
    pub use crate::drops::*;
    pub use crate::generator::*;
    pub use crate::optimizer::*;
    pub use crate::policy::*;
    pub use crate::rng::*;
}

pub use prelude::*;
