//! Two-body Keplerian motion.

pub mod orbits;
