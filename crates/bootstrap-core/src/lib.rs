//! Bootstrap bounds on quantum energy eigenvalues.
//!
//! Positivity of the Hankel moment matrix `<x^(i+j)>` constrains the energy.
//! Each round adds one matrix order, solves `det >= 0` exactly and narrows the
//! surviving energy region.

pub mod checkpoint;
pub mod common;
pub mod domain;
pub mod engine;
pub mod numerics;
pub mod plot;
pub mod providers;
pub mod region;
pub mod solver;
