//! `truthgrid-model` — Deterministic truth-model evaluation engine.
//!
//! Pure engine crate: receives a declarative schema (units, constants,
//! calculations, instances, claims, questions), returns resolved SI values
//! and pass/fail answers. No CLI or file I/O dependencies.

pub mod canonical;
pub mod engine;
pub mod error;
pub mod graph;
pub mod schema;
pub mod snapshot;
pub mod units;

pub use engine::{ClaimOutcome, TruthModel};
pub use error::ModelError;
pub use schema::ModelSchema;
pub use snapshot::Snapshot;
pub use units::UnitRegistry;
