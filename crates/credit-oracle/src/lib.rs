//! Explainable causal credit-risk scoring.
//!
//! The [`scoring`] module holds the pipeline (feature encoding, causal probability, score
//! transform, attribution, counterfactuals, trajectory, classification, adverse-action reasons,
//! and narrative composition). The remaining modules carry the service plumbing shared with the
//! HTTP binary.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
