//! Core pipeline orchestration and domain logic for Pressroom.
//!
//! This crate ties together document extraction, markdown normalization,
//! section classification, image placement, and HTML rendering into the
//! end-to-end article generation workflow.

pub mod compose;
pub mod pipeline;
pub mod placement;
pub mod sections;
