//! Top-level module for the hierarchical segmentation system.
//!
//! This crate provides an entropy-driven sequence segmenter, including:
//! - Directed transition graphs with entropy snapshots (`TransitionGraph`)
//! - Per-tier graph building and boundary segmentation (`Level`)
//! - Tier stacking and next-symbol prediction (`Hierarchy`)
//! - Run configuration (`SegmentationInput`)
//! - A high-level build-and-evaluate interface (`Segmenter`)

/// Directed transition graph over symbols.
///
/// Tracks outgoing and incoming transition counts as two consistent views,
/// derives per-node Shannon entropies, and captures the point-in-time
/// entropy snapshots that drive all boundary decisions.
pub mod graph;

/// Ordered stack of levels, finest alphabet first.
///
/// Owns the built tiers and answers next-symbol prediction queries by
/// combining continuation and transition evidence from the tier directly
/// above the base.
pub mod hierarchy;

/// One abstraction tier of the hierarchy.
///
/// Builds a transition graph over one symbol sequence, then partitions the
/// sequence into segments wherever the entropy boundary predicate holds.
pub mod level;

/// Run configuration structure.
///
/// Stores the maximum hierarchy depth, the held-out evaluation cap, and the
/// corpus loading mode, with validated setters.
pub mod segmentation_input;

/// High-level interface for building hierarchies and evaluating prediction.
///
/// Exposes the tier-stacking build loop, the held-out prediction walk, and
/// cache-aware corpus loading.
pub mod segmenter;
