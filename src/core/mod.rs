//! Core layer - framework-agnostic storage operations.
//!
//! Nothing in here knows about HTTP; the API layer calls these functions and
//! maps their errors to responses.

/// Product persistence: reads, saves, soft deletes and seeding
pub mod product;
