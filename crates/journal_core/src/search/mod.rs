//! Substring search over in-memory records.
//!
//! # Responsibility
//! - Define the case-insensitive match rule shared by every search surface.
//! - Shape paper search queries (volume scope, result cap).

pub mod substring;
