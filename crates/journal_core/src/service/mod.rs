//! Use-case services over the record store.
//!
//! # Responsibility
//! - Derive read models for browsing pages and the admin dashboard.
//! - Orchestrate admin create/edit flows into store mutations.
//! - Keep callers decoupled from storage details.

pub mod catalog_service;
pub mod editorial_service;
