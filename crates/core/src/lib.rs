//! Mercato Core - Shared types library.
//!
//! This crate provides the common types used by the storefront binary:
//! type-safe entity IDs, validated email addresses, money helpers, and the
//! order lifecycle enums.
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, money, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
