//! Gatehouse Core - Shared types library.
//!
//! This crate provides the domain vocabulary used across all Gatehouse
//! components:
//! - `server` - Visitor management HTTP service
//! - `cli` - Command-line tools for migrations and account bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database
//! access, no HTTP clients. Enabling the `postgres` feature adds sqlx
//! `Type`/`Encode`/`Decode` implementations so the newtypes can be bound
//! and read directly from TEXT/UUID columns.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, email addresses, visitor pass codes, visit
//!   statuses, staff roles, and departments

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
