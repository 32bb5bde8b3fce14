//! Shared utilities for the Banglong site backend.
//!
//! This crate provides functionality used across all other crates:
//! - Session tokens (HS256 JWT)
//! - Password hashing with Argon2id
//! - Hashing and random token helpers
//! - Validation helpers for request DTOs
//! - Offset pagination

pub mod crypto;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod validation;
