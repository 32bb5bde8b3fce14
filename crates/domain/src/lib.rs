//! Domain layer for the Banglong site backend.
//!
//! This crate contains:
//! - Domain models and request/response payloads (projects, documents,
//!   carousel, contacts, users, site settings, captcha)
//! - Repository traits and list filters implemented by `persistence`
//! - Business logic services (captcha, ordering, mail templates)

pub mod models;
pub mod repositories;
pub mod services;
