//! Application services and external integrations.

pub mod admin_bootstrap;
pub mod auth;
pub mod blob_storage;
pub mod captcha_image;
pub mod email;
pub mod notifications;

pub use auth::AuthService;
pub use blob_storage::BlobStore;
pub use email::{EmailService, Mailer};
