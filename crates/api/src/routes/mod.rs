//! HTTP route handlers.

pub mod auth;
pub mod captcha;
pub mod carousel;
pub mod contacts;
pub mod documents;
pub mod health;
pub mod projects;
pub mod send_email;
pub mod settings;
pub mod upload;
pub mod users;
