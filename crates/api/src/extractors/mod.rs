//! Custom Axum extractors.
//!
//! Session extractors authorize requests from the Bearer token; the `App*`
//! wrappers turn body, path and query rejections into [`ApiError`] responses.
//!
//! [`ApiError`]: crate::error::ApiError

pub mod request;
pub mod session;

pub use request::{AppJson, AppPath, AppQuery};
pub use session::{AdminSession, OptionalSession, Session};
