//! Domain services for the Banglong site.
//!
//! Services contain business logic that operates on domain models.

pub mod captcha;
pub mod mail_template;
pub mod ordering;

pub use captcha::{CaptchaError, CaptchaService, IssuedCaptcha};
pub use mail_template::{escape_html, parse_receivers, render_template, reply_html, TemplateVars};
