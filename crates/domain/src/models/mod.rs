//! Domain models for the Banglong site.

pub mod captcha;
pub mod carousel;
pub mod contact;
pub mod document;
pub mod mail;
pub mod ordering;
pub mod project;
pub mod site_setting;
pub mod user;

pub use captcha::CaptchaChallenge;
pub use carousel::CarouselItem;
pub use contact::ContactSubmission;
pub use document::Document;
pub use project::Project;
pub use site_setting::SiteSetting;
pub use user::User;

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field from an explicit `null` in partial updates.
///
/// Use with `#[serde(default, deserialize_with = "nullable")]` on an
/// `Option<Option<T>>` field: absent → `None`, `null` → `Some(None)`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
