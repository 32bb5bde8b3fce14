//! Repository implementations for database operations.

pub mod captcha;
pub mod carousel;
pub mod contact;
pub mod document;
pub mod project;
pub mod site_setting;
pub mod user;

pub use captcha::{PgCaptchaStore, PgHealthProbe};
pub use carousel::PgCarouselRepository;
pub use contact::PgContactRepository;
pub use document::PgDocumentRepository;
pub use project::PgProjectRepository;
pub use site_setting::PgSiteSettingsRepository;
pub use user::PgUserRepository;
