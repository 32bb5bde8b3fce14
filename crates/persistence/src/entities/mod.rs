//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod carousel;
pub mod contact;
pub mod document;
pub mod project;
pub mod site_setting;
pub mod user;

pub use carousel::{CarouselEntity, TextDirectionDb, TextPositionDb};
pub use contact::{ContactEntity, ContactPageRow, ContactStatusDb};
pub use document::DocumentEntity;
pub use project::{ProjectCategoryDb, ProjectEntity};
pub use site_setting::{CaptchaEntity, SiteSettingEntity};
pub use user::{UserEntity, UserRoleDb};
