//! Carousel entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::carousel::{CarouselItem, TextDirection, TextPosition};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for carousel_text_position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "carousel_text_position", rename_all = "camelCase")]
pub enum TextPositionDb {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl From<TextPositionDb> for TextPosition {
    fn from(db: TextPositionDb) -> Self {
        match db {
            TextPositionDb::TopLeft => TextPosition::TopLeft,
            TextPositionDb::TopCenter => TextPosition::TopCenter,
            TextPositionDb::TopRight => TextPosition::TopRight,
            TextPositionDb::CenterLeft => TextPosition::CenterLeft,
            TextPositionDb::Center => TextPosition::Center,
            TextPositionDb::CenterRight => TextPosition::CenterRight,
            TextPositionDb::BottomLeft => TextPosition::BottomLeft,
            TextPositionDb::BottomCenter => TextPosition::BottomCenter,
            TextPositionDb::BottomRight => TextPosition::BottomRight,
        }
    }
}

impl From<TextPosition> for TextPositionDb {
    fn from(p: TextPosition) -> Self {
        match p {
            TextPosition::TopLeft => TextPositionDb::TopLeft,
            TextPosition::TopCenter => TextPositionDb::TopCenter,
            TextPosition::TopRight => TextPositionDb::TopRight,
            TextPosition::CenterLeft => TextPositionDb::CenterLeft,
            TextPosition::Center => TextPositionDb::Center,
            TextPosition::CenterRight => TextPositionDb::CenterRight,
            TextPosition::BottomLeft => TextPositionDb::BottomLeft,
            TextPosition::BottomCenter => TextPositionDb::BottomCenter,
            TextPosition::BottomRight => TextPositionDb::BottomRight,
        }
    }
}

/// Database enum for carousel_text_direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "carousel_text_direction", rename_all = "lowercase")]
pub enum TextDirectionDb {
    Horizontal,
    Vertical,
}

impl From<TextDirectionDb> for TextDirection {
    fn from(db: TextDirectionDb) -> Self {
        match db {
            TextDirectionDb::Horizontal => TextDirection::Horizontal,
            TextDirectionDb::Vertical => TextDirection::Vertical,
        }
    }
}

impl From<TextDirection> for TextDirectionDb {
    fn from(d: TextDirection) -> Self {
        match d {
            TextDirection::Horizontal => TextDirectionDb::Horizontal,
            TextDirection::Vertical => TextDirectionDb::Vertical,
        }
    }
}

/// Database row mapping for the carousel_items table.
#[derive(Debug, Clone, FromRow)]
pub struct CarouselEntity {
    pub id: Uuid,
    pub title: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
    pub description: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub text_position: TextPositionDb,
    pub text_direction: TextDirectionDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CarouselEntity> for CarouselItem {
    fn from(entity: CarouselEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            image_url: entity.image_url,
            link_url: entity.link_url,
            link_text: entity.link_text,
            description: entity.description,
            order: entity.sort_order,
            is_active: entity.is_active,
            text_position: entity.text_position.into(),
            text_direction: entity.text_direction.into(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
