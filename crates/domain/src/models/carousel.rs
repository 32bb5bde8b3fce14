//! Homepage carousel domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Where the caption sits on the slide, on a 3x3 grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextPosition {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    #[default]
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl TextPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextPosition::TopLeft => "topLeft",
            TextPosition::TopCenter => "topCenter",
            TextPosition::TopRight => "topRight",
            TextPosition::CenterLeft => "centerLeft",
            TextPosition::Center => "center",
            TextPosition::CenterRight => "centerRight",
            TextPosition::BottomLeft => "bottomLeft",
            TextPosition::BottomCenter => "bottomCenter",
            TextPosition::BottomRight => "bottomRight",
        }
    }
}

impl FromStr for TextPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "topLeft" => Ok(TextPosition::TopLeft),
            "topCenter" => Ok(TextPosition::TopCenter),
            "topRight" => Ok(TextPosition::TopRight),
            "centerLeft" => Ok(TextPosition::CenterLeft),
            "center" => Ok(TextPosition::Center),
            "centerRight" => Ok(TextPosition::CenterRight),
            "bottomLeft" => Ok(TextPosition::BottomLeft),
            "bottomCenter" => Ok(TextPosition::BottomCenter),
            "bottomRight" => Ok(TextPosition::BottomRight),
            _ => Err(format!("Invalid text position: {}", s)),
        }
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Caption writing direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Horizontal,
    Vertical,
}

impl TextDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::Horizontal => "horizontal",
            TextDirection::Vertical => "vertical",
        }
    }
}

impl FromStr for TextDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "horizontal" => Ok(TextDirection::Horizontal),
            "vertical" => Ok(TextDirection::Vertical),
            _ => Err(format!("Invalid text direction: {}", s)),
        }
    }
}

/// A slide in the homepage carousel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselItem {
    pub id: Uuid,
    pub title: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
    pub description: Option<String>,
    pub order: i32,
    pub is_active: bool,
    pub text_position: TextPosition,
    pub text_direction: TextDirection,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a slide. The repository assigns `order`.
#[derive(Debug, Clone)]
pub struct NewCarouselItem {
    pub title: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub text_position: TextPosition,
    pub text_direction: TextDirection,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct CarouselChanges {
    pub title: Option<Option<String>>,
    pub image_url: Option<String>,
    pub link_url: Option<Option<String>>,
    pub link_text: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
    pub text_position: Option<TextPosition>,
    pub text_direction: Option<TextDirection>,
}

impl CarouselChanges {
    pub fn apply(self, item: &mut CarouselItem) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(image_url) = self.image_url {
            item.image_url = image_url;
        }
        if let Some(link_url) = self.link_url {
            item.link_url = link_url;
        }
        if let Some(link_text) = self.link_text {
            item.link_text = link_text;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(order) = self.order {
            item.order = order;
        }
        if let Some(is_active) = self.is_active {
            item.is_active = is_active;
        }
        if let Some(text_position) = self.text_position {
            item.text_position = text_position;
        }
        if let Some(text_direction) = self.text_direction {
            item.text_direction = text_direction;
        }
    }
}

/// Request payload for creating a slide.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCarouselRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_media_url"))]
    pub image_url: String,

    #[validate(custom(function = "shared::validation::validate_link_url"))]
    pub link_url: Option<String>,

    #[validate(length(max = 100, message = "Link text must be at most 100 characters"))]
    pub link_text: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub text_position: Option<TextPosition>,

    pub text_direction: Option<TextDirection>,

    pub is_active: Option<bool>,
}

impl From<CreateCarouselRequest> for NewCarouselItem {
    fn from(r: CreateCarouselRequest) -> Self {
        Self {
            title: non_empty(r.title),
            image_url: r.image_url.trim().to_string(),
            link_url: non_empty(r.link_url),
            link_text: non_empty(r.link_text),
            description: non_empty(r.description),
            is_active: r.is_active.unwrap_or(true),
            text_position: r.text_position.unwrap_or_default(),
            text_direction: r.text_direction.unwrap_or_default(),
        }
    }
}

/// Request payload for updating a slide (partial update).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCarouselRequest {
    #[serde(default, deserialize_with = "super::nullable")]
    pub title: Option<Option<String>>,

    #[validate(custom(function = "shared::validation::validate_media_url"))]
    pub image_url: Option<String>,

    #[serde(default, deserialize_with = "super::nullable")]
    pub link_url: Option<Option<String>>,

    #[serde(default, deserialize_with = "super::nullable")]
    pub link_text: Option<Option<String>>,

    #[serde(default, deserialize_with = "super::nullable")]
    pub description: Option<Option<String>>,

    #[validate(range(min = 0, message = "Order must not be negative"))]
    pub order: Option<i32>,

    pub is_active: Option<bool>,

    pub text_position: Option<TextPosition>,

    pub text_direction: Option<TextDirection>,
}

impl UpdateCarouselRequest {
    /// Checks the nullable link field, which the derive cannot reach.
    pub fn validate_link(&self) -> Result<(), validator::ValidationError> {
        match &self.link_url {
            Some(Some(url)) => shared::validation::validate_link_url(url),
            _ => Ok(()),
        }
    }
}

impl From<UpdateCarouselRequest> for CarouselChanges {
    fn from(r: UpdateCarouselRequest) -> Self {
        Self {
            title: r.title.map(non_empty),
            image_url: r.image_url.map(|u| u.trim().to_string()),
            link_url: r.link_url.map(non_empty),
            link_text: r.link_text.map(non_empty),
            description: r.description.map(non_empty),
            order: r.order,
            is_active: r.is_active,
            text_position: r.text_position,
            text_direction: r.text_direction,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
