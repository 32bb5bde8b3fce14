//! Project showcase domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::document::DocumentResponse;

/// Showcase category. Each category has its own display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectCategory {
    /// Newly launched projects.
    New,
    /// Completed landmark projects.
    Classic,
    /// Planned projects.
    Future,
}

impl ProjectCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectCategory::New => "new",
            ProjectCategory::Classic => "classic",
            ProjectCategory::Future => "future",
        }
    }
}

impl FromStr for ProjectCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(ProjectCategory::New),
            "classic" => Ok(ProjectCategory::Classic),
            "future" => Ok(ProjectCategory::Future),
            _ => Err(format!("Invalid project category: {}", s)),
        }
    }
}

impl fmt::Display for ProjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One label/value row on the project detail page (location, site area, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DetailItem {
    #[validate(length(min = 1, max = 100, message = "Label must be 1-100 characters"))]
    pub label: String,
    #[validate(length(max = 500, message = "Value must be at most 500 characters"))]
    pub value: String,
}

/// Structured project details, stored as a JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    #[serde(default)]
    pub items: Vec<DetailItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_images: Vec<String>,
}

impl ProjectDetails {
    fn validate_items(&self) -> Result<(), validator::ValidationError> {
        if self.items.iter().any(|item| item.validate().is_err()) {
            let mut err = validator::ValidationError::new("detail_item");
            err.message = Some("Detail items need a label (max 100) and a value (max 500)".into());
            return Err(err);
        }
        for url in &self.additional_images {
            shared::validation::validate_media_url(url)?;
        }
        Ok(())
    }
}

fn validate_details(details: &ProjectDetails) -> Result<(), validator::ValidationError> {
    details.validate_items()
}

/// A project shown on the public showcase pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: ProjectCategory,
    pub image_url: String,
    pub details: ProjectDetails,
    pub order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Title and cover image of a project, embedded in document listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: Uuid,
    pub title: String,
    pub image_url: String,
}

impl From<&Project> for ProjectSummary {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id,
            title: p.title.clone(),
            image_url: p.image_url.clone(),
        }
    }
}

/// Input for inserting a project. The repository assigns `order`.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: Option<String>,
    pub category: ProjectCategory,
    pub image_url: String,
    pub details: ProjectDetails,
    pub is_active: bool,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<ProjectCategory>,
    pub image_url: Option<String>,
    pub details: Option<ProjectDetails>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
}

impl ProjectChanges {
    /// Applies the changes to an in-memory copy.
    pub fn apply(self, project: &mut Project) {
        if let Some(title) = self.title {
            project.title = title;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(category) = self.category {
            project.category = category;
        }
        if let Some(image_url) = self.image_url {
            project.image_url = image_url;
        }
        if let Some(details) = self.details {
            project.details = details;
        }
        if let Some(order) = self.order {
            project.order = order;
        }
        if let Some(is_active) = self.is_active {
            project.is_active = is_active;
        }
    }
}

/// Request payload for creating a project.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[serde(default)]
    #[validate(
        custom(function = "shared::validation::validate_not_blank"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[validate(required(message = "Category is required"))]
    pub category: Option<ProjectCategory>,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_media_url"))]
    pub image_url: String,

    #[validate(custom(function = "validate_details"))]
    pub details: Option<ProjectDetails>,

    pub is_active: Option<bool>,
}

impl CreateProjectRequest {
    /// Converts a validated request. Returns `None` when the category is missing.
    pub fn into_new_project(self) -> Option<NewProject> {
        let category = self.category?;
        Some(NewProject {
            title: self.title.trim().to_string(),
            description: self.description,
            category,
            image_url: self.image_url.trim().to_string(),
            details: self.details.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

/// Request payload for updating a project (partial update).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[validate(
        custom(function = "shared::validation::validate_not_blank"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "super::nullable")]
    pub description: Option<Option<String>>,

    pub category: Option<ProjectCategory>,

    #[validate(custom(function = "shared::validation::validate_media_url"))]
    pub image_url: Option<String>,

    #[validate(custom(function = "validate_details"))]
    pub details: Option<ProjectDetails>,

    #[validate(range(min = 0, message = "Order must not be negative"))]
    pub order: Option<i32>,

    pub is_active: Option<bool>,
}

impl From<UpdateProjectRequest> for ProjectChanges {
    fn from(r: UpdateProjectRequest) -> Self {
        Self {
            title: r.title.map(|t| t.trim().to_string()),
            description: r.description,
            category: r.category,
            image_url: r.image_url.map(|u| u.trim().to_string()),
            details: r.details,
            order: r.order,
            is_active: r.is_active,
        }
    }
}

/// Query parameters for project listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectListQuery {
    pub category: Option<ProjectCategory>,
}

/// Project with its documents, returned by the detail and admin endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    #[serde(flatten)]
    pub project: Project,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<DocumentResponse>>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            project,
            documents: None,
        }
    }
}

impl ProjectResponse {
    pub fn with_documents(project: Project, documents: Vec<DocumentResponse>) -> Self {
        Self {
            project,
            documents: Some(documents),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Project {
        Project {
            id: Uuid::new_v4(),
            title: "Riverside".into(),
            description: None,
            category: ProjectCategory::Classic,
            image_url: "/images/riverside.jpg".into(),
            details: ProjectDetails::default(),
            order: 3,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_category_roundtrip() {
        for c in [ProjectCategory::New, ProjectCategory::Classic, ProjectCategory::Future] {
            assert_eq!(c.as_str().parse::<ProjectCategory>().unwrap(), c);
        }
        assert!("old".parse::<ProjectCategory>().is_err());
    }

    #[test]
    fn test_create_request_valid() {
        let req: CreateProjectRequest = serde_json::from_value(json!({
            "title": "Demo",
            "category": "new",
            "imageUrl": "https://x/y.jpg"
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let new = req.into_new_project().unwrap();
        assert!(new.is_active);
        assert!(new.details.items.is_empty());
        assert_eq!(new.category, ProjectCategory::New);
    }

    #[test]
    fn test_create_request_missing_fields_reported_per_field() {
        let req: CreateProjectRequest = serde_json::from_value(json!({})).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("category"));
        assert!(fields.contains_key("image_url"));
    }

    #[test]
    fn test_create_request_rejects_bad_detail_item() {
        let req: CreateProjectRequest = serde_json::from_value(json!({
            "title": "Demo",
            "category": "future",
            "imageUrl": "/a.jpg",
            "details": { "items": [{ "label": "", "value": "x" }] }
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_details_serialization_is_camel_case() {
        let details = ProjectDetails {
            items: vec![DetailItem {
                label: "Site area".into(),
                value: "1,200 m²".into(),
            }],
            features: vec![],
            description: None,
            additional_images: vec!["/a.jpg".into()],
        };
        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value["additionalImages"][0], "/a.jpg");
        assert!(value.get("features").is_none());
    }

    #[test]
    fn test_changes_apply_partial() {
        let mut project = sample();
        let update: UpdateProjectRequest =
            serde_json::from_value(json!({ "title": "Renamed", "description": null })).unwrap();

        ProjectChanges::from(update).apply(&mut project);

        assert_eq!(project.title, "Renamed");
        assert_eq!(project.description, None);
        assert_eq!(project.order, 3);
        assert_eq!(project.category, ProjectCategory::Classic);
    }

    #[test]
    fn test_response_flattens_project() {
        let value = serde_json::to_value(ProjectResponse::from(sample())).unwrap();
        assert_eq!(value["title"], "Riverside");
        assert_eq!(value["isActive"], true);
        assert_eq!(value["order"], 3);
        assert!(value.get("documents").is_none());
    }
}
