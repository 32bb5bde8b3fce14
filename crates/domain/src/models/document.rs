//! Downloadable document domain model (handbooks, after-sales guides).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::project::ProjectSummary;

/// A downloadable file listed on the service pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    /// File extension or kind shown next to the link (pdf, docx, ...).
    pub file_type: String,
    /// Free-form grouping such as "handbook".
    pub category: String,
    pub order: i32,
    pub is_active: bool,
    pub project_id: Option<Uuid>,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a document. The repository assigns `order`.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub file_type: String,
    pub category: String,
    pub project_id: Option<Uuid>,
    pub is_active: bool,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct DocumentChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub file_url: Option<String>,
    pub file_type: Option<String>,
    pub category: Option<String>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
    pub project_id: Option<Option<Uuid>>,
}

impl DocumentChanges {
    pub fn apply(self, doc: &mut Document) {
        if let Some(title) = self.title {
            doc.title = title;
        }
        if let Some(description) = self.description {
            doc.description = description;
        }
        if let Some(file_url) = self.file_url {
            doc.file_url = file_url;
        }
        if let Some(file_type) = self.file_type {
            doc.file_type = file_type;
        }
        if let Some(category) = self.category {
            doc.category = category;
        }
        if let Some(order) = self.order {
            doc.order = order;
        }
        if let Some(is_active) = self.is_active {
            doc.is_active = is_active;
        }
        if let Some(project_id) = self.project_id {
            doc.project_id = project_id;
        }
    }
}

/// Request payload for creating a document.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    #[serde(default)]
    #[validate(
        custom(function = "shared::validation::validate_not_blank"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_media_url"))]
    pub file_url: String,

    #[serde(default)]
    #[validate(
        custom(function = "shared::validation::validate_not_blank"),
        length(max = 20, message = "File type must be at most 20 characters")
    )]
    pub file_type: String,

    #[serde(default)]
    #[validate(
        custom(function = "shared::validation::validate_not_blank"),
        length(max = 50, message = "Category must be at most 50 characters")
    )]
    pub category: String,

    pub project_id: Option<Uuid>,

    pub is_active: Option<bool>,
}

impl From<CreateDocumentRequest> for NewDocument {
    fn from(r: CreateDocumentRequest) -> Self {
        Self {
            title: r.title.trim().to_string(),
            description: r.description,
            file_url: r.file_url.trim().to_string(),
            file_type: r.file_type.trim().to_lowercase(),
            category: r.category.trim().to_string(),
            project_id: r.project_id,
            is_active: r.is_active.unwrap_or(true),
        }
    }
}

/// Request payload for the admin PATCH, which carries the id in the body.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentRequest {
    pub id: Option<Uuid>,

    #[validate(
        custom(function = "shared::validation::validate_not_blank"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "super::nullable")]
    pub description: Option<Option<String>>,

    #[validate(custom(function = "shared::validation::validate_media_url"))]
    pub file_url: Option<String>,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub file_type: Option<String>,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub category: Option<String>,

    #[validate(range(min = 0, message = "Order must not be negative"))]
    pub order: Option<i32>,

    pub is_active: Option<bool>,

    #[serde(default, deserialize_with = "super::nullable")]
    pub project_id: Option<Option<Uuid>>,
}

impl UpdateDocumentRequest {
    /// Splits the request into the target id and the changes to apply.
    pub fn into_parts(self) -> (Option<Uuid>, DocumentChanges) {
        let changes = DocumentChanges {
            title: self.title.map(|t| t.trim().to_string()),
            description: self.description,
            file_url: self.file_url.map(|u| u.trim().to_string()),
            file_type: self.file_type.map(|t| t.trim().to_lowercase()),
            category: self.category.map(|c| c.trim().to_string()),
            order: self.order,
            is_active: self.is_active,
            project_id: self.project_id,
        };
        (self.id, changes)
    }
}

/// Query parameters for document listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListQuery {
    pub category: Option<String>,
    pub project_id: Option<Uuid>,
}

/// Document as returned to clients, with its linked project when present.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    #[serde(flatten)]
    pub document: Document,
    pub project: Option<ProjectSummary>,
}

impl DocumentResponse {
    pub fn new(document: Document, project: Option<ProjectSummary>) -> Self {
        Self { document, project }
    }
}

/// Result of recording a download.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub file_url: String,
    /// `None` when the counter could not be updated.
    pub download_count: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_requires_fields() {
        let req: CreateDocumentRequest = serde_json::from_value(json!({ "title": "Handbook" })).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(!fields.contains_key("title"));
        assert!(fields.contains_key("file_url"));
        assert!(fields.contains_key("file_type"));
        assert!(fields.contains_key("category"));
    }

    #[test]
    fn test_create_request_normalizes() {
        let req: CreateDocumentRequest = serde_json::from_value(json!({
            "title": " Handbook ",
            "fileUrl": "https://cdn.example.com/h.pdf",
            "fileType": "PDF",
            "category": "handbook"
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let new = NewDocument::from(req);
        assert_eq!(new.title, "Handbook");
        assert_eq!(new.file_type, "pdf");
        assert!(new.is_active);
        assert!(new.project_id.is_none());
    }

    #[test]
    fn test_update_can_unlink_project() {
        let req: UpdateDocumentRequest = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "projectId": null
        }))
        .unwrap();
        let (id, changes) = req.into_parts();

        assert!(id.is_some());
        assert_eq!(changes.project_id, Some(None));
        assert!(changes.title.is_none());
    }

    #[test]
    fn test_response_embeds_project() {
        let project_id = Uuid::new_v4();
        let doc = Document {
            id: Uuid::new_v4(),
            title: "Manual".into(),
            description: None,
            file_url: "/files/m.pdf".into(),
            file_type: "pdf".into(),
            category: "handbook".into(),
            order: 1,
            is_active: true,
            project_id: Some(project_id),
            download_count: 7,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let summary = ProjectSummary {
            id: project_id,
            title: "Riverside".into(),
            image_url: "/r.jpg".into(),
        };

        let value = serde_json::to_value(DocumentResponse::new(doc, Some(summary))).unwrap();
        assert_eq!(value["downloadCount"], 7);
        assert_eq!(value["project"]["title"], "Riverside");
        assert_eq!(value["project"]["imageUrl"], "/r.jpg");
    }
}
