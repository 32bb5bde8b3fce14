//! Typed list filters, one per listing endpoint.

use chrono::{DateTime, Utc};
use shared::pagination::PageWindow;
use uuid::Uuid;

use crate::models::contact::{ContactListQuery, ContactStatus, ContactSubmission};
use crate::models::document::{Document, DocumentListQuery};
use crate::models::project::{Project, ProjectCategory};

/// Project listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub category: Option<ProjectCategory>,
    pub active_only: bool,
}

impl ProjectFilter {
    /// Public listing: active projects only.
    pub fn public(category: Option<ProjectCategory>) -> Self {
        Self {
            category,
            active_only: true,
        }
    }

    /// Admin listing: everything.
    pub fn admin(category: Option<ProjectCategory>) -> Self {
        Self {
            category,
            active_only: false,
        }
    }

    pub fn matches(&self, p: &Project) -> bool {
        (!self.active_only || p.is_active) && self.category.map_or(true, |c| p.category == c)
    }
}

/// Document listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    pub category: Option<String>,
    pub project_id: Option<Uuid>,
    pub active_only: bool,
}

impl DocumentFilter {
    pub fn public(query: DocumentListQuery) -> Self {
        Self {
            category: query.category.filter(|c| !c.trim().is_empty()),
            project_id: query.project_id,
            active_only: true,
        }
    }

    pub fn admin(query: DocumentListQuery) -> Self {
        Self {
            active_only: false,
            ..Self::public(query)
        }
    }

    /// Documents attached to one project.
    pub fn for_project(project_id: Uuid, active_only: bool) -> Self {
        Self {
            category: None,
            project_id: Some(project_id),
            active_only,
        }
    }

    pub fn matches(&self, d: &Document) -> bool {
        (!self.active_only || d.is_active)
            && self.category.as_deref().map_or(true, |c| d.category == c)
            && self.project_id.map_or(true, |p| d.project_id == Some(p))
    }
}

/// Contact submission listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFilter {
    pub status: Option<ContactStatus>,
    /// Inclusive lower bound on `created_at`.
    pub created_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `created_at`.
    pub created_to: Option<DateTime<Utc>>,
    /// Case-insensitive substring over name, email, phone and message.
    pub search: Option<String>,
    pub window: PageWindow,
}

impl From<ContactListQuery> for ContactFilter {
    fn from(q: ContactListQuery) -> Self {
        Self {
            status: q.status,
            created_from: q.from,
            created_to: q.to,
            search: q
                .q
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            window: PageWindow::resolve(q.limit, q.offset),
        }
    }
}

impl ContactFilter {
    /// Ignores the page window; callers page the matching set.
    pub fn matches(&self, c: &ContactSubmission) -> bool {
        if self.status.map_or(false, |s| c.status != s) {
            return false;
        }
        if self.created_from.map_or(false, |from| c.created_at < from) {
            return false;
        }
        if self.created_to.map_or(false, |to| c.created_at >= to) {
            return false;
        }
        match &self.search {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                [&c.name, &c.email, &c.phone, &c.message]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }

    /// `ILIKE` pattern for the search term with `%`, `_` and `\` escaped.
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|s| {
            let escaped = s
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{}%", escaped)
        })
    }
}
