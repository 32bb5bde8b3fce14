//! Display-order requests shared by projects and carousel slides.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::project::ProjectCategory;

/// Direction of a pairwise move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    /// Towards lower `order` values.
    Up,
    /// Towards higher `order` values.
    Down,
}

/// Result of a pairwise swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Orders exchanged with the neighbour `with`.
    Swapped { with: Uuid },
    /// No neighbour in that direction; nothing changed.
    Boundary,
    /// The item itself does not exist.
    NotFound,
}

/// One entry of a reindex list.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReorderItem {
    pub id: Uuid,
}

/// Full reindex: the submitted sequence becomes orders `1..=N`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReindexRequest {
    #[serde(default)]
    pub items: Vec<ReorderItem>,
    /// Projects only: every id must belong to this category.
    pub category: Option<ProjectCategory>,
}

impl ReindexRequest {
    pub fn ids(&self) -> Vec<Uuid> {
        self.items.iter().map(|i| i.id).collect()
    }
}

/// Pairwise move of a carousel slide.
#[derive(Debug, Clone, Deserialize)]
pub struct SwapRequest {
    pub id: Uuid,
    pub direction: MoveDirection,
}

/// Pairwise move of a project addressed by path.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveRequest {
    pub direction: MoveDirection,
}
