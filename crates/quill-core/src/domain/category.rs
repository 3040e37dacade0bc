use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Publishable;

/// Category entity - a topic posts can be grouped under.
///
/// Categories are managed administratively; deleting one nulls the
/// reference on its posts instead of deleting them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// URL identifier, unique across categories.
    pub slug: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(title: String, description: String, slug: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            slug,
            is_published: true,
            created_at: Utc::now(),
        }
    }
}

impl Publishable for Category {
    fn is_published(&self) -> bool {
        self.is_published
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
