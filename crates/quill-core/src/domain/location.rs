use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Publishable;

/// Location entity - a place a post can be tagged with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Location {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            is_published: true,
            created_at: Utc::now(),
        }
    }
}

impl Publishable for Location {
    fn is_published(&self) -> bool {
        self.is_published
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
