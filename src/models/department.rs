use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    #[sqlx(rename = "parent_id")]
    pub parent: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Department {
    pub fn new(name: impl Into<String>, parent: Option<Uuid>) -> Self {
        Department {
            id: Uuid::new_v4(),
            name: name.into(),
            parent,
            created_at: Utc::now(),
        }
    }
}

/// Listing filter for `GET /departments`.
#[derive(Debug, Default, Clone)]
pub struct DepartmentFilter {
    pub name: Option<String>,
    pub parent: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
