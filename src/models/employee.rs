use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: Uuid,
    #[sqlx(rename = "department_id")]
    pub department: Uuid,
    pub full_name: String,
    pub position: String,
    pub hired_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Employee {
    pub fn new(
        department: Uuid,
        full_name: impl Into<String>,
        position: impl Into<String>,
        hired_at: Option<NaiveDate>,
    ) -> Self {
        Employee {
            id: Uuid::new_v4(),
            department,
            full_name: full_name.into(),
            position: position.into(),
            hired_at,
            created_at: Utc::now(),
        }
    }
}
