pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::models::department::{Department, DepartmentFilter};
use crate::models::employee::Employee;

pub use memory::MemoryTreeStore;
pub use postgres::PgTreeStore;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("unit of work already closed")]
    TransactionClosed,

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return StoreError::UniqueViolation(db_err.message().to_string()),
                Some(FOREIGN_KEY_VIOLATION) => return StoreError::ForeignKeyViolation(db_err.message().to_string()),
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

/// Entry point to persistence. Every read and write happens inside a unit of
/// work obtained from [`TreeStore::begin`].
#[async_trait]
pub trait TreeStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn TreeTx>, StoreError>;
}

/// A unit of work over the department and employee tables.
///
/// Changes become visible to other units of work only after [`TreeTx::commit`];
/// dropping the value without committing rolls every change back.
#[async_trait]
pub trait TreeTx: Send {
    async fn get_department(&mut self, id: Uuid) -> Result<Option<Department>, StoreError>;

    /// Like `get_department`, but the row stays locked until the unit of work ends.
    async fn lock_department(&mut self, id: Uuid) -> Result<Option<Department>, StoreError>;

    async fn list_departments(&mut self, filter: &DepartmentFilter) -> Result<Vec<Department>, StoreError>;

    async fn children_of(&mut self, id: Uuid) -> Result<Vec<Department>, StoreError>;

    /// Whether a department other than `excluding` already uses `(name, parent)`.
    async fn department_exists_with(
        &mut self,
        name: &str,
        parent: Option<Uuid>,
        excluding: Option<Uuid>,
    ) -> Result<bool, StoreError>;

    async fn insert_department(&mut self, department: &Department) -> Result<(), StoreError>;

    async fn update_department(&mut self, department: &Department) -> Result<(), StoreError>;

    /// Removes the department. Child departments go with it; attached
    /// employees make it fail with [`StoreError::ForeignKeyViolation`].
    async fn delete_department(&mut self, id: Uuid) -> Result<(), StoreError>;

    async fn get_employee(&mut self, id: Uuid) -> Result<Option<Employee>, StoreError>;

    /// Direct employees of a department, newest first.
    async fn employees_of(&mut self, department_id: Uuid) -> Result<Vec<Employee>, StoreError>;

    async fn insert_employee(&mut self, employee: &Employee) -> Result<(), StoreError>;

    async fn update_employee(&mut self, employee: &Employee) -> Result<(), StoreError>;

    async fn delete_employee(&mut self, id: Uuid) -> Result<bool, StoreError>;

    async fn reassign_employees(&mut self, from: Uuid, to: Uuid) -> Result<u64, StoreError>;

    async fn delete_employees_of(&mut self, department_ids: &[Uuid]) -> Result<u64, StoreError>;

    async fn commit(&mut self) -> Result<(), StoreError>;
}

/// Picks the backend from configuration: Postgres when a database URL is set,
/// otherwise a process-local in-memory store.
pub async fn create_store(config: &Config) -> Result<Arc<dyn TreeStore>, StoreError> {
    match &config.database_url {
        Some(url) => {
            let store = PgTreeStore::connect(url, config.max_connections).await?;
            store.migrate().await?;
            Ok(Arc::new(store))
        }
        None => {
            log::warn!("DATABASE_URL not set, using in-memory store; data will not survive a restart");
            Ok(Arc::new(MemoryTreeStore::new()))
        }
    }
}
