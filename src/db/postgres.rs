use async_trait::async_trait;
use sqlx::postgres::{PgConnection, PgPoolOptions};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use super::{StoreError, TreeStore, TreeTx};
use crate::models::department::{Department, DepartmentFilter};
use crate::models::employee::Employee;

const DEPARTMENT_COLUMNS: &str = "id, name, parent_id, created_at";
const EMPLOYEE_COLUMNS: &str = "id, department_id, full_name, position, hired_at, created_at";

pub struct PgTreeStore {
    pool: PgPool,
}

impl PgTreeStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(PgTreeStore { pool })
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TreeStore for PgTreeStore {
    async fn begin(&self) -> Result<Box<dyn TreeTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTreeTx { tx: Some(tx) }))
    }
}

pub struct PgTreeTx {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgTreeTx {
    fn conn(&mut self) -> Result<&mut PgConnection, StoreError> {
        self.tx.as_deref_mut().ok_or(StoreError::TransactionClosed)
    }
}

#[async_trait]
impl TreeTx for PgTreeTx {
    async fn get_department(&mut self, id: Uuid) -> Result<Option<Department>, StoreError> {
        let sql = format!("SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE id = $1");
        let department = sqlx::query_as::<_, Department>(&sql)
            .bind(id)
            .fetch_optional(self.conn()?)
            .await?;
        Ok(department)
    }

    async fn lock_department(&mut self, id: Uuid) -> Result<Option<Department>, StoreError> {
        let sql = format!("SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE id = $1 FOR UPDATE");
        let department = sqlx::query_as::<_, Department>(&sql)
            .bind(id)
            .fetch_optional(self.conn()?)
            .await?;
        Ok(department)
    }

    async fn list_departments(&mut self, filter: &DepartmentFilter) -> Result<Vec<Department>, StoreError> {
        let mut query_builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE TRUE"));

        if let Some(name) = &filter.name {
            query_builder.push(" AND name ILIKE ");
            query_builder.push_bind(format!("%{}%", name));
        }
        if let Some(parent) = filter.parent {
            query_builder.push(" AND parent_id = ");
            query_builder.push_bind(parent);
        }

        query_builder.push(" ORDER BY created_at ASC, id ASC");

        if let Some(limit) = filter.limit {
            query_builder.push(" LIMIT ");
            query_builder.push_bind(limit);
        }
        if let Some(offset) = filter.offset {
            query_builder.push(" OFFSET ");
            query_builder.push_bind(offset);
        }

        let departments = query_builder
            .build_query_as::<Department>()
            .fetch_all(self.conn()?)
            .await?;
        Ok(departments)
    }

    async fn children_of(&mut self, id: Uuid) -> Result<Vec<Department>, StoreError> {
        let sql = format!(
            "SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE parent_id = $1 ORDER BY created_at ASC, id ASC"
        );
        let children = sqlx::query_as::<_, Department>(&sql)
            .bind(id)
            .fetch_all(self.conn()?)
            .await?;
        Ok(children)
    }

    async fn department_exists_with(
        &mut self,
        name: &str,
        parent: Option<Uuid>,
        excluding: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM departments \
             WHERE name = $1 AND parent_id IS NOT DISTINCT FROM $2 \
             AND ($3::uuid IS NULL OR id <> $3))",
        )
        .bind(name)
        .bind(parent)
        .bind(excluding)
        .fetch_one(self.conn()?)
        .await?;
        Ok(exists)
    }

    async fn insert_department(&mut self, department: &Department) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO departments (id, name, parent_id, created_at) VALUES ($1, $2, $3, $4)")
            .bind(department.id)
            .bind(&department.name)
            .bind(department.parent)
            .bind(department.created_at)
            .execute(self.conn()?)
            .await?;
        Ok(())
    }

    async fn update_department(&mut self, department: &Department) -> Result<(), StoreError> {
        sqlx::query("UPDATE departments SET name = $1, parent_id = $2 WHERE id = $3")
            .bind(&department.name)
            .bind(department.parent)
            .bind(department.id)
            .execute(self.conn()?)
            .await?;
        Ok(())
    }

    async fn delete_department(&mut self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(self.conn()?)
            .await?;
        Ok(())
    }

    async fn get_employee(&mut self, id: Uuid) -> Result<Option<Employee>, StoreError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1");
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(self.conn()?)
            .await?;
        Ok(employee)
    }

    async fn employees_of(&mut self, department_id: Uuid) -> Result<Vec<Employee>, StoreError> {
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE department_id = $1 ORDER BY created_at DESC"
        );
        let employees = sqlx::query_as::<_, Employee>(&sql)
            .bind(department_id)
            .fetch_all(self.conn()?)
            .await?;
        Ok(employees)
    }

    async fn insert_employee(&mut self, employee: &Employee) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO employees (id, department_id, full_name, position, hired_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(employee.id)
        .bind(employee.department)
        .bind(&employee.full_name)
        .bind(&employee.position)
        .bind(employee.hired_at)
        .bind(employee.created_at)
        .execute(self.conn()?)
        .await?;
        Ok(())
    }

    async fn update_employee(&mut self, employee: &Employee) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE employees SET department_id = $1, full_name = $2, position = $3, hired_at = $4 WHERE id = $5",
        )
        .bind(employee.department)
        .bind(&employee.full_name)
        .bind(&employee.position)
        .bind(employee.hired_at)
        .bind(employee.id)
        .execute(self.conn()?)
        .await?;
        Ok(())
    }

    async fn delete_employee(&mut self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(self.conn()?)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn reassign_employees(&mut self, from: Uuid, to: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE employees SET department_id = $1 WHERE department_id = $2")
            .bind(to)
            .bind(from)
            .execute(self.conn()?)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_employees_of(&mut self, department_ids: &[Uuid]) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM employees WHERE department_id = ANY($1)")
            .bind(department_ids)
            .execute(self.conn()?)
            .await?;
        Ok(result.rows_affected())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        let tx = self.tx.take().ok_or(StoreError::TransactionClosed)?;
        tx.commit().await?;
        Ok(())
    }
}
