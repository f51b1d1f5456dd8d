#![allow(dead_code)]

use orgchart_backend::db::{MemoryTreeStore, TreeStore};
use orgchart_backend::models::department::{Department, DepartmentFilter};
use orgchart_backend::models::employee::Employee;
use orgchart_backend::utils::jwt::generate_token;
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret";

/// Builds the service over `$store` the same way `main` does.
macro_rules! app {
    ($store:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(actix_web::middleware::NormalizePath::trim())
                .app_data(actix_web::web::Data::new(orgchart_backend::AppState {
                    store: std::sync::Arc::new($store.clone()),
                    jwt_secret: common::SECRET.to_string(),
                }))
                .configure(orgchart_backend::configure),
        )
        .await
    };
}

pub fn bearer() -> (&'static str, String) {
    let token = generate_token("hr-admin", SECRET).unwrap();
    ("Authorization", format!("Bearer {}", token))
}

pub async fn add_department(store: &MemoryTreeStore, name: &str, parent: Option<&Department>) -> Department {
    let department = Department::new(name, parent.map(|p| p.id));
    let mut tx = store.begin().await.unwrap();
    tx.insert_department(&department).await.unwrap();
    tx.commit().await.unwrap();
    department
}

pub async fn add_employee(store: &MemoryTreeStore, department: &Department, full_name: &str) -> Employee {
    let employee = Employee::new(department.id, full_name, "Tester", None);
    let mut tx = store.begin().await.unwrap();
    tx.insert_employee(&employee).await.unwrap();
    tx.commit().await.unwrap();
    employee
}

pub async fn find_department(store: &MemoryTreeStore, id: Uuid) -> Option<Department> {
    let mut tx = store.begin().await.unwrap();
    tx.get_department(id).await.unwrap()
}

pub async fn find_employee(store: &MemoryTreeStore, id: Uuid) -> Option<Employee> {
    let mut tx = store.begin().await.unwrap();
    tx.get_employee(id).await.unwrap()
}

pub async fn department_count(store: &MemoryTreeStore) -> usize {
    let mut tx = store.begin().await.unwrap();
    tx.list_departments(&DepartmentFilter::default()).await.unwrap().len()
}
