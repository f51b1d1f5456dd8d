use actix_web::{web, HttpResponse, HttpRequest};
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;
use uuid::Uuid;

use super::{deserialize_some, deserialize_trimmed, deserialize_trimmed_option, json_body, parse_id};
use crate::errors::AppError;
use crate::models::employee::Employee;
use crate::utils::jwt::require_writer;
use crate::utils::validation::validate_payload;
use crate::AppState;

#[derive(Deserialize, Validate)]
pub struct NewEmployee {
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, max = 200, message = "This field may not be blank or longer than 200 characters."))]
    full_name: String,
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, max = 200, message = "This field may not be blank or longer than 200 characters."))]
    position: String,
    #[serde(default)]
    hired_at: Option<NaiveDate>,
}

#[derive(Deserialize, Validate)]
pub struct EmployeeUpdate {
    #[serde(default, deserialize_with = "deserialize_trimmed_option")]
    #[validate(length(min = 1, max = 200, message = "This field may not be blank or longer than 200 characters."))]
    full_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_trimmed_option")]
    #[validate(length(min = 1, max = 200, message = "This field may not be blank or longer than 200 characters."))]
    position: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    hired_at: Option<Option<NaiveDate>>,
    department: Option<Uuid>,
}

pub async fn create_employee(
    req: HttpRequest,
    state: web::Data<AppState>,
    department_id: web::Path<String>,
    new_employee: Result<web::Json<NewEmployee>, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    require_writer(&req, &state.jwt_secret)?;

    let department_id = parse_id(&department_id, "Department")?;

    let mut tx = state.store.begin().await?;
    if tx.get_department(department_id).await?.is_none() {
        return Err(AppError::NotFound("Department not found".to_string()));
    }

    let new_employee = json_body(new_employee)?;
    validate_payload(&new_employee)?;
    let employee = Employee::new(
        department_id,
        new_employee.full_name,
        new_employee.position,
        new_employee.hired_at,
    );

    tx.insert_employee(&employee).await?;
    tx.commit().await?;

    log::info!("Created employee {} in department {}", employee.id, department_id);
    Ok(HttpResponse::Created().json(employee))
}

pub async fn get_department_employees(
    state: web::Data<AppState>,
    department_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let department_id = parse_id(&department_id, "Department")?;

    let mut tx = state.store.begin().await?;
    if tx.get_department(department_id).await?.is_none() {
        return Err(AppError::NotFound("Department not found".to_string()));
    }
    let employees = tx.employees_of(department_id).await?;

    Ok(HttpResponse::Ok().json(employees))
}

pub async fn get_employee(
    state: web::Data<AppState>,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee_id = parse_id(&employee_id, "Employee")?;

    let mut tx = state.store.begin().await?;
    let employee = tx
        .get_employee(employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    Ok(HttpResponse::Ok().json(employee))
}

pub async fn update_employee(
    req: HttpRequest,
    state: web::Data<AppState>,
    employee_id: web::Path<String>,
    updates: Result<web::Json<EmployeeUpdate>, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    require_writer(&req, &state.jwt_secret)?;

    let employee_id = parse_id(&employee_id, "Employee")?;

    let mut tx = state.store.begin().await?;
    let mut employee = tx
        .get_employee(employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    let updates = json_body(updates)?;
    validate_payload(&updates)?;

    if let Some(department_id) = updates.department {
        if tx.get_department(department_id).await?.is_none() {
            return Err(AppError::field(
                "department",
                format!("Invalid pk \"{}\" - object does not exist", department_id),
            ));
        }
        employee.department = department_id;
    }
    if let Some(full_name) = updates.full_name {
        employee.full_name = full_name;
    }
    if let Some(position) = updates.position {
        employee.position = position;
    }
    if let Some(hired_at) = updates.hired_at {
        employee.hired_at = hired_at;
    }

    tx.update_employee(&employee).await?;
    tx.commit().await?;

    log::info!("Updated employee {}", employee.id);
    Ok(HttpResponse::Ok().json(employee))
}

pub async fn delete_employee(
    req: HttpRequest,
    state: web::Data<AppState>,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_writer(&req, &state.jwt_secret)?;

    let employee_id = parse_id(&employee_id, "Employee")?;

    let mut tx = state.store.begin().await?;
    if !tx.delete_employee(employee_id).await? {
        return Err(AppError::NotFound("Employee not found".to_string()));
    }
    tx.commit().await?;

    log::info!("Deleted employee {}", employee_id);
    Ok(HttpResponse::NoContent().finish())
}
