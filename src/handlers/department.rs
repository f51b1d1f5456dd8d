use actix_web::{web, HttpResponse, HttpRequest};
use serde::Deserialize;
use validator::Validate;
use uuid::Uuid;

use super::{deserialize_some, deserialize_trimmed, deserialize_trimmed_option, json_body, parse_id};
use crate::errors::AppError;
use crate::models::department::{Department, DepartmentFilter};
use crate::services::deletion::{self, DeletionMode};
use crate::services::tree_reader;
use crate::utils::jwt::require_writer;
use crate::utils::validation::{check_department, validate_payload};
use crate::AppState;

#[derive(Deserialize, Validate)]
pub struct NewDepartment {
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, max = 200, message = "This field may not be blank or longer than 200 characters."))]
    name: String,
    #[serde(default)]
    parent: Option<Uuid>,
}

#[derive(Deserialize, Validate)]
pub struct DepartmentUpdate {
    #[serde(default, deserialize_with = "deserialize_trimmed_option")]
    #[validate(length(min = 1, max = 200, message = "This field may not be blank or longer than 200 characters."))]
    name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    parent: Option<Option<Uuid>>,
}

#[derive(Deserialize, Validate)]
pub struct DepartmentQueryParams {
    name: Option<String>,
    parent: Option<Uuid>,
    #[validate(range(min = 0))]
    limit: Option<i64>,
    #[validate(range(min = 0))]
    offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct TreeQueryParams {
    depth: Option<String>,
    include_employees: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteQueryParams {
    mode: Option<String>,
    reassign_to_department_id: Option<String>,
}

impl TreeQueryParams {
    fn depth(&self) -> Result<i64, AppError> {
        match &self.depth {
            None => Ok(tree_reader::MIN_DEPTH),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| AppError::field("depth", "A valid integer is required.")),
        }
    }

    fn include_employees(&self) -> bool {
        self.include_employees
            .as_deref()
            .map_or(true, |raw| raw.eq_ignore_ascii_case("true"))
    }
}

pub async fn get_departments(
    state: web::Data<AppState>,
    query: web::Query<DepartmentQueryParams>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*query)?;

    let filter = DepartmentFilter {
        name: query.name.clone(),
        parent: query.parent,
        limit: query.limit,
        offset: query.offset,
    };

    let mut tx = state.store.begin().await?;
    let departments = tx.list_departments(&filter).await?;

    Ok(HttpResponse::Ok().json(departments))
}

pub async fn create_department(
    req: HttpRequest,
    state: web::Data<AppState>,
    new_department: Result<web::Json<NewDepartment>, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    require_writer(&req, &state.jwt_secret)?;

    let new_department = json_body(new_department)?;
    validate_payload(&new_department)?;
    let department = Department::new(new_department.name, new_department.parent);

    let mut tx = state.store.begin().await?;
    check_department(tx.as_mut(), &department, false).await?;
    tx.insert_department(&department).await?;
    tx.commit().await?;

    log::info!("Created department {} ({:?})", department.id, department.name);
    Ok(HttpResponse::Created().json(department))
}

pub async fn get_department(
    state: web::Data<AppState>,
    department_id: web::Path<String>,
    query: web::Query<TreeQueryParams>,
) -> Result<HttpResponse, AppError> {
    let depth = query.depth()?;
    let include_employees = query.include_employees();

    let department_id = parse_id(&department_id, "Department")?;
    let tree = tree_reader::read_tree(state.store.as_ref(), department_id, depth, include_employees).await?;

    Ok(HttpResponse::Ok().json(tree))
}

pub async fn update_department(
    req: HttpRequest,
    state: web::Data<AppState>,
    department_id: web::Path<String>,
    updates: Result<web::Json<DepartmentUpdate>, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    require_writer(&req, &state.jwt_secret)?;

    let department_id = parse_id(&department_id, "Department")?;

    let mut tx = state.store.begin().await?;
    let mut department = tx
        .get_department(department_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Department not found".to_string()))?;

    let updates = json_body(updates)?;
    validate_payload(&updates)?;

    if let Some(name) = updates.name {
        department.name = name;
    }
    if let Some(parent) = updates.parent {
        department.parent = parent;
    }

    check_department(tx.as_mut(), &department, true).await?;
    tx.update_department(&department).await?;
    tx.commit().await?;

    log::info!("Updated department {}", department.id);
    Ok(HttpResponse::Ok().json(department))
}

pub async fn delete_department(
    req: HttpRequest,
    state: web::Data<AppState>,
    department_id: web::Path<String>,
    query: web::Query<DeleteQueryParams>,
) -> Result<HttpResponse, AppError> {
    require_writer(&req, &state.jwt_secret)?;

    let mode = DeletionMode::from_params(
        query.mode.as_deref(),
        query.reassign_to_department_id.as_deref(),
    )
    .map_err(|err| {
        log::warn!("Rejected department delete: {}", err);
        err
    })?;

    let department_id = parse_id(&department_id, "Department")?;
    deletion::delete_department(state.store.as_ref(), department_id, mode).await?;

    Ok(HttpResponse::NoContent().finish())
}
