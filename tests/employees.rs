#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use orgchart_backend::db::MemoryTreeStore;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{add_department, add_employee, bearer, find_employee};

fn valid_employee() -> Value {
    json!({
        "full_name": "Poor tester",
        "position": "Tester",
        "hired_at": "2026-02-20",
    })
}

#[actix_web::test]
async fn create_employee_requires_auth() {
    let store = MemoryTreeStore::new();
    let department = add_department(&store, "Test company", None).await;
    let app = app!(store);

    let req = test::TestRequest::post()
        .uri(&format!("/api/departments/{}/employees/", department.id))
        .set_json(valid_employee())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn create_employee_in_path_department() {
    let store = MemoryTreeStore::new();
    let department = add_department(&store, "Test company", None).await;
    let app = app!(store);

    let req = test::TestRequest::post()
        .uri(&format!("/api/departments/{}/employees/", department.id))
        .insert_header(bearer())
        .set_json(valid_employee())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["full_name"], "Poor tester");
    assert_eq!(body["position"], "Tester");
    assert_eq!(body["hired_at"], "2026-02-20");
    assert_eq!(body["department"], json!(department.id));

    let id = Uuid::parse_str(body["id"].as_str().unwrap()).unwrap();
    let stored = find_employee(&store, id).await.unwrap();
    assert_eq!(stored.full_name, "Poor tester");
}

#[actix_web::test]
async fn create_employee_in_unknown_department_is_not_found() {
    let store = MemoryTreeStore::new();
    let app = app!(store);

    for id in [Uuid::new_v4().to_string(), "999".to_string()] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/departments/{}/employees/", id))
            .insert_header(bearer())
            .set_json(valid_employee())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

#[actix_web::test]
async fn create_employee_with_blank_fields_is_attributed() {
    let store = MemoryTreeStore::new();
    let department = add_department(&store, "Test company", None).await;
    let app = app!(store);
    let uri = format!("/api/departments/{}/employees/", department.id);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer())
        .set_json(json!({"full_name": "", "position": "Tester"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["fields"]["full_name"].is_array());
    assert!(body["fields"].get("position").is_none());

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer())
        .set_json(json!({"full_name": "No position"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["fields"]["position"].is_array());
}

#[actix_web::test]
async fn whitespace_only_fields_are_blank() {
    let store = MemoryTreeStore::new();
    let department = add_department(&store, "Test company", None).await;
    let app = app!(store);
    let uri = format!("/api/departments/{}/employees/", department.id);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer())
        .set_json(json!({"full_name": "   ", "position": "  "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["fields"]["full_name"].is_array());
    assert!(body["fields"]["position"].is_array());

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer())
        .set_json(json!({"full_name": "  Poor tester ", "position": " Tester"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["full_name"], "Poor tester");
    assert_eq!(body["position"], "Tester");

    let id = Uuid::parse_str(body["id"].as_str().unwrap()).unwrap();
    let req = test::TestRequest::patch()
        .uri(&format!("/api/employees/{}/", id))
        .insert_header(bearer())
        .set_json(json!({"position": "   "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(find_employee(&store, id).await.unwrap().position, "Tester");
}

#[actix_web::test]
async fn unknown_department_wins_over_a_bad_body() {
    let store = MemoryTreeStore::new();
    let department = add_department(&store, "Test company", None).await;
    let app = app!(store);
    let bad_body = json!({"full_name": "A", "position": "B", "hired_at": "not-a-date"});

    let req = test::TestRequest::post()
        .uri(&format!("/api/departments/{}/employees/", Uuid::new_v4()))
        .insert_header(bearer())
        .set_json(bad_body.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri(&format!("/api/departments/{}/employees/", department.id))
        .set_json(bad_body.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri(&format!("/api/departments/{}/employees/", department.id))
        .insert_header(bearer())
        .set_json(bad_body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn list_department_employees() {
    let store = MemoryTreeStore::new();
    let department = add_department(&store, "Support", None).await;
    let other = add_department(&store, "Legal", None).await;
    add_employee(&store, &department, "First hire").await;
    add_employee(&store, &department, "Second hire").await;
    add_employee(&store, &other, "Lawyer").await;
    let app = app!(store);

    let req = test::TestRequest::get()
        .uri(&format!("/api/departments/{}/employees", department.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["full_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Second hire", "First hire"]);
}

#[actix_web::test]
async fn patch_and_delete_employee() {
    let store = MemoryTreeStore::new();
    let department = add_department(&store, "Support", None).await;
    let target = add_department(&store, "Operations", None).await;
    let employee = add_employee(&store, &department, "Mover").await;
    let app = app!(store);
    let uri = format!("/api/employees/{}/", employee.id);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["full_name"], "Mover");

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bearer())
        .set_json(json!({"position": "Lead", "department": target.id, "hired_at": "2025-01-15"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let stored = find_employee(&store, employee.id).await.unwrap();
    assert_eq!(stored.position, "Lead");
    assert_eq!(stored.department, target.id);
    assert_eq!(stored.full_name, "Mover");
    assert!(stored.hired_at.is_some());

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bearer())
        .set_json(json!({"hired_at": null}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(find_employee(&store, employee.id).await.unwrap().hired_at.is_none());

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(find_employee(&store, employee.id).await.is_none());

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn moving_employee_to_unknown_department_is_a_field_error() {
    let store = MemoryTreeStore::new();
    let department = add_department(&store, "Support", None).await;
    let employee = add_employee(&store, &department, "Stayer").await;
    let app = app!(store);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/employees/{}", employee.id))
        .insert_header(bearer())
        .set_json(json!({"department": Uuid::new_v4()}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["fields"]["department"].is_array());

    assert_eq!(find_employee(&store, employee.id).await.unwrap().department, department.id);
}
