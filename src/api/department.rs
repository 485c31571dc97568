use actix_web::{HttpResponse, web};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::model::department::Department;
use crate::service::RecordService;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": 1,
    "title": "Engineering",
    "isActive": true,
    "createdAt": "2026-01-01T09:00:00Z"
}))]
pub struct DepartmentDto {
    #[schema(example = 1)]
    pub id: Option<u64>,
    #[schema(example = "Engineering")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "DEPT-EN01")]
    pub department_code: Option<String>,
    #[schema(format = "email")]
    pub contact_email: Option<String>,
    pub website: Option<String>,
    #[schema(example = true)]
    pub is_active: bool,
    pub is_verified: Option<bool>,
    pub is_archived: Option<bool>,
    pub employee_count: Option<i32>,
    #[schema(value_type = Option<f64>)]
    pub budget: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub quarterly_loss: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub balance_adjustment: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub revenue: Option<Decimal>,
    pub priority: Option<i32>,
    #[schema(value_type = Option<String>, format = "date")]
    pub established_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub last_updated: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date")]
    pub planned_closure_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    pub next_review_date: Option<NaiveDate>,
    pub manager_names: Option<Vec<String>>,
    pub deletion_reason: Option<String>,
    pub payment_card_number: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Department> for DepartmentDto {
    fn from(d: Department) -> Self {
        Self {
            id: d.id,
            title: d.title,
            description: d.description,
            department_code: d.department_code,
            contact_email: d.contact_email,
            website: d.website,
            is_active: d.is_active,
            is_verified: d.is_verified,
            is_archived: d.is_archived,
            employee_count: d.employee_count,
            budget: d.budget,
            quarterly_loss: d.quarterly_loss,
            balance_adjustment: d.balance_adjustment,
            revenue: d.revenue,
            priority: d.priority,
            established_date: d.established_date,
            last_updated: d.last_updated,
            planned_closure_date: d.planned_closure_date,
            next_review_date: d.next_review_date,
            manager_names: d.manager_names,
            deletion_reason: d.deletion_reason,
            payment_card_number: d.payment_card_number,
            created_at: d.created_at,
        }
    }
}

impl From<DepartmentDto> for Department {
    fn from(d: DepartmentDto) -> Self {
        Self {
            id: d.id,
            title: d.title,
            description: d.description,
            department_code: d.department_code,
            contact_email: d.contact_email,
            website: d.website,
            is_active: d.is_active,
            is_verified: d.is_verified,
            is_archived: d.is_archived,
            employee_count: d.employee_count,
            budget: d.budget,
            quarterly_loss: d.quarterly_loss,
            balance_adjustment: d.balance_adjustment,
            revenue: d.revenue,
            priority: d.priority,
            established_date: d.established_date,
            last_updated: d.last_updated,
            planned_closure_date: d.planned_closure_date,
            next_review_date: d.next_review_date,
            manager_names: d.manager_names,
            deletion_reason: d.deletion_reason,
            payment_card_number: d.payment_card_number,
            created_at: d.created_at,
        }
    }
}

type Departments = web::Data<RecordService<Department>>;

/// List all departments
#[utoipa::path(
    get,
    path = "/departments",
    responses(
        (status = 200, description = "All departments", body = [DepartmentDto])
    ),
    tag = "Department"
)]
pub async fn list_departments(service: Departments) -> Result<HttpResponse, AppError> {
    let departments: Vec<DepartmentDto> = service
        .get_all()
        .await?
        .into_iter()
        .map(DepartmentDto::from)
        .collect();
    debug!(count = departments.len(), "Listed departments");
    Ok(HttpResponse::Ok().json(departments))
}

/// Get Department by ID
#[utoipa::path(
    get,
    path = "/departments/{id}",
    params(("id" = u64, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department found", body = DepartmentDto),
        (status = 404, description = "Department not found", body = ErrorBody)
    ),
    tag = "Department"
)]
pub async fn get_department(
    service: Departments,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let department = service.get_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(DepartmentDto::from(department)))
}

/// Create Department
#[utoipa::path(
    post,
    path = "/departments",
    request_body = DepartmentDto,
    responses(
        (status = 201, description = "Department created", body = DepartmentDto),
        (status = 400, description = "Malformed body or constraint violation", body = ErrorBody)
    ),
    tag = "Department"
)]
pub async fn create_department(
    service: Departments,
    payload: web::Json<DepartmentDto>,
) -> Result<HttpResponse, AppError> {
    let created = service.create(payload.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(DepartmentDto::from(created)))
}

/// Replace every attribute of a Department
#[utoipa::path(
    put,
    path = "/departments/{id}",
    params(("id" = u64, Path, description = "Department ID")),
    request_body = DepartmentDto,
    responses(
        (status = 202, description = "Department replaced", body = DepartmentDto),
        (status = 400, description = "Malformed body or constraint violation", body = ErrorBody),
        (status = 404, description = "Department not found", body = ErrorBody)
    ),
    tag = "Department"
)]
pub async fn update_department(
    service: Departments,
    path: web::Path<u64>,
    payload: web::Json<DepartmentDto>,
) -> Result<HttpResponse, AppError> {
    let updated = service
        .update_by_id(path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Accepted().json(DepartmentDto::from(updated)))
}

/// Delete Department
#[utoipa::path(
    delete,
    path = "/departments/{id}",
    params(("id" = u64, Path, description = "Department ID")),
    responses(
        (status = 204, description = "Department deleted"),
        (status = 404, description = "Department not found", body = ErrorBody)
    ),
    tag = "Department"
)]
pub async fn delete_department(
    service: Departments,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    service.delete_by_id(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Update only the given Department fields
#[utoipa::path(
    patch,
    path = "/departments/{id}",
    params(("id" = u64, Path, description = "Department ID")),
    request_body(content = Object, description = "Field name to new value", example = json!({"isActive": false})),
    responses(
        (status = 200, description = "Department updated", body = DepartmentDto),
        (status = 400, description = "Unknown or read-only field, bad value, or constraint violation", body = ErrorBody),
        (status = 404, description = "Department not found", body = ErrorBody)
    ),
    tag = "Department"
)]
pub async fn patch_department(
    service: Departments,
    path: web::Path<u64>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    let updated = service
        .partial_update_by_id(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(DepartmentDto::from(updated)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::patch::Patchable;
    use crate::test_support::{json_text, request, test_app};
    use actix_web::http::{Method, StatusCode};
    use actix_web::test::{call_and_read_body_json, call_service, init_service, read_body_json};
    use serde_json::json;

    #[test]
    fn every_patchable_field_is_a_transfer_key() {
        let dto = serde_json::to_value(DepartmentDto::from(Department::default())).unwrap();
        let keys = dto.as_object().unwrap();
        let registry = Department::field_registry();

        for name in registry.field_names() {
            assert!(keys.contains_key(name), "{name} is not a transfer key");
        }
        for key in keys.keys() {
            if key != "id" && key != "createdAt" {
                assert!(registry.contains(key), "{key} cannot be patched");
            }
        }
    }

    #[test]
    fn mapping_round_trips() {
        let department = Department {
            id: Some(4),
            title: "Research".into(),
            is_active: true,
            manager_names: Some(vec!["Ada".into()]),
            created_at: Some(Utc::now()),
            ..Department::default()
        };
        let dto = DepartmentDto::from(department.clone());
        assert_eq!(Department::from(dto), department);
    }

    #[actix_web::test]
    async fn create_patch_get_scenario() {
        let app = init_service(test_app()).await;

        let req = request(
            Method::POST,
            "/departments",
            Some(json!({"title": "Engineering", "isActive": true})),
        );
        let resp = call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = read_body_json(resp).await;
        let id = created["id"].as_u64().expect("id assigned");
        assert_eq!(created["title"], "Engineering");
        assert_eq!(created["isActive"], true);
        assert!(created["createdAt"].is_string());

        let uri = format!("/departments/{id}");
        let req = request(Method::PATCH, &uri, Some(json!({"isActive": false})));
        let resp = call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let patched: Value = read_body_json(resp).await;
        assert_eq!(patched["title"], "Engineering");
        assert_eq!(patched["isActive"], false);
        assert_eq!(patched["createdAt"], created["createdAt"]);

        let resp = call_service(&app, request(Method::GET, &uri, None).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let fetched: Value = read_body_json(resp).await;
        assert_eq!(fetched, patched);
    }

    #[actix_web::test]
    async fn unknown_patch_field_is_rejected_and_record_unchanged() {
        let app = init_service(test_app()).await;
        let req = request(
            Method::POST,
            "/departments",
            Some(json!({"title": "Engineering", "isActive": true})),
        );
        let created: Value = call_and_read_body_json(&app, req.to_request()).await;
        let uri = format!("/departments/{}", created["id"]);

        let req = request(Method::PATCH, &uri, Some(json!({"nonexistentField": 1})));
        let resp = call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["field"], "nonexistentField");

        let fetched: Value =
            call_and_read_body_json(&app, request(Method::GET, &uri, None).to_request())
                .await;
        assert_eq!(fetched, created);
    }

    #[actix_web::test]
    async fn missing_department_is_404_for_every_verb() {
        let app = init_service(test_app()).await;
        let body = json!({"title": "Engineering", "isActive": true});

        for (method, payload) in [
            (Method::GET, None),
            (Method::PUT, Some(body.clone())),
            (Method::POST, Some(body.clone())),
            (Method::DELETE, None),
            (Method::PATCH, Some(json!({"isActive": false}))),
        ] {
            let req = request(method.clone(), "/departments/404", payload);
            let resp = call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{method}");
        }
    }

    #[actix_web::test]
    async fn full_update_and_delete() {
        let app = init_service(test_app()).await;
        let req = request(
            Method::POST,
            "/departments",
            Some(json!({"title": "Engineering", "isActive": true, "priority": 3})),
        );
        let created: Value = call_and_read_body_json(&app, req.to_request()).await;
        let uri = format!("/departments/{}", created["id"]);

        let req = request(
            Method::PUT,
            &uri,
            Some(json!({"title": "Platform", "isActive": true})),
        );
        let resp = call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let replaced: Value = read_body_json(resp).await;
        assert_eq!(replaced["title"], "Platform");
        assert_eq!(replaced["priority"], Value::Null);
        assert_eq!(replaced["createdAt"], created["createdAt"]);

        let resp = call_service(&app, request(Method::DELETE, &uri, None).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = call_service(&app, request(Method::GET, &uri, None).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn create_reports_constraint_violations() {
        let app = init_service(test_app()).await;
        let req = request(
            Method::POST,
            "/departments",
            Some(json!({"title": "HR", "isActive": true, "departmentCode": "HR-1"})),
        );
        let resp = call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["message"], "Validation failed");
        assert!(body["errors"]["title"].is_array());
        assert!(body["errors"]["departmentCode"].is_array());

        let all: Value = call_and_read_body_json(
            &app,
            request(Method::GET, "/departments", None).to_request(),
        )
        .await;
        assert_eq!(all, json!([]));
    }

    #[actix_web::test]
    async fn patched_amounts_are_checked_exactly() {
        let app = init_service(test_app()).await;
        let req = request(
            Method::POST,
            "/departments",
            Some(json!({"title": "Finance", "isActive": true})),
        );
        let created: Value = call_and_read_body_json(&app, req.to_request()).await;
        let uri = format!("/departments/{}", created["id"]);

        for (body, field) in [
            (r#"{"revenue": 0.10000000000000000001}"#, "revenue"),
            (r#"{"budget": 1000000.0000000001}"#, "budget"),
        ] {
            let req = request(Method::PATCH, &uri, Some(json_text(body)));
            let resp = call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
            let err: Value = read_body_json(resp).await;
            assert!(err["errors"][field].is_array(), "{body}");
        }

        // below the smallest representable magnitude
        let req = request(
            Method::PATCH,
            &uri,
            Some(json_text(r#"{"quarterlyLoss": -1e-400}"#)),
        );
        let resp = call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = request(
            Method::PATCH,
            &uri,
            Some(json_text(
                r#"{"quarterlyLoss": -0.0000000000000000000000000001, "revenue": 999999.99}"#,
            )),
        );
        let resp = call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let patched: Value = read_body_json(resp).await;
        assert_eq!(
            patched["quarterlyLoss"].to_string(),
            "-0.0000000000000000000000000001"
        );
        assert_eq!(patched["revenue"].to_string(), "999999.99");
        assert_eq!(patched["budget"], Value::Null);
    }

    #[actix_web::test]
    async fn malformed_input_is_400() {
        let app = init_service(test_app()).await;

        let req = request(Method::POST, "/departments", Some(json!({"isActive": true})));
        let resp = call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = request(Method::GET, "/departments/abc", None);
        let resp = call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = request(Method::PATCH, "/departments/1", Some(json!([1, 2])));
        let resp = call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn list_returns_departments_in_id_order() {
        let app = init_service(test_app()).await;
        for title in ["Engineering", "Finance"] {
            let req = request(
                Method::POST,
                "/departments",
                Some(json!({"title": title, "isActive": true})),
            );
            call_service(&app, req.to_request()).await;
        }

        let resp = call_service(&app, request(Method::GET, "/departments", None).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let all: Value = read_body_json(resp).await;
        let titles: Vec<_> = all
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, ["Engineering", "Finance"]);
    }
}
