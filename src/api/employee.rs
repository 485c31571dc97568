use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::model::employee::Employee;
use crate::service::RecordService;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": 1,
    "name": "Grace Hopper",
    "employeeId": "EMP-000042",
    "email": "grace@company.com",
    "isPermanent": true
}))]
pub struct EmployeeDto {
    #[schema(example = 1)]
    pub id: Option<u64>,
    #[schema(example = "Grace Hopper")]
    pub name: String,
    pub bio: Option<String>,
    #[schema(example = "EMP-000042")]
    pub employee_id: Option<String>,
    #[schema(format = "email")]
    pub email: Option<String>,
    pub linked_in_profile: Option<String>,
    #[schema(example = 45)]
    pub age: Option<i32>,
    #[schema(value_type = Option<f64>)]
    pub salary: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub monthly_deduction: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub account_balance: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub bonus: Option<Decimal>,
    pub performance_rating: Option<i32>,
    #[schema(value_type = Option<String>, format = "date")]
    pub dob: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    pub date_of_hire: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub last_login: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date")]
    pub contract_end_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    pub next_review_date: Option<NaiveDate>,
    pub skills: Option<Vec<String>>,
    pub termination_reason: Option<String>,
    pub credit_card_number: Option<String>,
    #[schema(example = true)]
    pub is_permanent: bool,
    pub is_verified: Option<bool>,
    pub is_on_leave: Option<bool>,
    #[schema(example = "+14155552671")]
    pub phone_number: Option<String>,
    pub address_list: Option<Vec<String>>,
}

impl From<Employee> for EmployeeDto {
    fn from(e: Employee) -> Self {
        Self {
            id: e.id,
            name: e.name,
            bio: e.bio,
            employee_id: e.employee_id,
            email: e.email,
            linked_in_profile: e.linked_in_profile,
            age: e.age,
            salary: e.salary,
            monthly_deduction: e.monthly_deduction,
            account_balance: e.account_balance,
            bonus: e.bonus,
            performance_rating: e.performance_rating,
            dob: e.dob,
            date_of_hire: e.date_of_hire,
            last_login: e.last_login,
            contract_end_date: e.contract_end_date,
            next_review_date: e.next_review_date,
            skills: e.skills,
            termination_reason: e.termination_reason,
            credit_card_number: e.credit_card_number,
            is_permanent: e.is_permanent,
            is_verified: e.is_verified,
            is_on_leave: e.is_on_leave,
            phone_number: e.phone_number,
            address_list: e.address_list,
        }
    }
}

impl From<EmployeeDto> for Employee {
    fn from(e: EmployeeDto) -> Self {
        Self {
            id: e.id,
            name: e.name,
            bio: e.bio,
            employee_id: e.employee_id,
            email: e.email,
            linked_in_profile: e.linked_in_profile,
            age: e.age,
            salary: e.salary,
            monthly_deduction: e.monthly_deduction,
            account_balance: e.account_balance,
            bonus: e.bonus,
            performance_rating: e.performance_rating,
            dob: e.dob,
            date_of_hire: e.date_of_hire,
            last_login: e.last_login,
            contract_end_date: e.contract_end_date,
            next_review_date: e.next_review_date,
            skills: e.skills,
            termination_reason: e.termination_reason,
            credit_card_number: e.credit_card_number,
            is_permanent: e.is_permanent,
            is_verified: e.is_verified,
            is_on_leave: e.is_on_leave,
            phone_number: e.phone_number,
            address_list: e.address_list,
        }
    }
}

type Employees = web::Data<RecordService<Employee>>;

/// List all employees
#[utoipa::path(
    get,
    path = "/employees",
    responses(
        (status = 200, description = "All employees", body = [EmployeeDto])
    ),
    tag = "Employee"
)]
pub async fn list_employees(service: Employees) -> Result<HttpResponse, AppError> {
    let employees: Vec<EmployeeDto> = service
        .get_all()
        .await?
        .into_iter()
        .map(EmployeeDto::from)
        .collect();
    debug!(count = employees.len(), "Listed employees");
    Ok(HttpResponse::Ok().json(employees))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = EmployeeDto),
        (status = 404, description = "Employee not found", body = ErrorBody)
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    service: Employees,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let employee = service.get_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(EmployeeDto::from(employee)))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/employees",
    request_body = EmployeeDto,
    responses(
        (status = 201, description = "Employee created", body = EmployeeDto),
        (status = 400, description = "Malformed body or constraint violation", body = ErrorBody)
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    service: Employees,
    payload: web::Json<EmployeeDto>,
) -> Result<HttpResponse, AppError> {
    let created = service.create(payload.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(EmployeeDto::from(created)))
}

/// Replace every attribute of an Employee
#[utoipa::path(
    put,
    path = "/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    request_body = EmployeeDto,
    responses(
        (status = 202, description = "Employee replaced", body = EmployeeDto),
        (status = 400, description = "Malformed body or constraint violation", body = ErrorBody),
        (status = 404, description = "Employee not found", body = ErrorBody)
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    service: Employees,
    path: web::Path<u64>,
    payload: web::Json<EmployeeDto>,
) -> Result<HttpResponse, AppError> {
    let updated = service
        .update_by_id(path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Accepted().json(EmployeeDto::from(updated)))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Employee not found", body = ErrorBody)
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    service: Employees,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    service.delete_by_id(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Update only the given Employee fields
#[utoipa::path(
    patch,
    path = "/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    request_body(content = Object, description = "Field name to new value", example = json!({"age": 31})),
    responses(
        (status = 200, description = "Employee updated", body = EmployeeDto),
        (status = 400, description = "Unknown or read-only field, bad value, or constraint violation", body = ErrorBody),
        (status = 404, description = "Employee not found", body = ErrorBody)
    ),
    tag = "Employee"
)]
pub async fn patch_employee(
    service: Employees,
    path: web::Path<u64>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    let updated = service
        .partial_update_by_id(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(EmployeeDto::from(updated)))
}
