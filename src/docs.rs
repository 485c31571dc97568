use crate::api::department::DepartmentDto;
use crate::api::employee::EmployeeDto;
use crate::errors::ErrorBody;
use utoipa::OpenApi;
use utoipa::openapi::{self, Server};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Company Management API",
        version = "0.1.0",
        description = r#"
## Company Management

CRUD over **Departments** and **Employees**.

### Updating records
- `PUT` or `POST /{collection}/{id}` replaces every attribute
- `PATCH /{collection}/{id}` takes a JSON object of attribute name to new value
  and overwrites only those attributes. Unknown names are rejected and nothing is saved.

### Errors
Non-2xx responses carry a JSON body with a `message`, the offending `field` for
patch errors, and per-field `errors` for constraint violations.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::department::list_departments,
        crate::api::department::get_department,
        crate::api::department::create_department,
        crate::api::department::update_department,
        crate::api::department::delete_department,
        crate::api::department::patch_department,

        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::create_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,
        crate::api::employee::patch_employee
    ),
    components(schemas(DepartmentDto, EmployeeDto, ErrorBody)),
    tags(
        (name = "Department", description = "Department management APIs"),
        (name = "Employee", description = "Employee management APIs"),
    )
)]
pub struct ApiDoc;

/// The document with the configured route prefix as its server base.
pub fn openapi_with_prefix(api_prefix: &str) -> openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    if !api_prefix.is_empty() {
        doc.servers = Some(vec![Server::new(api_prefix)]);
    }
    doc
}
