use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::Method;
use actix_web::test::TestRequest;
use actix_web::web::Data;
use actix_web::{App, Error};
use serde_json::Value;
use std::sync::Arc;

use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::repository::MemoryRepository;
use crate::routes;
use crate::service::RecordService;

/// Both record routes over fresh in-memory stores.
pub fn test_app() -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(Data::new(RecordService::<Department>::new(Arc::new(
            MemoryRepository::new(),
        ))))
        .app_data(Data::new(RecordService::<Employee>::new(Arc::new(
            MemoryRepository::new(),
        ))))
        .configure(routes::register)
}

pub fn request(method: Method, uri: &str, body: Option<Value>) -> TestRequest {
    let req = TestRequest::default().method(method).uri(uri);
    match body {
        Some(body) => req.set_json(body),
        None => req,
    }
}

/// Parses `text` keeping every number literal exactly as written.
pub fn json_text(text: &str) -> Value {
    serde_json::from_str(text).expect("test body is valid JSON")
}
