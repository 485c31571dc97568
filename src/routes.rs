use crate::{
    api::{department, employee},
    errors::AppError,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use anyhow::Context;

pub type RateLimit = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per client IP limiter allowing `requests_per_min` requests with an equal burst.
pub fn rate_limiter(requests_per_min: u32) -> anyhow::Result<RateLimit> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .context("RATE_PER_MIN must be greater than zero")
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limit: &RateLimit) {
    cfg.service(
        web::scope(api_prefix)
            .wrap(Governor::new(limit))
            .configure(register),
    );
}

/// Record routes without rate limiting.
pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/departments")
            // /departments
            .service(
                web::resource("")
                    .route(web::get().to(department::list_departments))
                    .route(web::post().to(department::create_department)),
            )
            // /departments/{id}
            .service(
                web::resource("/{id}")
                    .route(web::get().to(department::get_department))
                    .route(web::put().to(department::update_department))
                    .route(web::post().to(department::update_department))
                    .route(web::delete().to(department::delete_department))
                    .route(web::patch().to(department::patch_department)),
            ),
    )
    .service(
        web::scope("/employees")
            // /employees
            .service(
                web::resource("")
                    .route(web::get().to(employee::list_employees))
                    .route(web::post().to(employee::create_employee)),
            )
            // /employees/{id}
            .service(
                web::resource("/{id}")
                    .route(web::get().to(employee::get_employee))
                    .route(web::put().to(employee::update_employee))
                    .route(web::post().to(employee::update_employee))
                    .route(web::delete().to(employee::delete_employee))
                    .route(web::patch().to(employee::patch_employee)),
            ),
    );
}
