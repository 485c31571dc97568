use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa_swagger_ui::SwaggerUi;

mod api;
mod config;
mod db;
mod docs;
mod errors;
mod model;
mod repository;
mod routes;
mod service;
mod utils;

#[cfg(test)]
mod test_support;

use config::Config;
use db::init_db;
use model::department::Department;
use model::employee::Employee;
use repository::{MemoryRepository, MySqlRepository, Repository};
use service::RecordService;

#[derive(Clone)]
struct Services {
    departments: Data<RecordService<Department>>,
    employees: Data<RecordService<Employee>>,
}

impl Services {
    fn over(
        departments: Arc<dyn Repository<Department>>,
        employees: Arc<dyn Repository<Employee>>,
    ) -> Self {
        Self {
            departments: Data::new(RecordService::new(departments)),
            employees: Data::new(RecordService::new(employees)),
        }
    }
}

async fn build_services(config: &Config) -> anyhow::Result<Services> {
    match &config.database_url {
        Some(url) => {
            let pool = init_db(url, config.db_max_connections)
                .await
                .context("Failed to connect to MySQL")?;
            info!(max_connections = config.db_max_connections, "Using MySQL store");
            Ok(Services::over(
                Arc::new(MySqlRepository::<Department>::new(pool.clone())),
                Arc::new(MySqlRepository::<Employee>::new(pool)),
            ))
        }
        None => {
            warn!("DATABASE_URL is not set, records are kept in memory and lost on exit");
            Ok(Services::over(
                Arc::new(MemoryRepository::<Department>::new()),
                Arc::new(MemoryRepository::<Employee>::new()),
            ))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(addr = %config.server_addr, prefix = %config.api_prefix, "Server starting...");

    let services = build_services(&config).await?;
    let limit = routes::rate_limiter(config.rate_per_min)?;
    let openapi = docs::openapi_with_prefix(&config.api_prefix);
    let api_prefix = config.api_prefix.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // wildcard {_:.*} so the JS/CSS assets resolve
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", openapi.clone()),
            )
            .app_data(services.departments.clone())
            .app_data(services.employees.clone())
            .configure(|cfg| routes::configure(cfg, &api_prefix, &limit))
    })
    .bind(&config.server_addr)
    .with_context(|| format!("Failed to bind {}", config.server_addr))?
    .run()
    .await?;

    Ok(())
}
