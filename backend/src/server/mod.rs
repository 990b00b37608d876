//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::ServerConfig;

#[cfg(feature = "metrics")]
use metrics::RequestMetrics;
use state_builders::build_http_state;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
#[cfg(debug_assertions)]
use actix_web::Error;
use actix_web::{App, HttpServer, web};

use library_backend::Trace;
#[cfg(debug_assertions)]
use library_backend::doc::ApiDoc;
use library_backend::domain::ports::LendingMetrics;
#[cfg(not(feature = "metrics"))]
use library_backend::domain::ports::NoOpLendingMetrics;
use library_backend::inbound::http::api_scope;
use library_backend::inbound::http::health::{HealthState, live, ready};
use library_backend::inbound::http::state::HttpState;
#[cfg(feature = "metrics")]
use library_backend::outbound::metrics::PrometheusLendingMetrics;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Lending counters registered with the Prometheus middleware's registry, or
/// a no-op recorder when metrics are disabled.
///
/// # Errors
/// Returns [`std::io::Error`] if metric registration fails.
#[cfg(feature = "metrics")]
fn build_lending_metrics(config: &ServerConfig) -> std::io::Result<Arc<dyn LendingMetrics>> {
    config.prometheus.as_ref().map_or_else(
        || Ok(Arc::new(library_backend::domain::ports::NoOpLendingMetrics) as Arc<dyn LendingMetrics>),
        |prom| {
            let metrics = PrometheusLendingMetrics::new(&prom.registry).map_err(|e| {
                std::io::Error::other(format!("lending metrics registration failed: {e}"))
            })?;
            Ok(Arc::new(metrics) as Arc<dyn LendingMetrics>)
        },
    )
}

#[cfg(not(feature = "metrics"))]
fn build_lending_metrics(_config: &ServerConfig) -> std::io::Result<Arc<dyn LendingMetrics>> {
    Ok(Arc::new(NoOpLendingMetrics))
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    with_api_docs(
        App::new()
            .app_data(health_state)
            .app_data(http_state)
            .wrap(Trace)
            .service(api_scope())
            .service(ready)
            .service(live),
    )
}

/// Swagger UI at `/docs`, in debug builds only.
#[cfg(debug_assertions)]
fn with_api_docs<T>(app: App<T>) -> App<T>
where
    T: ServiceFactory<ServiceRequest, Config = (), Error = Error, InitError = ()>,
{
    app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(not(debug_assertions))]
const fn with_api_docs<T>(app: App<T>) -> App<T> {
    app
}

/// Construct the HTTP server and mark it ready.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket or registering
/// metrics fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let lending_metrics = build_lending_metrics(&config)?;
    let http_state = build_http_state(&config, lending_metrics);
    let bind_addr = config.bind_addr;

    #[cfg(feature = "metrics")]
    let make_app = {
        let request_metrics = RequestMetrics::from(config.prometheus);
        move || {
            build_app(server_health_state.clone(), http_state.clone())
                .wrap(request_metrics.clone())
        }
    };
    #[cfg(not(feature = "metrics"))]
    let make_app = move || build_app(server_health_state.clone(), http_state.clone());

    let server = HttpServer::new(make_app).bind(bind_addr)?.run();

    health_state.mark_ready();
    Ok(server)
}
