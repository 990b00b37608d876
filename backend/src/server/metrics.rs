//! Request metrics middleware that may be switched off at runtime.
//!
//! `create_server` always wraps the app in a [`RequestMetrics`] so the
//! service type does not depend on whether a registry was configured. Without
//! one the layer only boxes response bodies.

use std::sync::Arc;

use actix_service::boxed::{self, BoxService};
use actix_service::{Service, ServiceExt as _, Transform};
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::PrometheusMetrics;
use futures_util::future::LocalBoxFuture;

type BoxedHttpService = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;

/// Records request metrics when a registry is configured.
#[derive(Clone)]
pub(crate) enum RequestMetrics {
    /// Delegates to `actix-web-prom`.
    Recording(Arc<PrometheusMetrics>),
    /// Boxes bodies and records nothing.
    Passthrough,
}

impl From<Option<PrometheusMetrics>> for RequestMetrics {
    fn from(metrics: Option<PrometheusMetrics>) -> Self {
        metrics.map_or(Self::Passthrough, |recorder| {
            Self::Recording(Arc::new(recorder))
        })
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestMetrics
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxedHttpService;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let Self::Recording(metrics) = self else {
            let boxed_bodies = service.map(ServiceResponse::map_into_boxed_body);
            return Box::pin(async move { Ok(boxed::service(boxed_bodies)) });
        };
        let pending = Compat::new(PrometheusMetrics::clone(metrics)).new_transform(service);
        Box::pin(async move { Ok(boxed::service(pending.await?)) })
    }
}
