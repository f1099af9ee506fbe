//! XSS scanning middleware
//!
//! Runs the scan pipeline before route dispatch. Header and query scans
//! are observe-only; a body-scan hit short-circuits with 400 and the
//! fixed error payload. The body is buffered and re-injected so the
//! extractors downstream still see it.

use actix_web::{
    body::{BoxBody, EitherBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web::BytesMut,
    Error, HttpMessage, HttpResponse,
};
use futures::future::{ready, Ready};
use futures::StreamExt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use crate::pipeline::{parse_query, ScanPipeline, ScanRequest, StageOutcome, SCANNED_HEADERS};

pub struct XssScanMiddleware {
    pipeline: Arc<ScanPipeline>,
}

impl XssScanMiddleware {
    /// Middleware over the standard header/query/body stage order.
    pub fn new() -> Self {
        Self {
            pipeline: Arc::new(ScanPipeline::standard()),
        }
    }

    pub fn with_pipeline(pipeline: ScanPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

impl Default for XssScanMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for XssScanMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = XssScanMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(XssScanMiddlewareService {
            service: Rc::new(service),
            pipeline: self.pipeline.clone(),
        }))
    }
}

pub struct XssScanMiddlewareService<S> {
    service: Rc<S>,
    pipeline: Arc<ScanPipeline>,
}

impl<S, B> Service<ServiceRequest> for XssScanMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let pipeline = self.pipeline.clone();

        Box::pin(async move {
            let client_addr = req
                .connection_info()
                .realip_remote_addr()
                .map(str::to_owned);

            let headers = SCANNED_HEADERS
                .iter()
                .filter_map(|name| {
                    req.headers()
                        .get(*name)
                        .and_then(|value| value.to_str().ok())
                        .map(|value| (name.to_string(), value.to_owned()))
                })
                .collect();

            let query = parse_query(req.query_string());

            let body = if is_scannable(&req) {
                Some(buffer_body(&mut req).await?)
            } else {
                None
            };

            let scan_req = ScanRequest {
                path: req.path().to_owned(),
                client_addr,
                headers,
                query,
                body: body
                    .as_ref()
                    .map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
            };

            if let StageOutcome::Reject(rejection) = pipeline.run(&scan_req) {
                let response: HttpResponse<BoxBody> =
                    HttpResponse::build(rejection.status).json(rejection.body);
                return Ok(req.into_response(response).map_into_right_body());
            }

            // Rewind: put the buffered bytes back so extractors can read them
            if let Some(bytes) = body {
                req.set_payload(bytes_to_payload(bytes.freeze()));
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// Only JSON and form-urlencoded bodies are scanned.
fn is_scannable(req: &ServiceRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|content_type| {
            content_type.contains("application/json")
                || content_type.contains("application/x-www-form-urlencoded")
        })
        .unwrap_or(false)
}

async fn buffer_body(req: &mut ServiceRequest) -> Result<BytesMut, Error> {
    let mut payload = req.take_payload();
    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        body.extend_from_slice(&chunk.map_err(Error::from)?);
    }
    Ok(body)
}

fn bytes_to_payload(bytes: actix_web::web::Bytes) -> actix_web::dev::Payload {
    let (_, mut payload) = actix_http::h1::Payload::create(true);
    payload.unread_data(bytes);
    actix_web::dev::Payload::from(payload)
}
