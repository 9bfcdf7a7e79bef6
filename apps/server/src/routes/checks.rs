use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, post, web};
use checker::region::{PREFER_REGION_HEADER, REPLAY_HEADER};
use checker::{CheckOutcome, OnDemandOutcome, Protocol, RawCheckRequest};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

macros_utils::routes! {
    route monitor_check,
    route region_check,
}

#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    data: Option<String>,
}

impl DetailQuery {
    fn detailed(&self) -> bool {
        self.data.as_deref() == Some("true")
    }
}

fn header_value<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|value| value.to_str().ok())
}

/// Checks the secret, then decodes the body
fn accept(state: &AppState, req: &HttpRequest, body: &[u8]) -> Result<RawCheckRequest, ApiError> {
    if !state.authorized(header_value(req, header::AUTHORIZATION.as_str())) {
        return Err(ApiError::Unauthorized);
    }
    Ok(serde_json::from_slice(body)?)
}

fn forward(region: &str) -> HttpResponse {
    HttpResponse::Accepted()
        .insert_header((REPLAY_HEADER, format!("region={region}")))
        .body(format!("Forwarding request to {region}"))
}

/// Scheduled monitor check
#[post("/checker/{protocol}")]
pub async fn monitor_check(
    state: web::Data<AppState>,
    req: HttpRequest,
    protocol: web::Path<Protocol>,
    query: web::Query<DetailQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let raw = accept(&state, &req, &body)?;
    let preferred = header_value(&req, PREFER_REGION_HEADER);

    let outcome = state
        .handler
        .check(protocol.into_inner(), preferred, raw, query.detailed())
        .await?;

    Ok(match outcome {
        CheckOutcome::Forward { region } => forward(&region),
        CheckOutcome::Completed { response: Some(response), .. } => HttpResponse::Ok().json(response),
        CheckOutcome::Completed { response: None, .. } => HttpResponse::Ok().finish(),
    })
}

/// On-demand check pinned to a region
#[post("/{protocol}/{region}")]
pub async fn region_check(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(Protocol, String)>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let raw = accept(&state, &req, &body)?;
    let preferred = header_value(&req, PREFER_REGION_HEADER);
    let (protocol, region) = path.into_inner();

    let outcome = state.handler.check_on_demand(protocol, &region, preferred, raw).await?;

    Ok(match outcome {
        OnDemandOutcome::Forward { region } => forward(&region),
        OnDemandOutcome::Reachable(response) => HttpResponse::Ok().json(response),
        OnDemandOutcome::Unreachable(message) => HttpResponse::Ok().json(message),
    })
}
