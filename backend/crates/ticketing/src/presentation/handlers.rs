//! HTTP Handlers

use crate::application::config::TicketingConfig;
use crate::application::gigs::GigCatalogUseCase;
use crate::application::purchase_ticket::{
    PurchaseStage, PurchaseTicketOutput, PurchaseTicketUseCase,
};
use crate::domain::repository::{GigRepository, TicketSequence};
use crate::domain::ticket::Ticket;
use crate::domain::token::{ALGORITHM, TicketIssuer};
use crate::error::TicketResult;
use crate::presentation::dto::{GigListResponse, GigResponse, PublicKeyResponse, PurchaseResponse};
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use platform::crypto::to_base64url;
use std::sync::Arc;

pub const TICKET_NUMBER_HEADER: &str = "x-ticket-number";

/// Shared state for ticketing handlers
#[derive(Clone)]
pub struct TicketingAppState<R>
where
    R: GigRepository + TicketSequence + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub issuer: Arc<TicketIssuer>,
    pub config: Arc<TicketingConfig>,
}

impl<R> TicketingAppState<R>
where
    R: GigRepository + TicketSequence + Clone + Send + Sync + 'static,
{
    fn purchase_use_case(&self) -> PurchaseTicketUseCase<R, R> {
        PurchaseTicketUseCase::new(
            self.repo.clone(),
            self.repo.clone(),
            self.issuer.clone(),
            self.config.clone(),
        )
    }
}

/// POST /api/purchase
///
/// The body is taken raw so that malformed JSON maps to our own 400.
pub async fn purchase_ticket<R>(
    State(state): State<TicketingAppState<R>>,
    body: Bytes,
) -> TicketResult<impl IntoResponse>
where
    R: GigRepository + TicketSequence + Clone + Send + Sync + 'static,
{
    let output = state.purchase_use_case().execute(&body).await?;
    log_responded(&output);

    Ok((StatusCode::ACCEPTED, Json(PurchaseResponse { success: true })))
}

/// POST /api/purchase/ticket
pub async fn purchase_ticket_document<R>(
    State(state): State<TicketingAppState<R>>,
    body: Bytes,
) -> TicketResult<impl IntoResponse>
where
    R: GigRepository + TicketSequence + Clone + Send + Sync + 'static,
{
    let output = state.purchase_use_case().execute(&body).await?;
    log_responded(&output);

    Ok((
        StatusCode::ACCEPTED,
        [
            (header::CONTENT_TYPE.as_str(), Ticket::CONTENT_TYPE.to_string()),
            (TICKET_NUMBER_HEADER, output.ticket_number.to_string()),
        ],
        output.ticket.svg,
    ))
}

fn log_responded(output: &PurchaseTicketOutput) {
    tracing::debug!(
        purchase_id = %output.purchase_id,
        stage = %PurchaseStage::Responded,
        ticket_number = %output.ticket_number,
        "Purchase responded"
    );
}

/// GET /api/tickets/public-key
pub async fn public_key<R>(State(state): State<TicketingAppState<R>>) -> Json<PublicKeyResponse>
where
    R: GigRepository + TicketSequence + Clone + Send + Sync + 'static,
{
    let key = state.issuer.verifying_key();

    Json(PublicKeyResponse {
        algorithm: ALGORITHM,
        key_id: state.issuer.key_id(),
        public_key: to_base64url(key.as_bytes()),
    })
}

/// GET /api/gigs
pub async fn list_gigs<R>(
    State(state): State<TicketingAppState<R>>,
) -> TicketResult<Json<GigListResponse>>
where
    R: GigRepository + TicketSequence + Clone + Send + Sync + 'static,
{
    let gigs = GigCatalogUseCase::new(state.repo.clone()).list().await?;

    Ok(Json(GigListResponse {
        gigs: gigs.into_iter().map(GigResponse::from).collect(),
    }))
}

/// GET /api/gigs/{slug}
pub async fn get_gig<R>(
    State(state): State<TicketingAppState<R>>,
    Path(slug): Path<String>,
) -> TicketResult<Json<GigResponse>>
where
    R: GigRepository + TicketSequence + Clone + Send + Sync + 'static,
{
    let gig = GigCatalogUseCase::new(state.repo.clone()).get(&slug).await?;

    Ok(Json(gig.into()))
}
