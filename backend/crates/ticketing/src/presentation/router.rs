//! Ticketing Router

use crate::application::config::TicketingConfig;
use crate::domain::repository::{GigRepository, TicketSequence};
use crate::domain::token::TicketIssuer;
use crate::presentation::handlers::{self, TicketingAppState};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

/// Create the ticketing router for any repository implementation
pub fn ticketing_router<R>(repo: R, issuer: TicketIssuer, config: TicketingConfig) -> Router
where
    R: GigRepository + TicketSequence + Clone + Send + Sync + 'static,
{
    let state = TicketingAppState {
        repo: Arc::new(repo),
        issuer: Arc::new(issuer),
        config: Arc::new(config),
    };

    Router::new()
        .route("/purchase", post(handlers::purchase_ticket::<R>))
        .route("/purchase/ticket", post(handlers::purchase_ticket_document::<R>))
        .route("/tickets/public-key", get(handlers::public_key::<R>))
        .route("/gigs", get(handlers::list_gigs::<R>))
        .route("/gigs/{slug}", get(handlers::get_gig::<R>))
        .with_state(state)
}
