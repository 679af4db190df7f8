//! Purchase Ticket Use Case
//!
//! Received -> Validated -> ItemConfirmed -> Issued -> Assembled, or Rejected.
//! The HTTP handlers record the final Assembled -> Responded step once the
//! ticket has been written out. Nothing is persisted before the ticket is
//! assembled; an abandoned request at most skips a ticket number.

use crate::application::config::TicketingConfig;
use crate::domain::repository::{GigRepository, TicketSequence};
use crate::domain::ticket::{Ticket, TicketDetails, assemble};
use crate::domain::token::{SignedToken, TicketIssuer};
use crate::domain::validation::{PurchaseRequest, validate};
use crate::domain::value_objects::TicketNumber;
use crate::error::{TicketError, TicketResult};
use chrono::{DateTime, Utc};
use kernel::id::PurchaseId;
use platform::qr::{EncodedCode, encode_qr};
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

/// Pipeline stage reached by a purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseStage {
    Received,
    Validated,
    ItemConfirmed,
    Issued,
    Assembled,
    Responded,
    Rejected,
}

impl fmt::Display for PurchaseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PurchaseStage::Received => "received",
            PurchaseStage::Validated => "validated",
            PurchaseStage::ItemConfirmed => "item_confirmed",
            PurchaseStage::Issued => "issued",
            PurchaseStage::Assembled => "assembled",
            PurchaseStage::Responded => "responded",
            PurchaseStage::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Output DTO for purchase ticket
#[derive(Debug, Clone)]
pub struct PurchaseTicketOutput {
    pub purchase_id: PurchaseId,
    pub ticket_number: TicketNumber,
    pub token: SignedToken,
    pub code: EncodedCode,
    pub ticket: Ticket,
}

/// Purchase Ticket Use Case
pub struct PurchaseTicketUseCase<G, S>
where
    G: GigRepository,
    S: TicketSequence,
{
    gig_repo: Arc<G>,
    sequence: Arc<S>,
    issuer: Arc<TicketIssuer>,
    config: Arc<TicketingConfig>,
}

impl<G, S> PurchaseTicketUseCase<G, S>
where
    G: GigRepository,
    S: TicketSequence,
{
    pub fn new(
        gig_repo: Arc<G>,
        sequence: Arc<S>,
        issuer: Arc<TicketIssuer>,
        config: Arc<TicketingConfig>,
    ) -> Self {
        Self {
            gig_repo,
            sequence,
            issuer,
            config,
        }
    }

    /// Run the pipeline on a raw request body
    pub async fn execute(&self, body: &[u8]) -> TicketResult<PurchaseTicketOutput> {
        self.execute_at(body, Utc::now()).await
    }

    /// Run the pipeline with an explicit clock
    pub async fn execute_at(
        &self,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> TicketResult<PurchaseTicketOutput> {
        let purchase_id = PurchaseId::new();
        let span = tracing::info_span!("purchase", %purchase_id);

        let result = self.run(purchase_id, body, now).instrument(span.clone()).await;

        if let Err(e) = &result {
            span.in_scope(|| {
                tracing::debug!(
                    stage = %PurchaseStage::Rejected,
                    reason = %e,
                    "Purchase rejected"
                );
            });
        }
        result
    }

    async fn run(
        &self,
        purchase_id: PurchaseId,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> TicketResult<PurchaseTicketOutput> {
        tracing::debug!(
            stage = %PurchaseStage::Received,
            bytes = body.len(),
            "Purchase received"
        );

        let request = PurchaseRequest::from_slice(body).map_err(TicketError::MalformedInput)?;
        let purchase = validate(&request, &self.config.card_expiry, now.date_naive())
            .map_err(TicketError::Validation)?;
        tracing::debug!(
            stage = %PurchaseStage::Validated,
            gig = %purchase.item_reference,
            "Purchase validated"
        );

        let timeout = self.config.catalog_timeout;
        let lookup = self.gig_repo.find_by_slug(&purchase.item_reference);
        let gig = tokio::time::timeout(timeout, lookup)
            .await
            .map_err(|_| TicketError::CatalogTimeout(timeout))??
            .ok_or_else(|| TicketError::GigNotFound(purchase.item_reference.clone()))?;
        tracing::debug!(stage = %PurchaseStage::ItemConfirmed, gig = %gig.slug, "Gig confirmed");

        let ticket_number = self.sequence.next_ticket_number().await?;
        let token = self
            .issuer
            .issue_at(&purchase, gig.starts_at(), ticket_number, now)?;
        tracing::debug!(
            stage = %PurchaseStage::Issued,
            ticket_number = %ticket_number,
            not_before = %token.not_before(),
            expires_at = %token.expires_at(),
            "Token issued"
        );

        let code = encode_qr(token.as_str().as_bytes())?;
        let ticket = assemble(
            &code,
            &TicketDetails {
                ticket_number,
                holder_name: purchase.buyer_name.clone(),
                band_name: gig.band_name.clone(),
                venue: gig.venue.clone(),
                city: gig.city.clone(),
                event_date: gig.date,
                valid_from: token.not_before(),
                valid_until: token.expires_at(),
            },
        );
        tracing::debug!(stage = %PurchaseStage::Assembled, "Ticket assembled");

        tracing::info!(
            gig = %gig.slug,
            ticket_number = %ticket_number,
            card = %purchase.card.number.last_four(),
            "Ticket purchased"
        );

        Ok(PurchaseTicketOutput {
            purchase_id,
            ticket_number,
            token,
            code,
            ticket,
        })
    }
}
