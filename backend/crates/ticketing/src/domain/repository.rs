//! Repository Traits
//!
//! Interfaces for data access. Implementations live in the infra layer.

use crate::domain::entities::Gig;
use crate::domain::value_objects::TicketNumber;
use crate::error::TicketResult;
use thiserror::Error;

/// Errors raised while allocating a ticket number
#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("ticket number sequence exhausted")]
    Exhausted,

    #[error("ticket number sequence returned invalid value {0}")]
    InvalidValue(i64),

    #[error("ticket number sequence unavailable: {0}")]
    Database(#[from] sqlx::Error),
}

/// Gig catalog (read only)
#[trait_variant::make(GigRepository: Send)]
pub trait LocalGigRepository {
    /// Find a gig by slug
    async fn find_by_slug(&self, slug: &str) -> TicketResult<Option<Gig>>;

    /// All gigs, ordered by date
    async fn list(&self) -> TicketResult<Vec<Gig>>;
}

/// Ticket number allocator. Numbers are unique, not gapless.
#[trait_variant::make(TicketSequence: Send)]
pub trait LocalTicketSequence {
    async fn next_ticket_number(&self) -> Result<TicketNumber, AllocationError>;
}
