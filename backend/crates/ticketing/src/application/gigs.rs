//! Gig Catalog Queries

use crate::domain::entities::Gig;
use crate::domain::repository::GigRepository;
use crate::error::{TicketError, TicketResult};
use std::sync::Arc;

/// Read-only catalog use case
pub struct GigCatalogUseCase<G>
where
    G: GigRepository,
{
    gig_repo: Arc<G>,
}

impl<G> GigCatalogUseCase<G>
where
    G: GigRepository,
{
    pub fn new(gig_repo: Arc<G>) -> Self {
        Self { gig_repo }
    }

    pub async fn list(&self) -> TicketResult<Vec<Gig>> {
        self.gig_repo.list().await
    }

    pub async fn get(&self, slug: &str) -> TicketResult<Gig> {
        self.gig_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| TicketError::GigNotFound(slug.to_string()))
    }
}
