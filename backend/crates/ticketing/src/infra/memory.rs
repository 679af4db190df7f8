//! In-Memory Repository Implementations
//!
//! Used when no database is configured, and by tests.

use crate::domain::entities::Gig;
use crate::domain::repository::{AllocationError, GigRepository, TicketSequence};
use crate::domain::value_objects::TicketNumber;
use crate::error::TicketResult;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

const MOCK_GIG_COUNT: u32 = 12;

/// In-memory catalog plus an atomic ticket counter
#[derive(Debug, Clone)]
pub struct InMemoryTicketingRepository {
    gigs: Arc<BTreeMap<String, Gig>>,
    next_ticket_number: Arc<AtomicU64>,
}

impl InMemoryTicketingRepository {
    pub fn new(gigs: impl IntoIterator<Item = Gig>) -> Self {
        let gigs = gigs
            .into_iter()
            .map(|gig| (gig.slug.clone(), gig))
            .collect();
        Self {
            gigs: Arc::new(gigs),
            next_ticket_number: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Catalog of twelve mock gigs, `band0-location0` to `band11-location11`
    pub fn with_mock_gigs() -> Self {
        Self::new(mock_gigs())
    }

    /// Start the ticket counter at `next`
    pub fn with_next_ticket_number(self, next: u64) -> Self {
        Self {
            next_ticket_number: Arc::new(AtomicU64::new(next)),
            ..self
        }
    }
}

impl GigRepository for InMemoryTicketingRepository {
    async fn find_by_slug(&self, slug: &str) -> TicketResult<Option<Gig>> {
        Ok(self.gigs.get(slug).cloned())
    }

    async fn list(&self) -> TicketResult<Vec<Gig>> {
        let mut gigs: Vec<Gig> = self.gigs.values().cloned().collect();
        gigs.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.slug.cmp(&b.slug)));
        Ok(gigs)
    }
}

impl TicketSequence for InMemoryTicketingRepository {
    async fn next_ticket_number(&self) -> Result<TicketNumber, AllocationError> {
        self.next_ticket_number
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .map(TicketNumber::new)
            .map_err(|_| AllocationError::Exhausted)
    }
}

fn mock_gigs() -> Vec<Gig> {
    (0..MOCK_GIG_COUNT)
        .filter_map(|i| {
            let date = NaiveDate::from_ymd_opt(2027, i + 1, 1)?;
            Some(Gig {
                slug: format!("band{i}-location{i}"),
                band_name: format!("Mock Band {i}"),
                city: format!("Mock City {i}"),
                venue: format!("Mock Venue {i}"),
                date,
                price: 1010,
                description: format!("Mock description {i}"),
                image: "band-placeholder.png".to_string(),
                collection_point: "New York, NY 10001, USA".to_string(),
                collection_time: "14:30".to_string(),
                capacity: 3000,
            })
        })
        .collect()
}
