//! PostgreSQL Repository Implementations

use crate::domain::entities::Gig;
use crate::domain::repository::{AllocationError, GigRepository, TicketSequence};
use crate::domain::value_objects::TicketNumber;
use crate::error::TicketResult;
use chrono::NaiveDate;
use sqlx::PgPool;

/// PostgreSQL-backed repository
#[derive(Clone)]
pub struct PgTicketingRepository {
    pool: PgPool,
}

impl PgTicketingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl GigRepository for PgTicketingRepository {
    async fn find_by_slug(&self, slug: &str) -> TicketResult<Option<Gig>> {
        let row = sqlx::query_as::<_, GigRow>(
            r#"
            SELECT slug, band_name, city, venue, date, price, description,
                   image, collection_point, collection_time, capacity
            FROM gigs
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GigRow::into_gig))
    }

    async fn list(&self) -> TicketResult<Vec<Gig>> {
        let rows = sqlx::query_as::<_, GigRow>(
            r#"
            SELECT slug, band_name, city, venue, date, price, description,
                   image, collection_point, collection_time, capacity
            FROM gigs
            ORDER BY date, slug
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(GigRow::into_gig).collect())
    }
}

impl TicketSequence for PgTicketingRepository {
    async fn next_ticket_number(&self) -> Result<TicketNumber, AllocationError> {
        let (value,) = sqlx::query_as::<_, (i64,)>("SELECT nextval('ticket_number_seq')")
            .fetch_one(&self.pool)
            .await?;

        u64::try_from(value)
            .ok()
            .filter(|n| *n > 0)
            .map(TicketNumber::new)
            .ok_or(AllocationError::InvalidValue(value))
    }
}

// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct GigRow {
    slug: String,
    band_name: String,
    city: String,
    venue: String,
    date: NaiveDate,
    price: i32,
    description: String,
    image: String,
    collection_point: String,
    collection_time: String,
    capacity: i32,
}

impl GigRow {
    fn into_gig(self) -> Gig {
        Gig {
            slug: self.slug,
            band_name: self.band_name,
            city: self.city,
            venue: self.venue,
            date: self.date,
            price: self.price,
            description: self.description,
            image: self.image,
            collection_point: self.collection_point,
            collection_time: self.collection_time,
            capacity: self.capacity,
        }
    }
}
