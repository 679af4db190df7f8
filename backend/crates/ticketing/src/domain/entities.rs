//! Domain Entities
//!
//! Core business entities for the ticketing domain.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Gig entity - a concert tickets can be bought for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gig {
    /// Primary key, also the token audience
    pub slug: String,
    pub band_name: String,
    pub city: String,
    pub venue: String,
    pub date: NaiveDate,
    /// Whole euros
    pub price: i32,
    pub description: String,
    pub image: String,
    pub collection_point: String,
    pub collection_time: String,
    pub capacity: i32,
}

impl Gig {
    /// Start of the event: midnight UTC on the gig date
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.date.and_time(NaiveTime::MIN).and_utc()
    }
}
