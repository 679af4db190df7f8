//! API DTOs (Data Transfer Objects)

use crate::domain::entities::Gig;
use chrono::NaiveDate;
use serde::Serialize;

/// Response for POST /api/purchase
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseResponse {
    pub success: bool,
}

/// Response for GET /api/tickets/public-key
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyResponse {
    pub algorithm: &'static str,
    pub key_id: String,
    /// Raw 32-byte Ed25519 key, base64url
    pub public_key: String,
}

/// A gig as served by GET /api/gigs and GET /api/gigs/{slug}
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GigResponse {
    pub slug: String,
    pub band_name: String,
    pub city: String,
    pub venue: String,
    pub date: NaiveDate,
    pub price: i32,
    pub description: String,
    pub image: String,
    pub collection_point: String,
    pub collection_time: String,
    pub capacity: i32,
}

impl From<Gig> for GigResponse {
    fn from(gig: Gig) -> Self {
        Self {
            slug: gig.slug,
            band_name: gig.band_name,
            city: gig.city,
            venue: gig.venue,
            date: gig.date,
            price: gig.price,
            description: gig.description,
            image: gig.image,
            collection_point: gig.collection_point,
            collection_time: gig.collection_time,
            capacity: gig.capacity,
        }
    }
}

/// Response for GET /api/gigs
#[derive(Debug, Clone, Serialize)]
pub struct GigListResponse {
    pub gigs: Vec<GigResponse>,
}
