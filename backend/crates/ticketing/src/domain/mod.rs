//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Gig)
//! - Value objects (Email, CardNumber, CardExpiry, TicketNumber)
//! - The purchase request validator
//! - Token issuance and verification
//! - Ticket document assembly
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod ticket;
pub mod token;
pub mod validation;
pub mod value_objects;
