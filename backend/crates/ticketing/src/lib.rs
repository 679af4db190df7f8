//! Ticketing Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Validator, token issuer, ticket assembler, repository traits
//! - `application/` - Use cases (purchase pipeline, catalog queries)
//! - `infra/` - PostgreSQL and in-memory implementations
//! - `presentation/` - HTTP handlers
//!
//! ## Security Model
//! - The request body is untrusted; it is validated field by field before any I/O
//! - Tickets are Ed25519-signed tokens, verifiable offline with the public key
//! - Card data is never logged and never stored
//! - Internal failures reach the client as a bare 500

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::TicketingConfig;
pub use domain::token::{TicketIssuer, verify_token};
pub use error::{TicketError, TicketResult};
pub use infra::memory::InMemoryTicketingRepository;
pub use infra::postgres::PgTicketingRepository;
pub use presentation::router::ticketing_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
