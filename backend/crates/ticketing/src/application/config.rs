//! Application Configuration
//!
//! Configuration for the ticketing application layer.

use crate::domain::validation::CardExpiryPolicy;
use chrono::Utc;
use std::time::Duration;

/// Years past the current one a card may expire in
pub const CARD_EXPIRY_YEARS_AHEAD: u16 = 10;

/// Ticketing application configuration
#[derive(Debug, Clone)]
pub struct TicketingConfig {
    /// Length of a ticket's validity window, starting at the event start
    pub validity_window: Duration,
    /// Upper bound for a single catalog lookup
    pub catalog_timeout: Duration,
    /// Accepted card expiry years
    pub card_expiry: CardExpiryPolicy,
}

impl Default for TicketingConfig {
    fn default() -> Self {
        Self {
            validity_window: Duration::from_secs(24 * 60 * 60),
            catalog_timeout: Duration::from_secs(3),
            card_expiry: CardExpiryPolicy::starting(
                Utc::now().date_naive(),
                CARD_EXPIRY_YEARS_AHEAD,
            ),
        }
    }
}

impl TicketingConfig {
    /// Create config for development (patient catalog lookups)
    pub fn development() -> Self {
        Self {
            catalog_timeout: Duration::from_secs(10),
            ..Default::default()
        }
    }

    pub fn with_card_expiry(self, card_expiry: CardExpiryPolicy) -> Self {
        Self {
            card_expiry,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_defaults() {
        let config = TicketingConfig::default();
        assert_eq!(config.validity_window, Duration::from_secs(86_400));
        assert_eq!(config.catalog_timeout, Duration::from_secs(3));

        let year = Utc::now().year();
        assert_eq!(config.card_expiry.min_year(), year);
        assert_eq!(config.card_expiry.max_year(), year + 10);
    }

    #[test]
    fn test_with_card_expiry() {
        let policy = CardExpiryPolicy::new(2000, 2001).unwrap();
        let config = TicketingConfig::development().with_card_expiry(policy);
        assert_eq!(config.card_expiry, policy);
        assert_eq!(config.catalog_timeout, Duration::from_secs(10));
    }
}
