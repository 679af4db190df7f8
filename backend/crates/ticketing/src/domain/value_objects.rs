//! Domain Value Objects
//!
//! Immutable, already-validated pieces of a purchase. Constructors return
//! `None` on invalid input; the validator turns that into a field error.

use chrono::{Datelike, NaiveDate};
use std::fmt;

// ============================================================================
// Email
// ============================================================================

/// Maximum email length (per RFC 5321)
const EMAIL_MAX_LENGTH: usize = 254;
const EMAIL_LOCAL_MAX_LENGTH: usize = 64;
const DOMAIN_LABEL_MAX_LENGTH: usize = 63;

/// Email address value object, stored lowercased
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Option<Self> {
        let email = raw.trim().to_lowercase();

        if email.is_empty() || email.len() > EMAIL_MAX_LENGTH {
            return None;
        }

        Self::is_valid_format(&email).then_some(Self(email))
    }

    fn is_valid_format(email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };

        // Local part: dot-atom
        if local.is_empty() || local.len() > EMAIL_LOCAL_MAX_LENGTH {
            return false;
        }
        if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
            return false;
        }
        if !local.chars().all(|c| c == '.' || is_atext(c)) {
            return false;
        }

        // Domain: at least two labels, alphabetic TLD
        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() < 2 || !labels.iter().all(|label| is_valid_label(label)) {
            return false;
        }

        labels
            .last()
            .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// RFC 5322 `atext`
fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~".contains(c)
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= DOMAIN_LABEL_MAX_LENGTH
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

// ============================================================================
// Card number
// ============================================================================

/// Payment card number (digits only, Luhn-valid)
///
/// `Debug` shows the last four digits only.
#[derive(Clone, PartialEq, Eq)]
pub struct CardNumber(String);

impl CardNumber {
    pub const MIN_DIGITS: usize = 12;
    pub const MAX_DIGITS: usize = 19;

    /// Parse a card number; spaces and hyphens between digit groups are ignored
    pub fn parse(raw: &str) -> Option<Self> {
        let digits: String = raw.chars().filter(|c| *c != ' ' && *c != '-').collect();

        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits.len()) {
            return None;
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        luhn_checksum_valid(&digits).then_some(Self(digits))
    }

    pub fn last_four(&self) -> &str {
        &self.0[self.0.len() - 4..]
    }
}

impl fmt::Debug for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardNumber(****{})", self.last_four())
    }
}

/// Mod-10 (Luhn) checksum over an ASCII digit string
fn luhn_checksum_valid(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

// ============================================================================
// Card expiry
// ============================================================================

/// Card expiry month/year. A card is usable through the end of its month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardExpiry {
    month: u32,
    year: i32,
}

impl CardExpiry {
    pub fn new(month: u32, year: i32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { month, year })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Whether the card expired before the month containing `today`
    pub fn has_expired(&self, today: NaiveDate) -> bool {
        (self.year, self.month) < (today.year(), today.month())
    }
}

// ============================================================================
// Security code
// ============================================================================

/// Card security code (3 or 4 digits). `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct SecurityCode(String);

impl SecurityCode {
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = (3..=4).contains(&raw.len()) && raw.bytes().all(|b| b.is_ascii_digit());
        valid.then(|| Self(raw.to_string()))
    }
}

impl fmt::Debug for SecurityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecurityCode(***)")
    }
}

// ============================================================================
// Ticket number
// ============================================================================

/// Ticket number handed out by the ticket sequence; doubles as the token `jti`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TicketNumber(u64);

impl TicketNumber {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_valid() {
        assert!(Email::parse("user@example.com").is_some());
        assert!(Email::parse("User@Example.COM").is_some());
        assert!(Email::parse("user.name@example.co.jp").is_some());
        assert!(Email::parse("user+tag@example.com").is_some());
        assert!(Email::parse("o'brien@mail-server.ie").is_some());
    }

    #[test]
    fn test_email_invalid() {
        assert!(Email::parse("").is_none());
        assert!(Email::parse("userexample.com").is_none());
        assert!(Email::parse("user@").is_none());
        assert!(Email::parse("@example.com").is_none());
        assert!(Email::parse("user@@example.com").is_none());
        assert!(Email::parse("user@example").is_none());
        assert!(Email::parse("user@example.c0m").is_none());
        assert!(Email::parse(".user@example.com").is_none());
        assert!(Email::parse("us..er@example.com").is_none());
        assert!(Email::parse("user@-example.com").is_none());
        assert!(Email::parse("user@exa mple.com").is_none());
        assert!(Email::parse("us er@example.com").is_none());
    }

    #[test]
    fn test_email_case_normalization() {
        let email = Email::parse("  User@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "user@example.com");
    }

    #[test]
    fn test_card_number_luhn() {
        assert!(CardNumber::parse("4111111111111111").is_some());
        assert!(CardNumber::parse("4111 1111 1111 1111").is_some());
        assert!(CardNumber::parse("4111-1111-1111-1111").is_some());
        assert!(CardNumber::parse("5500005555555559").is_some());
        assert!(CardNumber::parse("378282246310005").is_some());

        assert!(CardNumber::parse("4111111111111112").is_none());
        assert!(CardNumber::parse("4111111111111110").is_none());
    }

    #[test]
    fn test_card_number_length_and_charset() {
        // Luhn-valid but too short
        assert!(CardNumber::parse("0000000000").is_none());
        // 20 digits
        assert!(CardNumber::parse("00000000000000000000").is_none());
        assert!(CardNumber::parse("4111a11111111111").is_none());
        assert!(CardNumber::parse("").is_none());
    }

    #[test]
    fn test_card_number_debug_is_masked() {
        let card = CardNumber::parse("4111111111111111").unwrap();
        assert_eq!(format!("{:?}", card), "CardNumber(****1111)");
        assert_eq!(card.last_four(), "1111");
    }

    #[test]
    fn test_card_expiry() {
        assert!(CardExpiry::new(0, 2030).is_none());
        assert!(CardExpiry::new(13, 2030).is_none());

        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert!(!CardExpiry::new(6, 2024).unwrap().has_expired(today));
        assert!(!CardExpiry::new(1, 2025).unwrap().has_expired(today));
        assert!(CardExpiry::new(5, 2024).unwrap().has_expired(today));
        assert!(CardExpiry::new(12, 2023).unwrap().has_expired(today));
    }

    #[test]
    fn test_security_code() {
        assert!(SecurityCode::parse("123").is_some());
        assert!(SecurityCode::parse("0123").is_some());
        assert!(SecurityCode::parse("12").is_none());
        assert!(SecurityCode::parse("12345").is_none());
        assert!(SecurityCode::parse("12a").is_none());
        assert_eq!(
            format!("{:?}", SecurityCode::parse("999").unwrap()),
            "SecurityCode(***)"
        );
    }
}
