//! Purchase Request Validator
//!
//! Pure check of an untrusted purchase request. Every field rule runs, so a
//! rejected request reports all of its failures at once, in field order.

use crate::domain::value_objects::{CardExpiry, CardNumber, Email, SecurityCode};
use chrono::{Datelike, NaiveDate};
use kernel::validation::FieldError;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

/// Canonical wire names, used as the `field` of every error
pub mod fields {
    pub const ITEM_REFERENCE: &str = "itemReference";
    pub const BUYER_NAME: &str = "buyerName";
    pub const BUYER_EMAIL: &str = "buyerEmail";
    pub const CARD_NUMBER: &str = "cardNumber";
    pub const CARD_EXPIRY_MONTH: &str = "cardExpiryMonth";
    pub const CARD_EXPIRY_YEAR: &str = "cardExpiryYear";
    pub const CARD_SECURITY_CODE: &str = "cardSecurityCode";
    pub const DISCLAIMER_ACCEPTED: &str = "disclaimerAccepted";
}

/// Short names posted by the legacy purchase form
pub mod aliases {
    pub const GIG: &str = "gig";
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const CARD_CVC: &str = "cardCVC";
}

/// Longest `itemReference` or `buyerName`, in characters. Both end up in the
/// token, and the largest token must still fit one QR code.
pub const TEXT_MAX_CHARS: usize = 128;

const MUST_BE_STRING: &str = "field must be a string";
const TOO_LONG: &str = "field must be at most 128 characters";
const CONTROL_CHARACTERS: &str = "field must not contain control characters";
const CONFLICTING_NAMES: &str = "field is given under more than one name";
const INVALID_EMAIL: &str = "field is not a valid email";
const INVALID_CARD_NUMBER: &str = "field is not a valid credit card number";
const INVALID_MONTH: &str = "field must be an integer in range [1,12]";
const CARD_EXPIRED: &str = "card has expired";
const INVALID_SECURITY_CODE: &str = "field must be a valid security code";
const MUST_BE_TRUE: &str = "field must be true";

/// One request field, as posted
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RawField {
    #[default]
    Absent,
    Given(Value),
    /// Canonical name and alias both posted, with different values
    Conflicting,
}

impl RawField {
    fn take(object: &mut Map<String, Value>, name: &str, alias: Option<&str>) -> Self {
        let canonical = object.remove(name);
        let legacy = alias.and_then(|alias| object.remove(alias));
        match (canonical, legacy) {
            (Some(a), Some(b)) if a != b => RawField::Conflicting,
            (Some(value), _) | (None, Some(value)) => RawField::Given(value),
            (None, None) => RawField::Absent,
        }
    }

    fn as_given(&self) -> Option<&Value> {
        match self {
            RawField::Given(value) => Some(value),
            _ => None,
        }
    }
}

/// Untrusted purchase request body
///
/// Fields stay raw JSON so that a wrong type is reported per field instead
/// of failing the whole body. The legacy short names in [`aliases`] are
/// accepted too; posting both names of one field with different values is a
/// field error. Unknown keys are ignored.
#[derive(Clone, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct PurchaseRequest {
    pub item_reference: RawField,
    pub buyer_name: RawField,
    pub buyer_email: RawField,
    pub card_number: RawField,
    pub card_expiry_month: RawField,
    pub card_expiry_year: RawField,
    pub card_security_code: RawField,
    pub disclaimer_accepted: RawField,
}

impl PurchaseRequest {
    /// Parse a request body. Anything but a JSON object is rejected.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

impl From<Map<String, Value>> for PurchaseRequest {
    fn from(mut object: Map<String, Value>) -> Self {
        let object = &mut object;
        Self {
            item_reference: RawField::take(object, fields::ITEM_REFERENCE, Some(aliases::GIG)),
            buyer_name: RawField::take(object, fields::BUYER_NAME, Some(aliases::NAME)),
            buyer_email: RawField::take(object, fields::BUYER_EMAIL, Some(aliases::EMAIL)),
            card_number: RawField::take(object, fields::CARD_NUMBER, None),
            card_expiry_month: RawField::take(object, fields::CARD_EXPIRY_MONTH, None),
            card_expiry_year: RawField::take(object, fields::CARD_EXPIRY_YEAR, None),
            card_security_code: RawField::take(
                object,
                fields::CARD_SECURITY_CODE,
                Some(aliases::CARD_CVC),
            ),
            disclaimer_accepted: RawField::take(object, fields::DISCLAIMER_ACCEPTED, None),
        }
    }
}

// Card data must never reach the logs
impl fmt::Debug for PurchaseRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PurchaseRequest")
            .field("item_reference", &self.item_reference)
            .field("buyer_name", &self.buyer_name)
            .field("buyer_email", &self.buyer_email)
            .field("card_number", &"[REDACTED]")
            .field("card_expiry_month", &self.card_expiry_month)
            .field("card_expiry_year", &self.card_expiry_year)
            .field("card_security_code", &"[REDACTED]")
            .field("disclaimer_accepted", &self.disclaimer_accepted)
            .finish()
    }
}

/// Accepted range of card expiry years (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardExpiryPolicy {
    min_year: i32,
    max_year: i32,
}

impl CardExpiryPolicy {
    pub fn new(min_year: i32, max_year: i32) -> Option<Self> {
        (min_year <= max_year).then_some(Self { min_year, max_year })
    }

    /// `[today's year, today's year + years_ahead]`
    pub fn starting(today: NaiveDate, years_ahead: u16) -> Self {
        let min_year = today.year();
        Self {
            min_year,
            max_year: min_year.saturating_add(i32::from(years_ahead)),
        }
    }

    pub fn min_year(&self) -> i32 {
        self.min_year
    }

    pub fn max_year(&self) -> i32 {
        self.max_year
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min_year..=self.max_year).contains(&year)
    }

    fn range_message(&self) -> String {
        format!(
            "field must be an integer in range [{},{}]",
            self.min_year, self.max_year
        )
    }
}

/// Payment details of an accepted purchase (never charged here)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCard {
    pub number: CardNumber,
    pub expiry: CardExpiry,
    pub security_code: SecurityCode,
}

/// A purchase request that passed every field rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedPurchase {
    pub item_reference: String,
    pub buyer_name: String,
    pub buyer_email: Email,
    pub card: PaymentCard,
}

/// Validate a purchase request against the field rules
///
/// Existence of the referenced gig is not checked here.
pub fn validate(
    request: &PurchaseRequest,
    policy: &CardExpiryPolicy,
    today: NaiveDate,
) -> Result<AcceptedPurchase, Vec<FieldError>> {
    let mut errors = Vec::new();

    let item_reference = check(
        &mut errors,
        fields::ITEM_REFERENCE,
        &request.item_reference,
        bounded_text,
    );

    let buyer_name = check(
        &mut errors,
        fields::BUYER_NAME,
        &request.buyer_name,
        bounded_text,
    );

    let buyer_email = check(
        &mut errors,
        fields::BUYER_EMAIL,
        &request.buyer_email,
        |v| v.as_str().and_then(Email::parse).ok_or(INVALID_EMAIL.into()),
    );

    let card_number = check(
        &mut errors,
        fields::CARD_NUMBER,
        &request.card_number,
        |v| {
            v.as_str()
                .and_then(CardNumber::parse)
                .ok_or(INVALID_CARD_NUMBER.into())
        },
    );

    let month = check(
        &mut errors,
        fields::CARD_EXPIRY_MONTH,
        &request.card_expiry_month,
        |v| {
            as_integer(v)
                .and_then(|m| u32::try_from(m).ok())
                .filter(|m| (1..=12).contains(m))
                .ok_or(INVALID_MONTH.into())
        },
    );

    let expiry = check(
        &mut errors,
        fields::CARD_EXPIRY_YEAR,
        &request.card_expiry_year,
        |v| {
            let year = as_integer(v)
                .and_then(|y| i32::try_from(y).ok())
                .filter(|y| policy.contains(*y))
                .ok_or_else(|| Cow::Owned(policy.range_message()))?;

            match month.and_then(|m| CardExpiry::new(m, year)) {
                Some(expiry) if expiry.has_expired(today) => Err(CARD_EXPIRED.into()),
                // A bad month is reported on the month field only
                other => Ok(other),
            }
        },
    );

    let security_code = check(
        &mut errors,
        fields::CARD_SECURITY_CODE,
        &request.card_security_code,
        |v| {
            let raw = match v {
                Value::String(s) => Cow::Borrowed(s.as_str()),
                Value::Number(n) => match n.as_u64() {
                    Some(n) => Cow::Owned(n.to_string()),
                    None => return Err(INVALID_SECURITY_CODE.into()),
                },
                _ => return Err(INVALID_SECURITY_CODE.into()),
            };
            SecurityCode::parse(&raw).ok_or(INVALID_SECURITY_CODE.into())
        },
    );

    let disclaimer = check(
        &mut errors,
        fields::DISCLAIMER_ACCEPTED,
        &request.disclaimer_accepted,
        |v| match v {
            Value::Bool(true) => Ok(()),
            _ => Err(MUST_BE_TRUE.into()),
        },
    );

    // Every `None` above has pushed its error
    let (
        Some(item_reference),
        Some(buyer_name),
        Some(buyer_email),
        Some(number),
        Some(Some(expiry)),
        Some(security_code),
        Some(()),
    ) = (
        item_reference,
        buyer_name,
        buyer_email,
        card_number,
        expiry,
        security_code,
        disclaimer,
    )
    else {
        return Err(errors);
    };

    Ok(AcceptedPurchase {
        item_reference,
        buyer_name,
        buyer_email,
        card: PaymentCard {
            number,
            expiry,
            security_code,
        },
    })
}

/// Run one field rule. Missing (absent, null, blank string) wins over invalid.
fn check<T>(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &RawField,
    rule: impl FnOnce(&Value) -> Result<T, Cow<'static, str>>,
) -> Option<T> {
    if matches!(value, RawField::Conflicting) {
        errors.push(FieldError::new(field, CONFLICTING_NAMES));
        return None;
    }
    let Some(value) = value.as_given().filter(|v| !is_blank(v)) else {
        errors.push(FieldError::mandatory(field));
        return None;
    };

    match rule(value) {
        Ok(parsed) => Some(parsed),
        Err(message) => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Trimmed single-line string of at most [`TEXT_MAX_CHARS`] characters
fn bounded_text(value: &Value) -> Result<String, Cow<'static, str>> {
    let text = value.as_str().ok_or(MUST_BE_STRING)?.trim();
    if text.chars().count() > TEXT_MAX_CHARS {
        return Err(TOO_LONG.into());
    }
    if text.chars().any(char::is_control) {
        return Err(CONTROL_CHARACTERS.into());
    }
    Ok(text.to_string())
}

/// JSON integer, or a string of ASCII digits
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => {
            let s = s.trim();
            if s.bytes().all(|b| b.is_ascii_digit()) {
                s.parse().ok()
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn policy() -> CardExpiryPolicy {
        CardExpiryPolicy::new(2024, 2034).unwrap()
    }

    fn valid_body() -> Value {
        json!({
            "itemReference": "band1-location1",
            "buyerName": "Ada Lovelace",
            "buyerEmail": "ada@example.com",
            "cardNumber": "4111111111111111",
            "cardExpiryMonth": 12,
            "cardExpiryYear": 2024,
            "cardSecurityCode": "123",
            "disclaimerAccepted": true
        })
    }

    fn run(body: Value) -> Result<AcceptedPurchase, Vec<FieldError>> {
        let request: PurchaseRequest = serde_json::from_value(body).unwrap();
        validate(&request, &policy(), today())
    }

    fn errors_of(body: Value) -> Vec<(String, String)> {
        run(body)
            .unwrap_err()
            .into_iter()
            .map(|e| (e.field().to_string(), e.message().to_string()))
            .collect()
    }

    fn with(field: &str, value: Value) -> Value {
        let mut body = valid_body();
        body[field] = value;
        body
    }

    #[test]
    fn test_valid_request_is_accepted() {
        let accepted = run(valid_body()).unwrap();
        assert_eq!(accepted.item_reference, "band1-location1");
        assert_eq!(accepted.buyer_name, "Ada Lovelace");
        assert_eq!(accepted.buyer_email.as_str(), "ada@example.com");
        assert_eq!(accepted.card.expiry.month(), 12);
        assert_eq!(accepted.card.expiry.year(), 2024);
        assert_eq!(accepted.card.number.last_four(), "1111");
    }

    #[test]
    fn test_empty_request_reports_every_field_in_order() {
        let errors = errors_of(json!({}));
        let fields: Vec<&str> = errors.iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                fields::ITEM_REFERENCE,
                fields::BUYER_NAME,
                fields::BUYER_EMAIL,
                fields::CARD_NUMBER,
                fields::CARD_EXPIRY_MONTH,
                fields::CARD_EXPIRY_YEAR,
                fields::CARD_SECURITY_CODE,
                fields::DISCLAIMER_ACCEPTED,
            ]
        );
        assert!(errors.iter().all(|(_, m)| m == "field is mandatory"));
    }

    #[test]
    fn test_missing_fields_yield_one_error_each() {
        let mut body = valid_body();
        let object = body.as_object_mut().unwrap();
        object.remove("buyerName");
        object.remove("cardNumber");
        object.insert("disclaimerAccepted".into(), Value::Null);

        let errors = errors_of(body);
        assert_eq!(
            errors,
            vec![
                ("buyerName".into(), "field is mandatory".into()),
                ("cardNumber".into(), "field is mandatory".into()),
                ("disclaimerAccepted".into(), "field is mandatory".into()),
            ]
        );
    }

    #[test]
    fn test_blank_string_counts_as_missing() {
        let errors = errors_of(with("buyerName", json!("   ")));
        assert_eq!(
            errors,
            vec![("buyerName".into(), "field is mandatory".into())]
        );
    }

    #[test]
    fn test_wrong_types_are_field_errors() {
        let errors = errors_of(with("buyerName", json!(42)));
        assert_eq!(
            errors,
            vec![("buyerName".into(), "field must be a string".into())]
        );

        let errors = errors_of(with("itemReference", json!(["band1"])));
        assert_eq!(
            errors,
            vec![("itemReference".into(), "field must be a string".into())]
        );
    }

    #[test]
    fn test_invalid_email() {
        let errors = errors_of(with("buyerEmail", json!("not-an-email")));
        assert_eq!(
            errors,
            vec![("buyerEmail".into(), "field is not a valid email".into())]
        );
    }

    #[test]
    fn test_luhn_check_on_card_number() {
        assert!(run(with("cardNumber", json!("4111111111111111"))).is_ok());

        let errors = errors_of(with("cardNumber", json!("4111111111111112")));
        assert_eq!(
            errors,
            vec![(
                "cardNumber".into(),
                "field is not a valid credit card number".into()
            )]
        );
    }

    #[test]
    fn test_month_out_of_range() {
        for month in [json!(13), json!(0), json!(-1), json!("13"), json!(1.5)] {
            let errors = errors_of(with("cardExpiryMonth", month));
            assert_eq!(
                errors,
                vec![(
                    "cardExpiryMonth".into(),
                    "field must be an integer in range [1,12]".into()
                )]
            );
        }
    }

    #[test]
    fn test_month_and_year_accept_digit_strings() {
        let mut body = with("cardExpiryMonth", json!("07"));
        body["cardExpiryYear"] = json!("2026");
        let accepted = run(body).unwrap();
        assert_eq!(accepted.card.expiry.month(), 7);
        assert_eq!(accepted.card.expiry.year(), 2026);
    }

    #[test]
    fn test_year_outside_policy() {
        let errors = errors_of(with("cardExpiryYear", json!(2035)));
        assert_eq!(
            errors,
            vec![(
                "cardExpiryYear".into(),
                "field must be an integer in range [2024,2034]".into()
            )]
        );
    }

    #[test]
    fn test_expired_card() {
        let mut body = with("cardExpiryMonth", json!(5));
        body["cardExpiryYear"] = json!(2024);
        let errors = errors_of(body);
        assert_eq!(
            errors,
            vec![("cardExpiryYear".into(), "card has expired".into())]
        );

        // Current month is still valid
        let mut body = with("cardExpiryMonth", json!(6));
        body["cardExpiryYear"] = json!(2024);
        assert!(run(body).is_ok());
    }

    #[test]
    fn test_invalid_month_does_not_also_fail_year() {
        let mut body = with("cardExpiryMonth", json!(13));
        body["cardExpiryYear"] = json!(2024);
        let errors = errors_of(body);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "cardExpiryMonth");
    }

    #[test]
    fn test_security_code() {
        assert!(run(with("cardSecurityCode", json!("0123"))).is_ok());
        assert!(run(with("cardSecurityCode", json!(123))).is_ok());

        for code in [json!("12"), json!("12345"), json!("12a"), json!(true)] {
            let errors = errors_of(with("cardSecurityCode", code));
            assert_eq!(
                errors,
                vec![(
                    "cardSecurityCode".into(),
                    "field must be a valid security code".into()
                )]
            );
        }
    }

    #[test]
    fn test_disclaimer_must_be_boolean_true() {
        let errors = errors_of(with("disclaimerAccepted", json!("true")));
        assert_eq!(
            errors,
            vec![("disclaimerAccepted".into(), "field must be true".into())]
        );

        let errors = errors_of(with("disclaimerAccepted", json!(false)));
        assert_eq!(
            errors,
            vec![("disclaimerAccepted".into(), "field must be true".into())]
        );

        assert!(run(with("disclaimerAccepted", json!(true))).is_ok());
    }

    #[test]
    fn test_legacy_field_names() {
        let body = json!({
            "gig": "band1-location1",
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "cardNumber": "4111 1111 1111 1111",
            "cardExpiryMonth": 12,
            "cardExpiryYear": 2030,
            "cardCVC": "123",
            "disclaimerAccepted": true
        });
        let accepted = run(body).unwrap();
        assert_eq!(accepted.item_reference, "band1-location1");
    }

    #[test]
    fn test_text_fields_are_bounded() {
        let longest = "\u{1D11E}".repeat(TEXT_MAX_CHARS);
        let accepted = run(with("buyerName", json!(format!("  {longest}  ")))).unwrap();
        assert_eq!(accepted.buyer_name, longest);

        let too_long = "x".repeat(TEXT_MAX_CHARS + 1);
        let mut body = with("buyerName", json!(too_long));
        body["itemReference"] = json!(too_long);
        assert_eq!(
            errors_of(body),
            vec![
                ("itemReference".into(), "field must be at most 128 characters".into()),
                ("buyerName".into(), "field must be at most 128 characters".into()),
            ]
        );
    }

    #[test]
    fn test_control_characters_are_rejected() {
        let errors = errors_of(with("buyerName", json!("Ada\nLovelace")));
        assert_eq!(
            errors,
            vec![(
                "buyerName".into(),
                "field must not contain control characters".into()
            )]
        );
        assert!(run(with("itemReference", json!("band1\u{0}"))).is_err());
    }

    #[test]
    fn test_canonical_name_and_alias_must_agree() {
        let mut body = valid_body();
        body["gig"] = json!("band2-location2");
        body["cardCVC"] = json!("123");
        let errors = errors_of(body);
        assert_eq!(
            errors,
            vec![(
                "itemReference".into(),
                "field is given under more than one name".into()
            )]
        );

        // Same value under both names is not a conflict
        let mut body = valid_body();
        body["name"] = json!("Ada Lovelace");
        assert!(run(body).is_ok());
    }

    #[test]
    fn test_from_slice_rejects_non_objects() {
        assert!(PurchaseRequest::from_slice(b"[1, 2]").is_err());
        assert!(PurchaseRequest::from_slice(b"\"text\"").is_err());
        assert!(PurchaseRequest::from_slice(b"{not json").is_err());
        assert!(PurchaseRequest::from_slice(b"{}").is_ok());
    }

    #[test]
    fn test_debug_redacts_card_data() {
        let request: PurchaseRequest = serde_json::from_value(valid_body()).unwrap();
        let debug = format!("{:?}", request);
        assert!(!debug.contains("4111111111111111"));
        assert!(!debug.contains("\"123\""));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_policy() {
        assert!(CardExpiryPolicy::new(2030, 2020).is_none());
        let policy = CardExpiryPolicy::starting(today(), 10);
        assert_eq!(policy.min_year(), 2024);
        assert_eq!(policy.max_year(), 2034);
        assert!(policy.contains(2034));
        assert!(!policy.contains(2023));
    }
}
