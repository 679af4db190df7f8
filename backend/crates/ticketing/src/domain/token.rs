//! Proof-of-Purchase Tokens
//!
//! A ticket token is a compact JWS signed with Ed25519:
//! `base64url(header).base64url(claims).base64url(signature)`.
//!
//! ## Validity
//! - `nbf` is the event start, `exp` is `nbf` + the validity window
//! - A token is valid iff the signature verifies and `nbf <= now < exp`
//! - `jti` is the ticket number, so no two tokens share it

use crate::domain::validation::AcceptedPurchase;
use crate::domain::value_objects::TicketNumber;
use chrono::{DateTime, TimeDelta, Utc};
use ed25519_dalek::{Signature, Signer};
use platform::crypto::{SigningKey, VerifyingKey, from_base64url, key_id, to_base64url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Only JOSE header ever issued
const HEADER_JSON: &str = r#"{"alg":"EdDSA","typ":"JWT"}"#;
pub const ALGORITHM: &str = "EdDSA";

/// Claim set carried by a ticket token (timestamps in Unix seconds)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketClaims {
    /// Ticket holder
    pub sub: String,
    /// Gig slug
    pub aud: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    /// Ticket number
    pub jti: u64,
}

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("validity window must be at least one second")]
    EmptyValidityWindow,

    #[error("validity window overflows the token timestamps")]
    ValidityWindowOverflow,

    #[error("failed to serialize claims: {0}")]
    Claims(#[from] serde_json::Error),

    #[error("signature primitive rejected the input: {0}")]
    Primitive(#[from] ed25519_dalek::SignatureError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenVerificationError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not verify")]
    BadSignature,

    #[error("token is not valid yet")]
    NotYetValid,

    #[error("token has expired")]
    Expired,
}

/// Signed, immutable ticket token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    claims: TicketClaims,
    compact: String,
    not_before: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl SignedToken {
    /// Compact serialization, the payload of the QR code
    pub fn as_str(&self) -> &str {
        &self.compact
    }

    pub fn claims(&self) -> &TicketClaims {
        &self.claims
    }

    pub fn signature_segment(&self) -> &str {
        self.compact
            .rsplit_once('.')
            .map_or("", |(_, signature)| signature)
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// Issues ticket tokens with a signing key loaded once at start-up
pub struct TicketIssuer {
    signing_key: SigningKey,
    validity_window: Duration,
}

impl TicketIssuer {
    pub fn new(signing_key: SigningKey, validity_window: Duration) -> Self {
        Self {
            signing_key,
            validity_window,
        }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn key_id(&self) -> String {
        key_id(&self.verifying_key())
    }

    pub fn validity_window(&self) -> Duration {
        self.validity_window
    }

    /// Issue a token for an accepted purchase, stamped with the current time
    pub fn issue(
        &self,
        purchase: &AcceptedPurchase,
        event_start: DateTime<Utc>,
        ticket_number: TicketNumber,
    ) -> Result<SignedToken, SigningError> {
        self.issue_at(purchase, event_start, ticket_number, Utc::now())
    }

    pub fn issue_at(
        &self,
        purchase: &AcceptedPurchase,
        event_start: DateTime<Utc>,
        ticket_number: TicketNumber,
        issued_at: DateTime<Utc>,
    ) -> Result<SignedToken, SigningError> {
        if self.validity_window.as_secs() == 0 {
            return Err(SigningError::EmptyValidityWindow);
        }
        let window = TimeDelta::from_std(self.validity_window)
            .map_err(|_| SigningError::ValidityWindowOverflow)?;
        let expires_at = event_start
            .checked_add_signed(window)
            .ok_or(SigningError::ValidityWindowOverflow)?;

        let claims = TicketClaims {
            sub: purchase.buyer_name.clone(),
            aud: purchase.item_reference.clone(),
            iat: issued_at.timestamp(),
            nbf: event_start.timestamp(),
            exp: expires_at.timestamp(),
            jti: ticket_number.value(),
        };

        let signing_input = format!(
            "{}.{}",
            to_base64url(HEADER_JSON.as_bytes()),
            to_base64url(&serde_json::to_vec(&claims)?)
        );
        let signature = self.signing_key.try_sign(signing_input.as_bytes())?;
        let compact = format!("{}.{}", signing_input, to_base64url(&signature.to_bytes()));

        Ok(SignedToken {
            claims,
            compact,
            not_before: event_start,
            expires_at,
        })
    }
}

/// Verify a compact ticket token against a public key at time `now`
pub fn verify_token(
    token: &str,
    key: &VerifyingKey,
    now: DateTime<Utc>,
) -> Result<TicketClaims, TokenVerificationError> {
    use TokenVerificationError::*;

    let (signing_input, signature_b64) = token.rsplit_once('.').ok_or(Malformed)?;
    let (header_b64, claims_b64) = signing_input.split_once('.').ok_or(Malformed)?;
    if claims_b64.contains('.') {
        return Err(Malformed);
    }

    let header: serde_json::Value = from_base64url(header_b64)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .ok_or(Malformed)?;
    if header.get("alg").and_then(|alg| alg.as_str()) != Some(ALGORITHM) {
        return Err(Malformed);
    }

    let signature = from_base64url(signature_b64)
        .ok()
        .and_then(|bytes| Signature::from_slice(&bytes).ok())
        .ok_or(Malformed)?;
    key.verify_strict(signing_input.as_bytes(), &signature)
        .map_err(|_| BadSignature)?;

    let claims: TicketClaims = from_base64url(claims_b64)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .ok_or(Malformed)?;

    let now = now.timestamp();
    if now < claims.nbf {
        return Err(NotYetValid);
    }
    if now >= claims.exp {
        return Err(Expired);
    }

    Ok(claims)
}
