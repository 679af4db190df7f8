//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Ed25519 key loading and generation, key ids
//! - Base64url and SHA-256 helpers for compact signed tokens
//! - QR code encoding to SVG

pub mod crypto;
pub mod qr;
