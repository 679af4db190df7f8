//! Field Validation Errors
//!
//! [`FieldError`] is the unit of a rejected request: one entry per failing
//! input field, reported to the client as `{field, message}`.

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// 入力フィールド単位の検証エラー
///
/// ## Examples
/// ```rust
/// use kernel::validation::FieldError;
///
/// let err = FieldError::new("buyerEmail", "field is not a valid email");
/// assert_eq!(err.field(), "buyerEmail");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    field: Cow<'static, str>,
    message: Cow<'static, str>,
}

impl FieldError {
    pub fn new(
        field: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 必須フィールドの欠落
    pub fn mandatory(field: impl Into<Cow<'static, str>>) -> Self {
        Self::new(field, "field is mandatory")
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
