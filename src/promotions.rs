//! Promotions

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::round_currency;

/// How a promotion reduces the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionKind {
    /// Percentage points off the subtotal (0–100).
    Percent,

    /// Fixed currency amount off the subtotal.
    Fixed,
}

/// A validated discount rule, ready to apply to a subtotal.
///
/// Descriptors are ephemeral: they are never persisted with the cart and
/// carry no expiry or per-user state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    /// Normalized (upper-cased) code the descriptor was validated from.
    pub code: String,

    /// Discount rule.
    #[serde(rename = "type")]
    pub kind: PromotionKind,

    /// Percentage points or currency amount, depending on `kind`.
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

/// Structured rejection of a promotion code. The caller decides display;
/// nothing here is a panic or an I/O failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromotionError {
    /// No code was entered.
    #[error("no code entered")]
    EmptyCode,

    /// The code is not in the accepted set (or no longer active).
    #[error("unknown or inactive code: {0}")]
    UnknownCode(String),
}

/// Validates a promotion code against some source of truth.
///
/// The subtotal is part of the contract so a server-backed implementation
/// can enforce minimum-spend rules without a signature change.
pub trait PromotionValidator {
    /// Validate a code for a purchase of the given subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`PromotionError`] describing why the code was rejected.
    fn validate(&self, code: &str, subtotal: Decimal) -> Result<Promotion, PromotionError>;
}

/// Validator backed by a closed, in-memory code table.
///
/// This is a stand-in for server-side validation: swap in a validator that
/// calls the backend without touching any caller.
#[derive(Debug, Clone)]
pub struct StaticCodeValidator {
    codes: FxHashMap<String, (PromotionKind, Decimal)>,
}

impl StaticCodeValidator {
    /// An empty validator that rejects every code.
    pub fn empty() -> Self {
        Self {
            codes: FxHashMap::default(),
        }
    }

    /// Register a code. The code is matched case-insensitively.
    #[must_use]
    pub fn with_code(mut self, code: &str, kind: PromotionKind, value: Decimal) -> Self {
        self.codes
            .insert(code.trim().to_uppercase(), (kind, value));
        self
    }
}

impl Default for StaticCodeValidator {
    /// The development code set: `DEV10` (10% off), `STUDENT15` (15% off)
    /// and `SAVE5` (5.00 fixed off).
    fn default() -> Self {
        Self::empty()
            .with_code("DEV10", PromotionKind::Percent, Decimal::from(10))
            .with_code("STUDENT15", PromotionKind::Percent, Decimal::from(15))
            .with_code("SAVE5", PromotionKind::Fixed, Decimal::from(5))
    }
}

impl PromotionValidator for StaticCodeValidator {
    fn validate(&self, code: &str, _subtotal: Decimal) -> Result<Promotion, PromotionError> {
        let normalized = code.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(PromotionError::EmptyCode);
        }

        let (kind, value) = self
            .codes
            .get(&normalized)
            .ok_or_else(|| PromotionError::UnknownCode(normalized.clone()))?;

        Ok(Promotion {
            code: normalized,
            kind: *kind,
            value: *value,
        })
    }
}

/// Discount amount a promotion takes off a subtotal.
///
/// Percent promotions round to minor-unit precision; both kinds clamp to
/// `[0, subtotal]` so the discount can never exceed what is being bought.
pub fn discount_amount(subtotal: Decimal, promotion: Option<&Promotion>) -> Decimal {
    let Some(promotion) = promotion else {
        return Decimal::ZERO;
    };

    let amount = match promotion.kind {
        PromotionKind::Percent => round_currency(subtotal * promotion.value / Decimal::ONE_HUNDRED),
        PromotionKind::Fixed => promotion.value,
    };

    amount.clamp(Decimal::ZERO, subtotal.max(Decimal::ZERO))
}

/// Amount due after a discount: `max(0, subtotal - discount)`.
pub fn total_due(subtotal: Decimal, discount: Decimal) -> Decimal {
    (subtotal - discount).max(Decimal::ZERO)
}
