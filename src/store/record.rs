//! Durable cart record
//!
//! The cart's serialized form is its sole durable representation: one JSON
//! record per device/profile, replaced in full on every write.

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartLine};

/// The record as written: `{ "lines": [...] }`.
#[derive(Debug, Serialize)]
struct CartRecord<'a> {
    lines: &'a [CartLine],
}

/// The record as read.
#[derive(Debug, Deserialize)]
struct StoredRecord {
    lines: Vec<CartLine>,
}

/// Serialize a cart into its durable JSON record.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if the record cannot be encoded.
pub(crate) fn encode(cart: &Cart) -> Result<String, serde_json::Error> {
    serde_json::to_string(&CartRecord {
        lines: cart.lines(),
    })
}

/// Parse a durable record back into a cart.
///
/// Early versions of the storefront persisted the line array bare, so a
/// legacy record missing the `lines` wrapper is accepted.
///
/// Returns `None` for records that do not parse; the caller treats those as
/// an empty cart rather than an error.
pub(crate) fn decode(record: &str) -> Option<Cart> {
    // Two explicit parses, not an untagged enum: untagged deserialization
    // buffers the document, and a buffered `"discount_price": null` does not
    // survive the float codec.
    let lines = match serde_json::from_str::<StoredRecord>(record) {
        Ok(keyed) => keyed.lines,
        Err(_) => serde_json::from_str::<Vec<CartLine>>(record).ok()?,
    };

    Some(Cart::from_lines(lines))
}
