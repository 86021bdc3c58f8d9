//! Catalog boundary
//!
//! The backend's catalog entries are duck-typed: prices may arrive as
//! numbers, numeric strings or nothing at all, and an image may live under
//! any of several field spellings (`image1`, `image_url`, `image_path`,
//! `image_urls[]`, `gallery[]`). This module normalizes that shape once, at
//! the boundary, into a canonical [`CatalogEntry`] so the rest of the crate
//! never carries fallback chains.

use rust_decimal::{Decimal, prelude::FromPrimitive};
use rustc_hash::FxHashSet;
use serde::Deserialize;
use serde_json::Value;

use crate::cart::{CartLine, ItemKind, LineId};

/// A catalog entry exactly as the backend serves it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCatalogEntry {
    /// Backend-assigned id.
    pub id: LineId,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    price: Option<Value>,

    #[serde(default)]
    discount_price: Option<Value>,

    #[serde(default)]
    sold_out: Option<bool>,

    #[serde(default)]
    limited_edition: Option<bool>,

    #[serde(default)]
    active: Option<bool>,

    #[serde(default)]
    image1: Option<String>,

    #[serde(default)]
    image_url: Option<String>,

    #[serde(default)]
    image_path: Option<String>,

    #[serde(default)]
    image_urls: Vec<String>,

    #[serde(default)]
    gallery: Vec<String>,
}

/// A catalog entry after boundary normalization: coerced prices, resolved
/// flags, and a single ordered `images` list.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Backend-assigned id.
    pub id: LineId,

    /// Display name; empty-string inputs are kept as-is.
    pub name: String,

    /// Base price; absent or malformed inputs coerce to zero.
    pub price: Decimal,

    /// Discount price; kept only when parsable and non-negative.
    pub discount_price: Option<Decimal>,

    /// Whether the entry is currently unavailable for purchase.
    pub sold_out: bool,

    /// Limited edition marker, display-only.
    pub limited_edition: bool,

    /// Whether the backend still lists the entry; absent means active.
    pub active: bool,

    /// All image references, resolved against the API base and deduplicated,
    /// in the backend's precedence order.
    pub images: Vec<String>,
}

impl RawCatalogEntry {
    /// Normalize into the canonical shape, resolving image references
    /// against `base_url`.
    pub fn normalize(self, base_url: &str) -> CatalogEntry {
        let mut images = Vec::new();
        let mut seen = FxHashSet::default();

        let singles = [self.image1, self.image_url, self.image_path];
        let lists = [self.image_urls, self.gallery];

        for raw in singles
            .into_iter()
            .flatten()
            .chain(lists.into_iter().flatten())
        {
            if raw.is_empty() {
                continue;
            }
            let resolved = resolve_image_url(base_url, &raw);
            if seen.insert(resolved.clone()) {
                images.push(resolved);
            }
        }

        CatalogEntry {
            id: self.id,
            name: self.name.unwrap_or_default(),
            price: coerce_amount(self.price.as_ref())
                .unwrap_or(Decimal::ZERO)
                .max(Decimal::ZERO),
            discount_price: coerce_amount(self.discount_price.as_ref())
                .filter(|amount| *amount >= Decimal::ZERO),
            sold_out: self.sold_out.unwrap_or(false),
            limited_edition: self.limited_edition.unwrap_or(false),
            active: self.active.unwrap_or(true),
            images,
        }
    }
}

impl CatalogEntry {
    /// Whether the entry can be added to a cart.
    pub fn is_purchasable(&self) -> bool {
        self.active && !self.sold_out
    }

    /// Snapshot this entry into a cart line.
    ///
    /// Name, prices and the first image are captured at add-time and never
    /// re-fetched; later catalog edits do not affect lines already in carts.
    pub fn to_line(&self, kind: ItemKind, qty: u32) -> CartLine {
        CartLine {
            id: self.id.clone(),
            kind,
            name: self.name.clone(),
            price: self.price,
            discount_price: self.discount_price,
            image_url: self.images.first().cloned(),
            qty,
        }
    }
}

/// Resolve an image reference against the API base URL.
///
/// Absolute `http(s)` URLs pass through untouched; anything else is treated
/// as a backend-relative path.
pub fn resolve_image_url(base_url: &str, raw: &str) -> String {
    if is_absolute_url(raw) {
        return raw.to_owned();
    }

    let base = base_url.trim_end_matches('/');
    let path = raw.trim_start_matches('/');

    format!("{base}/{path}")
}

fn is_absolute_url(candidate: &str) -> bool {
    let lower = candidate.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Coerce a duck-typed price field to a decimal amount.
///
/// Accepts JSON numbers and numeric strings; anything else (including
/// non-finite numbers) yields `None`.
fn coerce_amount(value: Option<&Value>) -> Option<Decimal> {
    match value? {
        Value::Number(number) => number.as_f64().and_then(Decimal::from_f64),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
