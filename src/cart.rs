//! Cart

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Discriminator between the two catalog namespaces.
///
/// Products and services are issued ids independently by the backend, so a
/// product and a service may share the same numeric id. Every cart lookup is
/// keyed on the `(id, kind)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A physical or digital product.
    Product,

    /// A bookable service.
    Service,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Product => f.write_str("product"),
            ItemKind::Service => f.write_str("service"),
        }
    }
}

/// Opaque catalog identifier, assigned by the backend.
///
/// The backend serves integer ids today, but the cart treats the id as
/// opaque and also accepts string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineId {
    /// Integer id.
    Int(i64),

    /// String id.
    Text(String),
}

impl From<i64> for LineId {
    fn from(id: i64) -> Self {
        LineId::Int(id)
    }
}

impl From<&str> for LineId {
    fn from(id: &str) -> Self {
        LineId::Text(id.to_owned())
    }
}

impl From<String> for LineId {
    fn from(id: String) -> Self {
        LineId::Text(id)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineId::Int(id) => write!(f, "{id}"),
            LineId::Text(id) => f.write_str(id),
        }
    }
}

fn default_qty() -> u32 {
    1
}

/// One cart entry: a `(id, kind)` pair with a quantity and a snapshot of the
/// catalog entry taken at add-time.
///
/// The serde field names are the durable record schema; the serialized cart
/// is the sole durable representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog id of the entry this line was added from.
    pub id: LineId,

    /// Catalog namespace the id belongs to.
    pub kind: ItemKind,

    /// Display name, snapshotted at add-time and never re-fetched.
    pub name: String,

    /// Base unit price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Discounted unit price; effective when strictly below [`price`](Self::price).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub discount_price: Option<Decimal>,

    /// Display image, absolute URL or backend-relative path.
    #[serde(default)]
    pub image_url: Option<String>,

    /// Quantity, at least 1 for every retained line.
    #[serde(default = "default_qty")]
    pub qty: u32,
}

impl CartLine {
    /// Whether this line was added from the given catalog entry.
    pub fn matches(&self, id: &LineId, kind: ItemKind) -> bool {
        self.kind == kind && self.id == *id
    }
}

/// The cart aggregate: an ordered sequence of lines, unique per `(id, kind)`.
///
/// Insertion order is display order and is preserved across increments and
/// decrements. Decrementing a line to zero removes it; re-adding the same
/// entry afterwards appends at the end, not at the original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: SmallVec<[CartLine; 8]>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from stored lines.
    ///
    /// Replays each line through [`add`](Self::add), so duplicate keys merge
    /// and zero-quantity lines drop out. A record written by any version of
    /// this crate loads back into a cart satisfying the aggregate invariants.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            cart.add(line);
        }
        cart
    }

    /// The lines in display order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Iterate over the lines in display order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Find the line for a catalog entry.
    pub fn find(&self, id: &LineId, kind: ItemKind) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.matches(id, kind))
    }

    /// Sum of quantities across all lines (not the count of distinct lines).
    ///
    /// This is the figure published to change subscribers: one line with
    /// quantity 3 reports 3.
    pub fn total_item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.qty).sum()
    }

    /// Add a candidate line, merging on `(id, kind)`.
    ///
    /// If a line with the same key exists its quantity grows by the
    /// candidate's quantity and the existing snapshot is kept; otherwise the
    /// candidate is appended. A candidate with quantity 0 is ignored.
    ///
    /// Returns whether the cart changed.
    pub fn add(&mut self, candidate: CartLine) -> bool {
        if candidate.qty < 1 {
            return false;
        }

        match self.find_mut(&candidate.id, candidate.kind) {
            Some(line) => line.qty = line.qty.saturating_add(candidate.qty),
            None => self.lines.push(candidate),
        }

        true
    }

    /// Increase the quantity of a line by 1. No-op if the key is absent.
    ///
    /// Returns whether the cart changed.
    pub fn increment(&mut self, id: &LineId, kind: ItemKind) -> bool {
        let Some(line) = self.find_mut(id, kind) else {
            return false;
        };

        line.qty = line.qty.saturating_add(1);
        true
    }

    /// Decrease the quantity of a line by 1, removing the line when the
    /// quantity would reach 0. No-op if the key is absent.
    ///
    /// Returns whether the cart changed.
    pub fn decrement(&mut self, id: &LineId, kind: ItemKind) -> bool {
        let Some(line) = self.find_mut(id, kind) else {
            return false;
        };

        if line.qty > 1 {
            line.qty -= 1;
        } else {
            self.lines.retain(|line| !line.matches(id, kind));
        }

        true
    }

    /// Remove a line unconditionally. No-op if the key is absent.
    ///
    /// Returns whether the cart changed.
    pub fn remove(&mut self, id: &LineId, kind: ItemKind) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| !line.matches(id, kind));
        self.lines.len() < before
    }

    /// Remove every line. The cart itself persists as an empty aggregate.
    ///
    /// Returns whether the cart changed, i.e. whether it held any lines.
    pub fn clear(&mut self) -> bool {
        if self.lines.is_empty() {
            return false;
        }

        self.lines.clear();
        true
    }

    fn find_mut(&mut self, id: &LineId, kind: ItemKind) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.matches(id, kind))
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartLine;
    type IntoIter = std::slice::Iter<'a, CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}
