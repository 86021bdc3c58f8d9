//! Trolley
//!
//! Trolley is the cart engine for a storefront client: a persisted cart
//! aggregate, a pure pricing calculator, promotion validation, catalog
//! normalization, checkout quoting, and a typed change notifier that keeps
//! independent UI surfaces (badge, drawer, checkout summary) consistent
//! with a single durable source of truth.
//!
//! The cart is the aggregate root: lines are unique per `(id, kind)` pair,
//! mutations flow exclusively through [`store::CartStore`], and every
//! completed mutation is persisted in full and broadcast to subscribers as
//! a new total item count. Everything else — prices, quotes, payloads — is
//! derived on demand from that one canonical state.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod notify;
pub mod prelude;
pub mod pricing;
pub mod promotions;
pub mod store;
