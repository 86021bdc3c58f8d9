//! Trolley prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartLine, ItemKind, LineId},
    catalog::{CatalogEntry, RawCatalogEntry, resolve_image_url},
    checkout::{
        CheckoutError, CheckoutQuote, CryptoCurrency, CustomerDetails, OrderPayload,
        PaymentMethod, PaymentSelection,
    },
    notify::{Notifier, Subscription},
    pricing::{effective_unit_price, line_total, percent_off, subtotal},
    promotions::{
        Promotion, PromotionError, PromotionKind, PromotionValidator, StaticCodeValidator,
        discount_amount, total_due,
    },
    store::{CartRepository, CartStore, JsonFileRepository, MemoryRepository, StoreError},
};
