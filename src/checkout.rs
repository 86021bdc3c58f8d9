//! Checkout
//!
//! Read-side of the cart for the checkout page: a quote of `{ lines,
//! subtotal, discount, total }` for a given promotion input, display-money
//! accessors, a printable summary, and the order payload the storefront
//! submits to the backend. Building the payload is this crate's last step;
//! the submission itself (and payment) happens elsewhere.

use std::io;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use tabled::{builder::Builder, settings::Style};
use thiserror::Error;

use crate::{
    cart::{Cart, CartLine, ItemKind, LineId},
    pricing::{effective_unit_price, line_total, subtotal},
    promotions::{Promotion, discount_amount, total_due},
};

/// Errors raised while preparing a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines; there is nothing to order.
    #[error("the cart is empty")]
    EmptyCart,

    /// No customer email was provided.
    #[error("an email address is required")]
    MissingEmail,

    /// The summary could not be written out.
    #[error("failed to write checkout summary")]
    Io(#[from] io::Error),
}

/// Monetary snapshot of a cart under an optional promotion.
///
/// The quote is a pure derivation: it holds copies of the lines and figures
/// as of construction and does not track later cart mutations.
#[derive(Debug, Clone)]
pub struct CheckoutQuote {
    lines: Vec<CartLine>,
    subtotal: Decimal,
    discount: Decimal,
    total: Decimal,
    promotion: Option<Promotion>,
}

impl CheckoutQuote {
    /// Quote the given cart, applying the promotion if one was validated.
    pub fn new(cart: &Cart, promotion: Option<Promotion>) -> Self {
        let subtotal = subtotal(cart);
        let discount = discount_amount(subtotal, promotion.as_ref());
        let total = total_due(subtotal, discount);

        Self {
            lines: cart.lines().to_vec(),
            subtotal,
            discount,
            total,
            promotion,
        }
    }

    /// The quoted lines, in cart display order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Sum of effective line totals before any promotion.
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Amount the promotion takes off the subtotal.
    pub fn discount(&self) -> Decimal {
        self.discount
    }

    /// Amount due: `max(0, subtotal - discount)`.
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// The promotion applied to this quote, if any.
    pub fn promotion(&self) -> Option<&Promotion> {
        self.promotion.as_ref()
    }

    /// The subtotal as display money in the given currency.
    pub fn subtotal_money(&self, currency: &'static Currency) -> Money<'static, Currency> {
        Money::from_decimal(self.subtotal, currency)
    }

    /// The discount as display money in the given currency.
    pub fn discount_money(&self, currency: &'static Currency) -> Money<'static, Currency> {
        Money::from_decimal(self.discount, currency)
    }

    /// The total as display money in the given currency.
    pub fn total_money(&self, currency: &'static Currency) -> Money<'static, Currency> {
        Money::from_decimal(self.total, currency)
    }

    /// Write an order-summary table followed by the subtotal, discount and
    /// total figures.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Io`] if writing to `out` fails.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        currency: &'static Currency,
    ) -> Result<(), CheckoutError> {
        let mut builder = Builder::default();
        builder.push_record(["Item", "Kind", "Qty", "Each", "Total"]);

        for line in &self.lines {
            builder.push_record([
                line.name.clone(),
                line.kind.to_string(),
                line.qty.to_string(),
                Money::from_decimal(effective_unit_price(line), currency).to_string(),
                Money::from_decimal(line_total(line), currency).to_string(),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::sharp());

        writeln!(out, "{table}")?;
        writeln!(out, "Subtotal  {}", self.subtotal_money(currency))?;
        if let Some(promotion) = &self.promotion {
            writeln!(
                out,
                "Discount  -{} ({})",
                self.discount_money(currency),
                promotion.code
            )?;
        }
        writeln!(out, "Total     {}", self.total_money(currency))?;

        Ok(())
    }

    /// Build the order submission payload for this quote.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`] if the quote has no lines.
    /// - [`CheckoutError::MissingEmail`] if the customer email is blank.
    pub fn order_payload(
        &self,
        customer: CustomerDetails,
        payment: PaymentSelection,
    ) -> Result<OrderPayload, CheckoutError> {
        if self.lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if customer.email.trim().is_empty() {
            return Err(CheckoutError::MissingEmail);
        }

        Ok(OrderPayload {
            customer,
            items: self.lines.iter().map(OrderLine::from).collect(),
            amounts: OrderAmounts {
                subtotal: self.subtotal,
                discount: self.discount,
                total: self.total,
            },
            discount_code: self.promotion.as_ref().map(|promo| promo.code.clone()),
            payment,
        })
    }
}

/// Customer contact details attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    /// Contact email, required.
    pub email: String,

    /// Shipping address, free-form.
    #[serde(default)]
    pub address: String,
}

/// Payment methods the checkout page offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Stripe checkout.
    Stripe,

    /// PayPal.
    Paypal,

    /// iDEAL bank transfer.
    Ideal,

    /// Direct credit/debit card entry.
    Card,

    /// Cryptocurrency; carries the chosen currency.
    Crypto,
}

/// Cryptocurrencies accepted for crypto payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CryptoCurrency {
    /// Bitcoin.
    Btc,

    /// Monero.
    Xmr,
}

/// The payment choice serialized into the order payload: a method plus the
/// crypto currency when (and only when) the method is crypto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSelection {
    /// Chosen payment method.
    pub method: PaymentMethod,

    /// Crypto currency; `None` unless `method` is [`PaymentMethod::Crypto`].
    pub crypto: Option<CryptoCurrency>,
}

impl PaymentSelection {
    /// A non-crypto payment selection.
    pub fn new(method: PaymentMethod) -> Self {
        let crypto = match method {
            PaymentMethod::Crypto => Some(CryptoCurrency::Btc),
            _ => None,
        };

        Self { method, crypto }
    }

    /// A crypto payment in the given currency.
    pub fn crypto(currency: CryptoCurrency) -> Self {
        Self {
            method: PaymentMethod::Crypto,
            crypto: Some(currency),
        }
    }
}

/// One ordered item as the backend expects it: the effective unit price is
/// resolved client-side at payload-build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Catalog id.
    pub id: LineId,

    /// Catalog namespace.
    pub kind: ItemKind,

    /// Display name as snapshotted in the cart.
    pub name: String,

    /// Effective unit price (discount applied when valid).
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,

    /// Quantity ordered.
    pub qty: u32,

    /// Display image, if the line has one.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.clone(),
            kind: line.kind,
            name: line.name.clone(),
            unit_price: effective_unit_price(line),
            qty: line.qty,
            image_url: line.image_url.clone(),
        }
    }
}

/// The monetary summary section of the order payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderAmounts {
    /// Pre-discount subtotal.
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,

    /// Promotion discount.
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,

    /// Amount due.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// The normalized order submission payload, ready for the orders endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPayload {
    /// Customer contact details.
    pub customer: CustomerDetails,

    /// Ordered items.
    pub items: Vec<OrderLine>,

    /// Monetary summary.
    pub amounts: OrderAmounts,

    /// Applied promotion code, if any.
    pub discount_code: Option<String>,

    /// Payment selection.
    pub payment: PaymentSelection,
}
