//! Pricing
//!
//! Pure, side-effect-free derivation of monetary figures from cart lines.
//! Every function is deterministic in its arguments and never fails:
//! malformed numeric input degrades to zero rather than erroring, and all
//! arithmetic stays in [`Decimal`] space so totals never drift past the
//! 2-decimal display precision.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::cart::{Cart, CartLine};

/// Round a monetary amount to currency minor-unit precision (2 decimal
/// places), midpoint away from zero.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// The price a unit of this line actually sells for.
///
/// The discount price applies only when present and strictly below the base
/// price; a discount at or above the base price is ignored. Negative inputs
/// clamp to zero.
pub fn effective_unit_price(line: &CartLine) -> Decimal {
    let effective = match line.discount_price {
        Some(discount) if discount < line.price => discount,
        _ => line.price,
    };

    effective.max(Decimal::ZERO)
}

/// The effective unit price multiplied by the line quantity.
pub fn line_total(line: &CartLine) -> Decimal {
    round_currency(effective_unit_price(line) * Decimal::from(line.qty))
}

/// Sum of [`line_total`] over all lines in the cart.
pub fn subtotal(cart: &Cart) -> Decimal {
    round_currency(cart.iter().map(line_total).sum())
}

/// Nearest-integer percentage saved by a discount price.
///
/// Returns 0 unless the discount is present and strictly below the base
/// price. `price = 20.00, discount = 15.00` reports 25.
pub fn percent_off(price: Decimal, discount_price: Option<Decimal>) -> u32 {
    let Some(discount) = discount_price else {
        return 0;
    };

    if price <= Decimal::ZERO || discount >= price {
        return 0;
    }

    let ratio = (Decimal::ONE_HUNDRED - (discount / price) * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    ratio.to_u32().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use crate::cart::{ItemKind, LineId};

    use super::*;

    fn line(price: Decimal, discount_price: Option<Decimal>, qty: u32) -> CartLine {
        CartLine {
            id: LineId::from(1),
            kind: ItemKind::Product,
            name: "Widget".to_owned(),
            price,
            discount_price,
            image_url: None,
            qty,
        }
    }

    #[test]
    fn effective_price_uses_discount_when_strictly_lower() {
        let line = line(Decimal::new(20_00, 2), Some(Decimal::new(15_00, 2)), 1);

        assert_eq!(effective_unit_price(&line), Decimal::new(15_00, 2));
    }

    #[test]
    fn effective_price_ignores_discount_at_or_above_base() {
        let at = line(Decimal::new(20_00, 2), Some(Decimal::new(20_00, 2)), 1);
        let above = line(Decimal::new(20_00, 2), Some(Decimal::new(25_00, 2)), 1);

        assert_eq!(effective_unit_price(&at), Decimal::new(20_00, 2));
        assert_eq!(effective_unit_price(&above), Decimal::new(20_00, 2));
    }

    #[test]
    fn effective_price_clamps_negative_to_zero() {
        let negative = line(Decimal::new(-5_00, 2), None, 1);

        assert_eq!(effective_unit_price(&negative), Decimal::ZERO);
    }

    #[test]
    fn line_total_multiplies_by_quantity() {
        let line = line(Decimal::new(10_00, 2), Some(Decimal::new(4_00, 2)), 3);

        assert_eq!(line_total(&line), Decimal::new(12_00, 2));
    }

    #[test]
    fn subtotal_sums_line_totals() {
        let mut cart = Cart::new();
        cart.add(line(Decimal::new(10_00, 2), None, 2));

        let mut gadget = line(Decimal::new(5_00, 2), Some(Decimal::new(4_00, 2)), 1);
        gadget.id = LineId::from(2);
        cart.add(gadget);

        assert_eq!(subtotal(&cart), Decimal::new(24_00, 2));
    }

    #[test]
    fn subtotal_of_empty_cart_is_zero() {
        assert_eq!(subtotal(&Cart::new()), Decimal::ZERO);
    }

    #[test]
    fn percent_off_rounds_to_nearest_integer() {
        assert_eq!(
            percent_off(Decimal::new(20_00, 2), Some(Decimal::new(15_00, 2))),
            25
        );
        assert_eq!(
            percent_off(Decimal::new(29_99, 2), Some(Decimal::new(19_99, 2))),
            33
        );
    }

    #[test]
    fn percent_off_is_zero_without_applicable_discount() {
        assert_eq!(percent_off(Decimal::new(20_00, 2), None), 0);
        assert_eq!(
            percent_off(Decimal::new(20_00, 2), Some(Decimal::new(25_00, 2))),
            0
        );
        assert_eq!(percent_off(Decimal::ZERO, Some(Decimal::new(1_00, 2))), 0);
    }
}
