//! Checkout quote computation.
//!
//! Turns a cart snapshot into the numbers checkout needs: subtotal, tax,
//! shipping, the final payable amount, and the provider-facing line items
//! with the tax+shipping surcharge folded into their unit prices.
//!
//! The surcharge is spread as `extra_charge / total_quantity` (floor) per
//! unit; the division remainder is carried by a single unit split off the
//! largest line. The line items therefore always sum to `final_payable`
//! exactly, instead of drifting by up to `total_quantity / 2` minor units
//! the way a round-once-apply-everywhere scheme does.

use crate::error::CommerceError;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Pricing constants, fixed per deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Currency all prices are quoted in.
    pub currency: Currency,
    /// Tax rate in whole percent (e.g., 12).
    pub tax_rate_percent: u32,
    /// Subtotal (minor units) at or above which shipping is free.
    pub free_shipping_threshold: i64,
    /// Flat shipping cost (minor units) below the threshold.
    pub flat_shipping_cost: i64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: Currency::INR,
            tax_rate_percent: 12,
            free_shipping_threshold: 5000,
            flat_shipping_cost: 500,
        }
    }
}

/// One cart line as input to a quote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteItem {
    /// Product title, forwarded to the payment provider.
    pub name: String,
    /// Product description, forwarded to the payment provider.
    pub description: String,
    /// Unit price before surcharge.
    pub unit_price: Money,
    /// Quantity, >= 1.
    pub quantity: i64,
}

/// A line item as handed to the hosted checkout provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderLineItem {
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Unit amount in minor units, surcharge included.
    pub unit_amount: Money,
    /// Quantity.
    pub quantity: i64,
}

impl ProviderLineItem {
    /// Total for this line in minor units.
    pub fn line_total(&self) -> i64 {
        self.unit_amount.amount * self.quantity
    }
}

/// A computed checkout quote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    /// Sum of unit price times quantity over all lines.
    pub subtotal: Money,
    /// Tax on the subtotal, rounded half-up.
    pub tax: Money,
    /// Shipping cost (zero at or above the free-shipping threshold).
    pub shipping: Money,
    /// subtotal + tax + shipping.
    pub final_payable: Money,
    /// Surcharge folded into every unit (minor units).
    pub extra_per_unit: i64,
    /// Remainder carried by the split unit (minor units).
    pub remainder: i64,
    /// Total quantity across all lines.
    pub total_quantity: i64,
    /// Provider-facing line items; their totals sum to `final_payable`.
    pub line_items: Vec<ProviderLineItem>,
}

impl Quote {
    /// tax + shipping.
    pub fn extra_charge(&self) -> i64 {
        self.tax.amount + self.shipping.amount
    }

    /// Whether the order qualified for free shipping.
    pub fn is_free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }
}

/// Compute a quote for a non-empty sequence of cart lines.
///
/// Fails with [`CommerceError::EmptyCart`] on an empty input before any
/// arithmetic happens, so the per-unit division is never invoked with a
/// zero total quantity.
pub fn compute_quote(
    items: &[QuoteItem],
    config: &PricingConfig,
) -> Result<Quote, CommerceError> {
    if items.is_empty() {
        return Err(CommerceError::EmptyCart);
    }

    let currency = config.currency;
    let mut line_subtotals = Vec::with_capacity(items.len());
    let mut subtotal = Money::zero(currency);
    let mut total_quantity: i64 = 0;

    for item in items {
        if item.unit_price.currency != currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: currency.code().to_string(),
                got: item.unit_price.currency.code().to_string(),
            });
        }
        if item.unit_price.is_negative() {
            return Err(CommerceError::InvalidPrice(item.unit_price.amount));
        }
        if item.quantity < 1 {
            return Err(CommerceError::InvalidQuantity(item.quantity));
        }

        let line_subtotal = item
            .unit_price
            .checked_mul(item.quantity)
            .ok_or(CommerceError::Overflow)?;
        subtotal = subtotal
            .checked_add(&line_subtotal)
            .ok_or(CommerceError::Overflow)?;
        total_quantity = total_quantity
            .checked_add(item.quantity)
            .ok_or(CommerceError::Overflow)?;
        line_subtotals.push(line_subtotal.amount);
    }

    let tax = subtotal
        .percent_half_up(config.tax_rate_percent)
        .ok_or(CommerceError::Overflow)?;
    let shipping = if subtotal.amount >= config.free_shipping_threshold {
        Money::zero(currency)
    } else {
        Money::new(config.flat_shipping_cost, currency)
    };
    let final_payable = subtotal
        .checked_add(&tax)
        .and_then(|m| m.checked_add(&shipping))
        .ok_or(CommerceError::Overflow)?;

    let extra_charge = tax.amount + shipping.amount;
    let extra_per_unit = extra_charge / total_quantity;
    let remainder = extra_charge - extra_per_unit * total_quantity;

    let mut line_items = Vec::with_capacity(items.len() + 1);
    for item in items {
        let unit_amount = item
            .unit_price
            .checked_add(&Money::new(extra_per_unit, currency))
            .ok_or(CommerceError::Overflow)?;
        line_items.push(ProviderLineItem {
            name: item.name.clone(),
            description: item.description.clone(),
            unit_amount,
            quantity: item.quantity,
        });
    }

    if remainder > 0 {
        // The largest line absorbs the remainder: one of its units is
        // split off at unit + remainder so totals stay exact.
        let largest = line_subtotals
            .iter()
            .enumerate()
            .max_by_key(|(i, amount)| (**amount, std::cmp::Reverse(*i)))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let carrier = Money::new(line_items[largest].unit_amount.amount + remainder, currency);
        if line_items[largest].quantity == 1 {
            line_items[largest].unit_amount = carrier;
        } else {
            line_items[largest].quantity -= 1;
            let split = ProviderLineItem {
                name: line_items[largest].name.clone(),
                description: line_items[largest].description.clone(),
                unit_amount: carrier,
                quantity: 1,
            };
            line_items.insert(largest + 1, split);
        }
    }

    Ok(Quote {
        subtotal,
        tax,
        shipping,
        final_payable,
        extra_per_unit,
        remainder,
        total_quantity,
        line_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, price: i64, quantity: i64) -> QuoteItem {
        QuoteItem {
            name: name.to_string(),
            description: format!("{} description", name),
            unit_price: Money::new(price, Currency::INR),
            quantity,
        }
    }

    fn line_sum(quote: &Quote) -> i64 {
        quote.line_items.iter().map(|l| l.line_total()).sum()
    }

    #[test]
    fn test_worked_example() {
        // subtotal 2500, tax 300, shipping 500 (below threshold), total 3300
        let items = vec![item("Notebook", 1000, 2), item("Pen", 500, 1)];
        let quote = compute_quote(&items, &PricingConfig::default()).unwrap();

        assert_eq!(quote.subtotal.amount, 2500);
        assert_eq!(quote.tax.amount, 300);
        assert_eq!(quote.shipping.amount, 500);
        assert_eq!(quote.final_payable.amount, 3300);
        assert_eq!(quote.total_quantity, 3);
        assert_eq!(line_sum(&quote), 3300);
    }

    #[test]
    fn test_components_always_sum() {
        let items = vec![item("A", 1234, 3), item("B", 77, 5)];
        let quote = compute_quote(&items, &PricingConfig::default()).unwrap();
        assert_eq!(
            quote.final_payable.amount,
            quote.subtotal.amount + quote.tax.amount + quote.shipping.amount
        );
    }

    #[test]
    fn test_free_shipping_at_threshold() {
        let items = vec![item("Big", 5000, 1)];
        let quote = compute_quote(&items, &PricingConfig::default()).unwrap();
        assert_eq!(quote.shipping.amount, 0);
        assert!(quote.is_free_shipping());
        assert_eq!(quote.final_payable.amount, 5000 + 600);
        assert_eq!(line_sum(&quote), quote.final_payable.amount);
    }

    #[test]
    fn test_line_items_sum_exactly_on_awkward_quantities() {
        // Cases picked so the surcharge does not divide evenly.
        let cases: Vec<Vec<QuoteItem>> = vec![
            vec![item("A", 33, 1), item("B", 7, 3)],
            vec![item("A", 999, 7)],
            vec![item("A", 1, 1), item("B", 1, 1), item("C", 1, 1)],
            vec![item("A", 1000, 2), item("B", 500, 1)],
            vec![item("A", 4999, 1), item("B", 1, 2)],
            vec![item("A", 250, 9), item("B", 13, 4), item("C", 2, 11)],
        ];
        for items in cases {
            let quote = compute_quote(&items, &PricingConfig::default()).unwrap();
            assert_eq!(
                line_sum(&quote),
                quote.final_payable.amount,
                "line items drifted for {:?}",
                items
            );
            for line in &quote.line_items {
                assert!(line.unit_amount.amount >= 0);
                assert!(line.quantity >= 1);
            }
        }
    }

    #[test]
    fn test_remainder_carried_by_largest_line() {
        // extra = 800 over 3 units: 266 each plus a remainder of 2 on a
        // unit split off the 2000-subtotal line.
        let items = vec![item("Notebook", 1000, 2), item("Pen", 500, 1)];
        let quote = compute_quote(&items, &PricingConfig::default()).unwrap();

        assert_eq!(quote.extra_per_unit, 266);
        assert_eq!(quote.remainder, 2);
        assert_eq!(quote.line_items.len(), 3);
        assert_eq!(quote.line_items[0].unit_amount.amount, 1266);
        assert_eq!(quote.line_items[0].quantity, 1);
        assert_eq!(quote.line_items[1].unit_amount.amount, 1268);
        assert_eq!(quote.line_items[1].quantity, 1);
        assert_eq!(quote.line_items[2].unit_amount.amount, 766);
    }

    #[test]
    fn test_no_split_when_remainder_zero() {
        // extra = 1100 + 0 shipping? pick numbers dividing evenly:
        // subtotal 5000 (free shipping), tax 600, 2 units -> 300 each.
        let items = vec![item("Big", 2500, 2)];
        let quote = compute_quote(&items, &PricingConfig::default()).unwrap();
        assert_eq!(quote.remainder, 0);
        assert_eq!(quote.line_items.len(), 1);
        assert_eq!(quote.line_items[0].unit_amount.amount, 2800);
    }

    #[test]
    fn test_empty_cart_rejected() {
        assert!(matches!(
            compute_quote(&[], &PricingConfig::default()),
            Err(CommerceError::EmptyCart)
        ));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let negative = vec![item("A", -5, 1)];
        assert!(matches!(
            compute_quote(&negative, &PricingConfig::default()),
            Err(CommerceError::InvalidPrice(-5))
        ));

        let zero_quantity = vec![item("A", 100, 0)];
        assert!(matches!(
            compute_quote(&zero_quantity, &PricingConfig::default()),
            Err(CommerceError::InvalidQuantity(0))
        ));
    }

    #[test]
    fn test_currency_mismatch_rejected() {
        let items = vec![QuoteItem {
            name: "A".into(),
            description: "A".into(),
            unit_price: Money::new(100, Currency::USD),
            quantity: 1,
        }];
        assert!(matches!(
            compute_quote(&items, &PricingConfig::default()),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_priced_items_stay_non_negative() {
        let items = vec![item("Freebie", 0, 2), item("Pen", 10, 1)];
        let quote = compute_quote(&items, &PricingConfig::default()).unwrap();
        assert_eq!(line_sum(&quote), quote.final_payable.amount);
        for line in &quote.line_items {
            assert!(line.unit_amount.amount >= 0);
        }
    }
}
