//! Invoice rendering.
//!
//! An invoice is produced from the order snapshot alone, so it stays
//! correct after catalog edits. The renderer is a collaborator seam; the
//! default implementation lays the document out as plain text in the
//! shape of the storefront's printed invoice: header, customer block,
//! item table, totals, footer.

use chrono::DateTime;
use vitrine_commerce::order::Order;

/// Renders an order into a downloadable document.
pub trait InvoiceRenderer: Send + Sync {
    /// Produce the document bytes.
    fn render(&self, order: &Order) -> Vec<u8>;

    /// File name for the rendered document.
    fn file_name(&self, order: &Order) -> String;
}

/// Plain-text invoice layout.
pub struct TextInvoiceRenderer {
    /// Shop name printed in the header and footer.
    pub shop_name: String,
    /// Support contact printed in the footer.
    pub support_email: String,
}

impl Default for TextInvoiceRenderer {
    fn default() -> Self {
        Self {
            shop_name: "Vitrine".to_string(),
            support_email: "support@vitrine.example".to_string(),
        }
    }
}

impl TextInvoiceRenderer {
    const WIDTH: usize = 72;

    fn center(text: &str) -> String {
        let pad = Self::WIDTH.saturating_sub(text.len()) / 2;
        format!("{}{}", " ".repeat(pad), text)
    }
}

impl InvoiceRenderer for TextInvoiceRenderer {
    fn render(&self, order: &Order) -> Vec<u8> {
        let mut out = String::new();

        out.push_str(&Self::center("INVOICE"));
        out.push_str("\n\n");

        out.push_str("Customer details\n");
        out.push_str("----------------\n");
        out.push_str(&format!("Invoice ID:       {}\n", order.id));
        let date = DateTime::from_timestamp(order.created_at, 0)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("Date:             {}\n", date));
        out.push_str(&format!("Customer name:    {}\n", order.purchaser.name));
        out.push_str(&format!("Customer email:   {}\n", order.purchaser.email));
        out.push_str(&format!("Customer phone:   {}\n", order.purchaser.phone));
        out.push_str(&format!("Customer address: {}\n", order.purchaser.address));
        out.push('\n');

        out.push_str("Order summary\n");
        out.push_str("-------------\n");
        out.push_str(&format!(
            "{:<40}{:>6}{:>12}{:>14}\n",
            "Item", "Qty", "Price", "Total"
        ));
        out.push_str(&format!("{}\n", "-".repeat(Self::WIDTH)));

        for (index, item) in order.items.iter().enumerate() {
            let line_total = item.product.price.amount * item.quantity;
            let title = format!("{}. {}", index + 1, item.product.title);
            out.push_str(&format!(
                "{:<40}{:>6}{:>12}{:>14}\n",
                title, item.quantity, item.product.price.amount, line_total
            ));
        }

        out.push('\n');
        out.push_str(&format!("{:>58}{:>14}\n", "Subtotal:", order.subtotal.amount));
        out.push_str(&format!("{:>58}{:>14}\n", "Tax:", order.tax.amount));
        out.push_str(&format!("{:>58}{:>14}\n", "Shipping:", order.shipping.amount));
        out.push_str(&format!(
            "{:>58}{:>14}\n",
            "Grand total:", order.grand_total.amount
        ));

        out.push('\n');
        out.push_str(&Self::center(&format!(
            "Thank you for shopping at {}!",
            self.shop_name
        )));
        out.push('\n');
        out.push_str(&Self::center(&format!(
            "For support, contact {}",
            self.support_email
        )));
        out.push('\n');

        out.into_bytes()
    }

    fn file_name(&self, order: &Order) -> String {
        format!("invoice_{}.txt", order.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_commerce::catalog::Product;
    use vitrine_commerce::checkout::ContactDetails;
    use vitrine_commerce::ids::UserId;
    use vitrine_commerce::money::{Currency, Money};
    use vitrine_commerce::pricing::{compute_quote, PricingConfig, QuoteItem};

    fn sample_order() -> Order {
        let purchased = vec![
            (
                Product::new(
                    "Notebook",
                    Money::new(1000, Currency::INR),
                    "Ruled, 200 pages",
                    "/images/notebook.png",
                    UserId::new("seller"),
                ),
                2,
            ),
            (
                Product::new(
                    "Pen",
                    Money::new(500, Currency::INR),
                    "Fine nib",
                    "/images/pen.png",
                    UserId::new("seller"),
                ),
                1,
            ),
        ];
        let items: Vec<QuoteItem> = purchased
            .iter()
            .map(|(p, q)| QuoteItem {
                name: p.title.clone(),
                description: p.description.clone(),
                unit_price: p.price,
                quantity: *q,
            })
            .collect();
        let quote = compute_quote(&items, &PricingConfig::default()).unwrap();
        let contact = ContactDetails {
            full_name: "Asha Rao".into(),
            phone: "9876500000".into(),
            address: "12 Hill Road, Bandra".into(),
            email: "asha@example.com".into(),
        };
        Order::materialize(UserId::new("buyer"), &purchased, &contact, &quote, "cs_9").unwrap()
    }

    #[test]
    fn test_invoice_totals() {
        // subtotal 2500, tax 300, shipping 500, grand total 3300
        let order = sample_order();
        let text = String::from_utf8(TextInvoiceRenderer::default().render(&order)).unwrap();

        assert!(text.contains("INVOICE"));
        assert!(text.contains("Asha Rao"));
        assert!(text.contains("2500"));
        assert!(text.contains("300"));
        assert!(text.contains("500"));
        assert!(text.contains("3300"));
    }

    #[test]
    fn test_invoice_lists_every_line() {
        let order = sample_order();
        let text = String::from_utf8(TextInvoiceRenderer::default().render(&order)).unwrap();
        assert!(text.contains("1. Notebook"));
        assert!(text.contains("2. Pen"));
        // Line totals: 1000 * 2 and 500 * 1.
        assert!(text.contains("2000"));
    }

    #[test]
    fn test_file_name() {
        let order = sample_order();
        let name = TextInvoiceRenderer::default().file_name(&order);
        assert!(name.starts_with("invoice_"));
        assert!(name.ends_with(".txt"));
    }
}
