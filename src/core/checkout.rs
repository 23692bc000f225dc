use crate::core::resolver::ShippingResolver;
use crate::domain::model::ShippingQuote;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub unit_price: u64,
    pub quantity: u32,
}

impl LineItem {
    pub fn line_total(&self) -> u64 {
        self.unit_price.saturating_mul(u64::from(self.quantity))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, unit_price: u64, quantity: u32) {
        self.items.push(LineItem {
            name: name.into(),
            unit_price,
            quantity,
        });
    }

    pub fn subtotal(&self) -> u64 {
        self.items
            .iter()
            .fold(0u64, |acc, item| acc.saturating_add(item.line_total()))
    }
}

/// Amounts shown on the checkout summary and charged at payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckoutTotals {
    pub subtotal: u64,
    /// `None` until the customer has picked a city.
    pub shipping: Option<ShippingQuote>,
    pub total: u64,
}

impl CheckoutTotals {
    pub fn compute(subtotal: u64, city: &str, resolver: &ShippingResolver) -> Self {
        let shipping = if city.is_empty() {
            None
        } else {
            Some(resolver.resolve(city))
        };
        let fee = shipping.map(|quote| quote.fee).unwrap_or(0);

        Self {
            subtotal,
            shipping,
            total: subtotal.saturating_add(fee),
        }
    }

    pub fn for_cart(cart: &Cart, city: &str, resolver: &ShippingResolver) -> Self {
        Self::compute(cart.subtotal(), city, resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jewellery_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add("Gold hoop earrings", 2_500, 2);
        cart.add("Beaded anklet", 800, 1);
        cart
    }

    #[test]
    fn test_cart_subtotal() {
        assert_eq!(jewellery_cart().subtotal(), 5_800);
        assert_eq!(Cart::new().subtotal(), 0);
    }

    #[test]
    fn test_no_city_selected_has_no_shipping() {
        let totals = CheckoutTotals::for_cart(&jewellery_cart(), "", &ShippingResolver::builtin());
        assert_eq!(totals.shipping, None);
        assert_eq!(totals.total, 5_800);
    }

    #[test]
    fn test_known_city_adds_fee() {
        let totals =
            CheckoutTotals::for_cart(&jewellery_cart(), "Nakuru", &ShippingResolver::builtin());
        assert_eq!(
            totals.shipping,
            Some(ShippingQuote {
                fee: 492,
                distance_km: 171
            })
        );
        assert_eq!(totals.total, 6_292);
    }

    #[test]
    fn test_unknown_city_still_produces_total() {
        let totals = CheckoutTotals::compute(1_000, "Atlantis", &ShippingResolver::builtin());
        assert_eq!(totals.shipping.map(|q| q.fee), Some(1_150));
        assert_eq!(totals.total, 2_150);
    }
}
