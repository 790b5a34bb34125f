//! Shopping Cart Domain Models
//!
//! A cart is a list of line items plus derived totals. Totals are never
//! stored; they are recomputed from the items on every read. A cart is only
//! stored after [`Cart::check_limits`] passes, so its totals always fit.

use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat tax rate applied to the subtotal.
pub const TAX_RATE: Decimal = dec!(0.1);
/// Subtotals strictly above this ship for free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = dec!(50);
/// Shipping fee below the free-shipping threshold.
pub const SHIPPING_FEE: Decimal = dec!(5.99);

/// A line in the cart. Lines are identified by `product_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub product_name: String,
    pub product_sku: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,

    /// Free-form annotations (the add-to-cart tool stores `shopKey` and
    /// `sellerName` here).
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl CartItem {
    pub fn total_price(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }

    pub fn checked_total_price(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub cart_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Cart {
    pub fn new(cart_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            cart_id: cart_id.into(),
            created_at: now,
            updated_at: now,
            items: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn sub_total(&self) -> Decimal {
        self.items
            .iter()
            .fold(Decimal::ZERO, |acc, item| acc.saturating_add(item.total_price()))
    }

    pub fn tax(&self) -> Decimal {
        self.sub_total().saturating_mul(TAX_RATE)
    }

    pub fn shipping(&self) -> Decimal {
        if self.sub_total() > FREE_SHIPPING_THRESHOLD {
            Decimal::ZERO
        } else {
            SHIPPING_FEE
        }
    }

    pub fn total(&self) -> Decimal {
        self.sub_total()
            .saturating_add(self.tax())
            .saturating_add(self.shipping())
    }

    pub fn total_items(&self) -> i32 {
        self.items
            .iter()
            .fold(0i32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Fails when the item count or any money total would leave the range of
    /// its type.
    pub fn check_limits(&self) -> Result<()> {
        let exceeded = || AppError::CartLimitExceeded(self.cart_id.clone());

        self.items
            .iter()
            .try_fold(0i32, |acc, item| acc.checked_add(item.quantity))
            .ok_or_else(exceeded)?;

        let sub_total = self
            .items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| {
                acc.checked_add(item.checked_total_price()?)
            })
            .ok_or_else(exceeded)?;

        sub_total
            .checked_mul(TAX_RATE)
            .and_then(|tax| tax.checked_add(sub_total))
            .and_then(|total| total.checked_add(SHIPPING_FEE))
            .ok_or_else(exceeded)?;
        Ok(())
    }

    pub fn find_item_mut(&mut self, product_id: &str) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|i| i.product_id == product_id)
    }

    /// Merges `incoming` into the cart: a line with the same product id gets
    /// its quantity increased, anything else is appended. On error the cart is
    /// left half-merged and must not be stored.
    pub fn add_items(&mut self, incoming: Vec<CartItem>) -> Result<()> {
        for item in incoming {
            match self.items.iter_mut().find(|i| i.product_id == item.product_id) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .checked_add(item.quantity)
                        .ok_or_else(|| AppError::CartLimitExceeded(self.cart_id.clone()))?;
                }
                None => self.items.push(item),
            }
        }
        self.check_limits()
    }

    /// Removes the line for `product_id`. Returns `false` when absent.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn get(&self, cart_id: &str) -> Result<Option<Cart>>;
    async fn create(&self, cart_id: &str) -> Result<Cart>;
    async fn update(&self, cart: Cart) -> Result<Cart>;
    async fn delete(&self, cart_id: &str) -> Result<bool>;
    async fn exists(&self, cart_id: &str) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, quantity: i32, unit_price: Decimal) -> CartItem {
        CartItem {
            product_id: id.into(),
            product_name: format!("Product {id}"),
            product_sku: format!("SKU-{id}"),
            quantity,
            unit_price,
            ..Default::default()
        }
    }

    #[test]
    fn totals_below_free_shipping() {
        let mut cart = Cart::new("c1");
        cart.add_items(vec![item("a", 2, dec!(10)), item("b", 1, dec!(5.50))])
            .unwrap();

        assert_eq!(cart.sub_total(), dec!(25.50));
        assert_eq!(cart.tax(), dec!(2.550));
        assert_eq!(cart.shipping(), SHIPPING_FEE);
        assert_eq!(cart.total(), dec!(34.04));
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn shipping_is_free_above_threshold() {
        let mut cart = Cart::new("c1");
        cart.add_items(vec![item("a", 6, dec!(10))]).unwrap();
        assert_eq!(cart.shipping(), Decimal::ZERO);

        // exactly at the threshold still pays shipping
        let mut cart = Cart::new("c2");
        cart.add_items(vec![item("a", 5, dec!(10))]).unwrap();
        assert_eq!(cart.shipping(), SHIPPING_FEE);
    }

    #[test]
    fn adding_same_product_aggregates_quantity() {
        let mut cart = Cart::new("c1");
        cart.add_items(vec![item("a", 2, dec!(1))]).unwrap();
        cart.add_items(vec![item("a", 3, dec!(1)), item("b", 1, dec!(1))])
            .unwrap();

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[0].quantity, 5);
        assert_eq!(cart.items[1].product_id, "b");
    }

    #[test]
    fn remove_item_reports_absence() {
        let mut cart = Cart::new("c1");
        cart.add_items(vec![item("a", 1, dec!(1))]).unwrap();
        assert!(!cart.remove_item("zzz"));
        assert!(cart.remove_item("a"));
        assert!(cart.items.is_empty());
    }

    #[test]
    fn quantity_overflow_is_rejected() {
        let mut cart = Cart::new("c1");
        cart.add_items(vec![item("a", i32::MAX, dec!(0.01))]).unwrap();

        let err = cart
            .add_items(vec![item("a", i32::MAX, dec!(0.01))])
            .unwrap_err();
        assert!(matches!(err, AppError::CartLimitExceeded(id) if id == "c1"));
    }

    #[test]
    fn item_count_across_lines_must_fit() {
        let mut cart = Cart::new("c1");
        let err = cart
            .add_items(vec![item("a", i32::MAX, dec!(0)), item("b", 1, dec!(0))])
            .unwrap_err();
        assert!(matches!(err, AppError::CartLimitExceeded(_)));
    }

    #[test]
    fn money_overflow_is_rejected_and_reads_saturate() {
        let mut cart = Cart::new("c1");
        let err = cart
            .add_items(vec![item("a", 2_000_000_000, dec!(100000000000000000000))])
            .unwrap_err();
        assert!(matches!(err, AppError::CartLimitExceeded(_)));

        // the half-merged cart still renders without panicking
        assert_eq!(cart.items[0].total_price(), Decimal::MAX);
        assert_eq!(cart.sub_total(), Decimal::MAX);
        assert_eq!(cart.total(), Decimal::MAX);
    }
}
