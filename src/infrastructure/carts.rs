use crate::domain::{Cart, CartRepository};
use crate::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;

/// Process-local cart store.
/// DashMap allows concurrent access without external Mutexes.
#[derive(Default)]
pub struct InMemoryCartRepository {
    carts: DashMap<String, Cart>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn get(&self, cart_id: &str) -> Result<Option<Cart>> {
        Ok(self.carts.get(cart_id).map(|c| c.clone()))
    }

    /// Returns the stored cart when one already exists under `cart_id`.
    async fn create(&self, cart_id: &str) -> Result<Cart> {
        let cart = self
            .carts
            .entry(cart_id.to_string())
            .or_insert_with(|| Cart::new(cart_id))
            .clone();
        Ok(cart)
    }

    async fn update(&self, mut cart: Cart) -> Result<Cart> {
        cart.touch();
        self.carts.insert(cart.cart_id.clone(), cart.clone());
        Ok(cart)
    }

    async fn delete(&self, cart_id: &str) -> Result<bool> {
        Ok(self.carts.remove(cart_id).is_some())
    }

    async fn exists(&self, cart_id: &str) -> Result<bool> {
        Ok(self.carts.contains_key(cart_id))
    }
}
