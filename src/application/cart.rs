//! Cart commands and queries.
//!
//! Commands that name a cart or line that does not exist fail with
//! [`AppError::CartNotFound`] / [`AppError::CartItemNotFound`]. Reading a cart
//! never fails: a missing cart is created empty. A change that would push a
//! count or total out of range fails with [`AppError::CartLimitExceeded`] and
//! leaves the stored cart untouched.

use super::{Mediator, Request, RequestHandler};
use crate::domain::{Cart, CartItem};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// One line submitted by the add-to-cart tool.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    pub product_id: String,
    pub product_name: String,
    pub product_sku: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, String>>,
}

impl From<CartItemInput> for CartItem {
    fn from(input: CartItemInput) -> Self {
        CartItem {
            product_id: input.product_id,
            product_name: input.product_name,
            product_sku: input.product_sku,
            quantity: input.quantity,
            unit_price: input.unit_price,
            image_url: input.image_url,
            category: input.category,
            brand: input.brand,
            metadata: input.metadata.unwrap_or_default(),
        }
    }
}

/// Returned by every cart request.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    pub cart_id: String,
    pub cart: Cart,
    pub total_items: i32,
}

impl From<Cart> for CartSnapshot {
    fn from(cart: Cart) -> Self {
        Self {
            cart_id: cart.cart_id.clone(),
            total_items: cart.total_items(),
            cart,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AddToCart {
    pub cart_id: Option<String>,
    pub items: Vec<CartItemInput>,
}

impl Request for AddToCart {
    type Response = CartSnapshot;
}

#[async_trait]
impl RequestHandler<AddToCart> for Mediator {
    async fn handle(&self, request: AddToCart) -> Result<CartSnapshot> {
        // An empty id is treated like a missing one.
        let requested = request.cart_id.filter(|id| !id.is_empty());
        let existing = match requested.as_deref() {
            Some(id) => self.carts.get(id).await?,
            None => None,
        };

        let mut cart = match existing {
            Some(cart) => cart,
            None => {
                let cart_id = requested.unwrap_or_else(|| Uuid::new_v4().simple().to_string());
                self.carts.create(&cart_id).await?
            }
        };

        cart.add_items(request.items.into_iter().map(CartItem::from).collect())?;
        cart.touch();
        let cart = self.carts.update(cart).await?;
        Ok(cart.into())
    }
}

#[derive(Debug, Clone)]
pub struct UpdateCartItem {
    pub cart_id: String,
    pub product_id: String,
    pub quantity: i32,
}

impl Request for UpdateCartItem {
    type Response = CartSnapshot;
}

#[async_trait]
impl RequestHandler<UpdateCartItem> for Mediator {
    async fn handle(&self, request: UpdateCartItem) -> Result<CartSnapshot> {
        let mut cart = self.require_cart(&request.cart_id).await?;

        let item = cart
            .find_item_mut(&request.product_id)
            .ok_or_else(|| item_not_found(&request.cart_id, &request.product_id))?;

        if request.quantity <= 0 {
            cart.remove_item(&request.product_id);
        } else {
            item.quantity = request.quantity;
        }
        cart.check_limits()?;

        cart.touch();
        let cart = self.carts.update(cart).await?;
        Ok(cart.into())
    }
}

#[derive(Debug, Clone)]
pub struct RemoveFromCart {
    pub cart_id: String,
    pub product_id: String,
}

impl Request for RemoveFromCart {
    type Response = CartSnapshot;
}

#[async_trait]
impl RequestHandler<RemoveFromCart> for Mediator {
    async fn handle(&self, request: RemoveFromCart) -> Result<CartSnapshot> {
        let mut cart = self.require_cart(&request.cart_id).await?;

        if !cart.remove_item(&request.product_id) {
            return Err(item_not_found(&request.cart_id, &request.product_id));
        }

        cart.touch();
        let cart = self.carts.update(cart).await?;
        Ok(cart.into())
    }
}

#[derive(Debug, Clone)]
pub struct GetCart {
    pub cart_id: String,
}

impl Request for GetCart {
    type Response = CartSnapshot;
}

#[async_trait]
impl RequestHandler<GetCart> for Mediator {
    async fn handle(&self, request: GetCart) -> Result<CartSnapshot> {
        let cart = match self.carts.get(&request.cart_id).await? {
            Some(cart) => cart,
            None => self.carts.create(&request.cart_id).await?,
        };
        Ok(cart.into())
    }
}

impl Mediator {
    async fn require_cart(&self, cart_id: &str) -> Result<Cart> {
        self.carts
            .get(cart_id)
            .await?
            .ok_or_else(|| AppError::CartNotFound(cart_id.to_string()))
    }
}

fn item_not_found(cart_id: &str, product_id: &str) -> AppError {
    AppError::CartItemNotFound {
        cart_id: cart_id.to_string(),
        product_id: product_id.to_string(),
    }
}
