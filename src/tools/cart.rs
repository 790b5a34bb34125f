//! Cart tools.
//!
//! Every result is bound to the cart's widget instance through
//! `openai/widgetSessionId`, so the cart widget follows the same cart across
//! turns.

use super::{cart_json, seller_name};
use crate::application::cart::{
    AddToCart, CartItemInput, CartSnapshot, GetCart, RemoveFromCart, UpdateCartItem,
};
use crate::application::Mediator;
use crate::error::Result;
use crate::mcp::metadata::{widget_session, ToolMetadata};
use crate::mcp::registry::{Arguments, RequestContext, Tool, ToolDescriptor, ToolOutput};
use crate::mcp::schema::{Describe, FieldSpec, ParamSpec, TypeShape, WireType};
use crate::state::AppState;
use crate::widgets::CART_URI;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

impl Describe for CartItemInput {
    fn shape() -> TypeShape {
        TypeShape::new(WireType::Object(vec![
            FieldSpec::of::<String>("productId"),
            FieldSpec::of::<String>("productName"),
            FieldSpec::of::<String>("productSku"),
            FieldSpec::of::<i32>("quantity"),
            FieldSpec::of::<Decimal>("unitPrice"),
            FieldSpec::of::<Option<String>>("imageUrl"),
            FieldSpec::of::<Option<String>>("category"),
            FieldSpec::of::<Option<String>>("brand"),
            FieldSpec::of::<Option<BTreeMap<String, String>>>("metadata"),
        ]))
    }
}

const CART_ID_HELP: &str = "Cart identifier (string, required). Use the cartId returned from \
    add_to_cart, update_cart_item, remove_from_cart, or a previous get_cart call. This \
    maintains the cart session across multiple operations.";

const PRODUCT_ID_HELP: &str = "Product ID (string, required) of the cart item. Must match a \
    productId from an existing cart item.";

/// Cart payload plus the widget binding for the cart.
fn cart_output(text: String, snapshot: &CartSnapshot, status: bool) -> ToolOutput {
    let mut payload = cart_json(snapshot);
    if status {
        payload.insert("status".into(), json!("completed"));
    }
    ToolOutput::new(text, Value::Object(payload)).with_meta(widget_session(&snapshot.cart_id))
}

fn describe_cart(snapshot: &CartSnapshot) -> String {
    if snapshot.cart.items.is_empty() {
        format!("Cart {} is empty.", snapshot.cart_id)
    } else {
        format!("Cart {} has {} item(s).", snapshot.cart_id, snapshot.total_items)
    }
}

// ===== add_to_cart =====

pub struct AddToCartTool {
    mediator: Mediator,
}

#[async_trait]
impl Tool for AddToCartTool {
    fn descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: "add_to_cart",
            title: "Add to cart",
            description: "Adds items to the shopping cart. Creates a new cart if cartId is not \
                provided. Returns cartId for session persistence.",
            params: vec![
                ParamSpec::of::<Vec<CartItemInput>>(
                    "items",
                    "Array of items to add. Each item must include: productId, productName, \
                     productSku, quantity (must be > 0) and unitPrice; imageUrl, category, \
                     brand and metadata are optional.",
                ),
                ParamSpec::of::<Option<String>>(
                    "cartId",
                    "Existing cart identifier from a previous cart operation. Leave blank or \
                     null to create a new cart.",
                ),
                ParamSpec::of::<Option<String>>(
                    "shopKey",
                    "Shop key (string, optional). Get this value by calling \
                     'get_available_sellers' tool first. Used to identify the seller/store.",
                ),
            ],
            metadata: ToolMetadata::new("Adding products to cart...", "Products added to cart."),
        }
    }

    fn resolve(state: &AppState, _ctx: &RequestContext) -> Self {
        Self {
            mediator: state.mediator.clone(),
        }
    }

    async fn call(&self, args: Arguments, _cancel: &CancellationToken) -> Result<ToolOutput> {
        let items: Vec<CartItemInput> = args.require("items")?;
        let shop_key = args
            .get::<String>("shopKey")?
            .filter(|key| !key.is_empty());

        let seller_name = match &shop_key {
            Some(key) => Some(seller_name(&self.mediator, key).await?).filter(|n| !n.is_empty()),
            None => None,
        };

        let items = items
            .into_iter()
            .map(|mut item| {
                let metadata = item.metadata.get_or_insert_with(BTreeMap::new);
                if let Some(key) = &shop_key {
                    metadata
                        .entry("shopKey".into())
                        .or_insert_with(|| key.clone());
                }
                if let Some(name) = &seller_name {
                    metadata
                        .entry("sellerName".into())
                        .or_insert_with(|| name.clone());
                }
                item
            })
            .collect();

        let snapshot = self
            .mediator
            .send(AddToCart {
                cart_id: args.get("cartId")?,
                items,
            })
            .await?;

        let text = format!(
            "Cart {} now has {} item(s).",
            snapshot.cart_id, snapshot.total_items
        );
        Ok(cart_output(text, &snapshot, false))
    }
}

// ===== get_cart =====

pub struct GetCartTool {
    mediator: Mediator,
}

#[async_trait]
impl Tool for GetCartTool {
    fn descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: "get_cart",
            title: "Show cart",
            description: "Retrieves the current state of a shopping cart by cartId. Returns all \
                items, totals, and cart metadata. Use cartId from previous cart operations.",
            params: vec![ParamSpec::of::<String>("cartId", CART_ID_HELP)],
            metadata: ToolMetadata::new("Retrieving cart...", "Cart retrieved.").widget(CART_URI),
        }
    }

    fn resolve(state: &AppState, _ctx: &RequestContext) -> Self {
        Self {
            mediator: state.mediator.clone(),
        }
    }

    async fn call(&self, args: Arguments, _cancel: &CancellationToken) -> Result<ToolOutput> {
        let snapshot = self
            .mediator
            .send(GetCart {
                cart_id: args.require("cartId")?,
            })
            .await?;
        Ok(cart_output(describe_cart(&snapshot), &snapshot, true))
    }
}

// ===== open_cart_widget =====

/// Same payload as `get_cart`; exists so the model has an explicit
/// "show me my cart" action.
pub struct OpenCartWidgetTool {
    mediator: Mediator,
}

#[async_trait]
impl Tool for OpenCartWidgetTool {
    fn descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: "open_cart_widget",
            title: "Open cart",
            description: "Opens the shopping cart widget to display the current cart contents. \
                Use this when the user wants to view their cart. Requires cartId from previous \
                cart operations.",
            params: vec![ParamSpec::of::<String>("cartId", CART_ID_HELP)],
            metadata: ToolMetadata::new("Opening cart...", "Cart opened.").widget(CART_URI),
        }
    }

    fn resolve(state: &AppState, _ctx: &RequestContext) -> Self {
        Self {
            mediator: state.mediator.clone(),
        }
    }

    async fn call(&self, args: Arguments, _cancel: &CancellationToken) -> Result<ToolOutput> {
        let snapshot = self
            .mediator
            .send(GetCart {
                cart_id: args.require("cartId")?,
            })
            .await?;
        Ok(cart_output(describe_cart(&snapshot), &snapshot, true))
    }
}

// ===== update_cart_item =====

pub struct UpdateCartItemTool {
    mediator: Mediator,
}

#[async_trait]
impl Tool for UpdateCartItemTool {
    fn descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: "update_cart_item",
            title: "Update cart item",
            description: "Updates the quantity of a specific item in the cart. Set quantity to \
                0 to remove the item. Returns updated cart state.",
            params: vec![
                ParamSpec::of::<String>("cartId", CART_ID_HELP),
                ParamSpec::of::<String>("productId", PRODUCT_ID_HELP),
                ParamSpec::of::<i32>(
                    "quantity",
                    "New quantity (int, required). Must be >= 0. Set to 0 to remove the item \
                     from the cart.",
                ),
            ],
            metadata: ToolMetadata::new("Updating cart item...", "Item updated."),
        }
    }

    fn resolve(state: &AppState, _ctx: &RequestContext) -> Self {
        Self {
            mediator: state.mediator.clone(),
        }
    }

    async fn call(&self, args: Arguments, _cancel: &CancellationToken) -> Result<ToolOutput> {
        let quantity: i32 = args.require("quantity")?;
        let snapshot = self
            .mediator
            .send(UpdateCartItem {
                cart_id: args.require("cartId")?,
                product_id: args.require("productId")?,
                quantity,
            })
            .await?;

        let text = if quantity <= 0 {
            format!("Item removed from cart {}.", snapshot.cart_id)
        } else {
            format!(
                "Quantity updated in cart {}. Total: {} item(s).",
                snapshot.cart_id, snapshot.total_items
            )
        };
        Ok(cart_output(text, &snapshot, false))
    }
}

// ===== remove_from_cart =====

pub struct RemoveFromCartTool {
    mediator: Mediator,
}

#[async_trait]
impl Tool for RemoveFromCartTool {
    fn descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: "remove_from_cart",
            title: "Remove from cart",
            description: "Removes a specific item from the cart by productId. Returns updated \
                cart state after removal.",
            params: vec![
                ParamSpec::of::<String>("cartId", CART_ID_HELP),
                ParamSpec::of::<String>("productId", PRODUCT_ID_HELP),
            ],
            metadata: ToolMetadata::new("Removing item from cart...", "Item removed."),
        }
    }

    fn resolve(state: &AppState, _ctx: &RequestContext) -> Self {
        Self {
            mediator: state.mediator.clone(),
        }
    }

    async fn call(&self, args: Arguments, _cancel: &CancellationToken) -> Result<ToolOutput> {
        let snapshot = self
            .mediator
            .send(RemoveFromCart {
                cart_id: args.require("cartId")?,
                product_id: args.require("productId")?,
            })
            .await?;

        let text = format!(
            "Item removed from cart {}. Total: {} item(s).",
            snapshot.cart_id, snapshot.total_items
        );
        Ok(cart_output(text, &snapshot, false))
    }
}

#[cfg(test)]
mod tests {
    use crate::mcp::registry::{Registry, RequestContext};
    use crate::state::AppState;
    use crate::tools::registry;
    use serde_json::{json, Value};
    use tokio_util::sync::CancellationToken;

    struct Harness {
        state: AppState,
        registry: Registry,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                state: AppState::default(),
                registry: registry().unwrap(),
            }
        }

        async fn call(&self, name: &str, args: Value) -> Value {
            self.registry
                .call_tool(
                    &self.state,
                    RequestContext::default(),
                    name,
                    &args,
                    &CancellationToken::new(),
                )
                .await
                .unwrap()
        }
    }

    fn cheese(quantity: i32) -> Value {
        json!({
            "productId": "p-1",
            "productName": "Cheese",
            "productSku": "CH-1",
            "quantity": quantity,
            "unitPrice": 4.5
        })
    }

    #[tokio::test]
    async fn add_stamps_seller_and_binds_widget() {
        let h = Harness::new();
        let result = h
            .call(
                "add_to_cart",
                json!({ "cartId": "c1", "shopKey": "wong", "items": [cheese(2)] }),
            )
            .await;

        assert_eq!(result["content"][0]["text"], "Cart c1 now has 2 item(s).");
        let data = &result["structuredContent"];
        assert_eq!(data["cartId"], "c1");
        assert_eq!(data["items"][0]["shopKey"], "wong");
        assert_eq!(data["items"][0]["sellerName"], "Wong");
        assert!(data.get("status").is_none());
        assert_eq!(result["_meta"]["openai/widgetSessionId"], "c1");
    }

    #[tokio::test]
    async fn add_keeps_caller_metadata_and_skips_unknown_seller() {
        let h = Harness::new();
        let mut item = cheese(1);
        item["metadata"] = json!({ "shopKey": "custom" });

        let result = h
            .call("add_to_cart", json!({ "shopKey": "nowhere", "items": [item] }))
            .await;
        let line = &result["structuredContent"]["items"][0];
        assert_eq!(line["shopKey"], "custom");
        assert!(line.get("sellerName").is_none());

        let cart_id = result["structuredContent"]["cartId"].as_str().unwrap();
        assert_eq!(cart_id.len(), 32);
    }

    #[tokio::test]
    async fn add_rejects_malformed_items() {
        let h = Harness::new();
        let err = h
            .registry
            .call_tool(
                &h.state,
                RequestContext::default(),
                "add_to_cart",
                &json!({ "items": [{ "productId": "p-1" }] }),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.rpc_code(), -32602);
    }

    #[tokio::test]
    async fn full_cart_flow() {
        let h = Harness::new();
        h.call("add_to_cart", json!({ "cartId": "c2", "items": [cheese(2)] }))
            .await;
        h.call("add_to_cart", json!({ "cartId": "c2", "items": [cheese(1)] }))
            .await;

        let result = h.call("get_cart", json!({ "cartId": "c2" })).await;
        assert_eq!(result["content"][0]["text"], "Cart c2 has 3 item(s).");
        assert_eq!(result["structuredContent"]["status"], "completed");
        assert_eq!(result["structuredContent"]["items"][0]["quantity"], 3);
        assert_eq!(result["_meta"]["openai/outputTemplate"], "ui://widget/cart.html");

        let result = h
            .call(
                "update_cart_item",
                json!({ "cartId": "c2", "productId": "p-1", "quantity": 5 }),
            )
            .await;
        assert_eq!(
            result["content"][0]["text"],
            "Quantity updated in cart c2. Total: 5 item(s)."
        );

        let result = h
            .call(
                "update_cart_item",
                json!({ "cartId": "c2", "productId": "p-1", "quantity": 0 }),
            )
            .await;
        assert_eq!(result["content"][0]["text"], "Item removed from cart c2.");
        assert_eq!(result["structuredContent"]["totalItems"], 0);

        let result = h.call("open_cart_widget", json!({ "cartId": "c2" })).await;
        assert_eq!(result["content"][0]["text"], "Cart c2 is empty.");
        assert_eq!(result["_meta"]["openai/toolInvocation/invoked"], "Cart opened.");
    }

    #[tokio::test]
    async fn remove_reports_remaining_items() {
        let h = Harness::new();
        let mut other = cheese(1);
        other["productId"] = json!("p-2");
        h.call(
            "add_to_cart",
            json!({ "cartId": "c3", "items": [cheese(2), other] }),
        )
        .await;

        let result = h
            .call("remove_from_cart", json!({ "cartId": "c3", "productId": "p-1" }))
            .await;
        assert_eq!(
            result["content"][0]["text"],
            "Item removed from cart c3. Total: 1 item(s)."
        );
    }

    #[tokio::test]
    async fn missing_cart_or_line_is_a_tool_error() {
        let h = Harness::new();
        let result = h
            .call("remove_from_cart", json!({ "cartId": "ghost", "productId": "p-1" }))
            .await;
        assert_eq!(result["isError"], true);
        assert_eq!(result["content"][0]["text"], "Cart ghost not found");

        h.call("add_to_cart", json!({ "cartId": "c4", "items": [cheese(1)] }))
            .await;
        let result = h
            .call(
                "update_cart_item",
                json!({ "cartId": "c4", "productId": "nope", "quantity": 2 }),
            )
            .await;
        assert_eq!(result["isError"], true);
        assert_eq!(
            result["content"][0]["text"],
            "Product nope not found in cart c4"
        );
    }
}
