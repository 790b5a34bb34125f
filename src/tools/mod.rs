//! MCP Tools
//!
//! Every tool the server exposes, plus the JSON payload shapes shared by the
//! catalog and cart widgets.

pub mod cart;
pub mod catalog;
pub mod sellers;

use crate::application::{cart::CartSnapshot, sellers::GetSellerByShopKey, Mediator};
use crate::domain::Product;
use crate::error::Result;
use crate::mcp::helpers::strip_html;
use crate::mcp::registry::Registry;
use crate::widgets::{CartWidget, CatalogWidget, ProductComparisonWidget};
use serde_json::{json, Map, Value};

/// Message returned by tools whose whole answer is in `structuredContent`.
pub const STRUCTURED_CONTENT_MESSAGE: &str = "Data available in structuredContent";

/// Builds the registry of every tool and widget resource.
pub fn registry() -> Result<Registry> {
    Registry::builder()
        .tool::<sellers::GetAvailableSellersTool>()
        .tool::<catalog::CatalogListTool>()
        .tool::<catalog::ProductComparisonTool>()
        .tool::<catalog::GetAvailableCategoriesTool>()
        .tool::<catalog::GetAvailableBrandsTool>()
        .tool::<cart::AddToCartTool>()
        .tool::<cart::GetCartTool>()
        .tool::<cart::UpdateCartItemTool>()
        .tool::<cart::RemoveFromCartTool>()
        .tool::<cart::OpenCartWidgetTool>()
        .resource::<CatalogWidget>()
        .resource::<ProductComparisonWidget>()
        .resource::<CartWidget>()
        .build()
}

/// Display name of the seller behind `shop_key`, or empty when unknown.
async fn seller_name(mediator: &Mediator, shop_key: &str) -> Result<String> {
    let seller = mediator
        .send(GetSellerByShopKey {
            shop_key: shop_key.to_string(),
        })
        .await?;
    Ok(seller.map(|s| s.name).unwrap_or_default())
}

// =============================================================================
// Payloads
// =============================================================================

fn product_json(product: &Product, seller_name: &str, shop_key: &str) -> Value {
    json!({
        "id": product.id,
        "name": product.name,
        "description": strip_html(&product.description),
        "price": product.price,
        "sku": product.sku,
        "category": product.category,
        "brand": product.brand,
        "sellerName": seller_name,
        "shopKey": shop_key,
        "imageUrl": product.image_url,
        "imageUrls": product.display_images(),
        "stock": product.stock,
        "attributes": product.attributes,
        "features": product.features,
    })
}

fn cart_json(snapshot: &CartSnapshot) -> Map<String, Value> {
    let items: Vec<Value> = snapshot
        .cart
        .items
        .iter()
        .map(|item| {
            let mut line = Map::new();
            line.insert("productId".into(), json!(item.product_id));
            line.insert("productName".into(), json!(item.product_name));
            line.insert("productSku".into(), json!(item.product_sku));
            line.insert("quantity".into(), json!(item.quantity));
            line.insert("unitPrice".into(), json!(item.unit_price));
            line.insert("totalPrice".into(), json!(item.total_price()));
            line.insert(
                "imageUrl".into(),
                json!(item.image_url.as_deref().unwrap_or_default()),
            );

            let optional = [
                ("category", item.category.as_deref()),
                ("brand", item.brand.as_deref()),
                ("sellerName", item.metadata.get("sellerName").map(String::as_str)),
                ("shopKey", item.metadata.get("shopKey").map(String::as_str)),
            ];
            for (key, value) in optional {
                if let Some(value) = value.filter(|v| !v.is_empty()) {
                    line.insert(key.into(), json!(value));
                }
            }
            Value::Object(line)
        })
        .collect();

    let cart = &snapshot.cart;
    let mut payload = Map::new();
    payload.insert("cartId".into(), json!(snapshot.cart_id));
    payload.insert("items".into(), Value::Array(items));
    payload.insert("subTotal".into(), json!(cart.sub_total()));
    payload.insert("tax".into(), json!(cart.tax()));
    payload.insert("shipping".into(), json!(cart.shipping()));
    payload.insert("total".into(), json!(cart.total()));
    payload.insert("totalItems".into(), json!(snapshot.total_items));
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Cart, CartItem};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    #[test]
    fn registry_holds_every_tool_and_widget() {
        let registry = registry().unwrap();
        let names: Vec<&str> = registry.tools().iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            [
                "get_available_sellers",
                "catalog_list",
                "product_comparison",
                "get_available_categories",
                "get_available_brands",
                "add_to_cart",
                "get_cart",
                "update_cart_item",
                "remove_from_cart",
                "open_cart_widget",
            ]
        );
        assert_eq!(registry.resources().len(), 3);
        assert!(registry.find_resource("UI://WIDGET/CART.HTML").is_ok());
    }

    #[test]
    fn product_payload_strips_description_and_falls_back_to_single_image() {
        let product = Product {
            name: "Lamp".into(),
            description: "<p>Warm &amp; bright</p>".into(),
            image_url: "https://img/1.jpg".into(),
            price: dec!(12.5),
            ..Default::default()
        };
        let payload = product_json(&product, "Promart", "promart");
        assert_eq!(payload["description"], "Warm & bright");
        assert_eq!(payload["imageUrls"], json!(["https://img/1.jpg"]));
        assert_eq!(payload["sellerName"], "Promart");
        assert_eq!(payload["shopKey"], "promart");
        assert_eq!(payload["price"], 12.5);
    }

    #[test]
    fn cart_payload_lifts_seller_metadata() {
        let mut cart = Cart::new("c1");
        cart.add_items(vec![CartItem {
            product_id: "p1".into(),
            product_name: "Cheese".into(),
            product_sku: "CH-1".into(),
            quantity: 2,
            unit_price: dec!(5),
            category: Some("Food".into()),
            metadata: BTreeMap::from([
                ("shopKey".to_string(), "wong".to_string()),
                ("sellerName".to_string(), "Wong".to_string()),
            ]),
            ..Default::default()
        }])
        .unwrap();

        let payload = cart_json(&CartSnapshot::from(cart));
        let line = &payload["items"][0];
        assert_eq!(line["imageUrl"], "");
        assert_eq!(line["category"], "Food");
        assert!(line.get("brand").is_none());
        assert_eq!(line["sellerName"], "Wong");
        assert_eq!(line["shopKey"], "wong");
        assert_eq!(line["totalPrice"], 10.0);
        assert_eq!(payload["totalItems"], 2);
        let shipping = payload["shipping"].as_f64().unwrap();
        assert!((shipping - 5.99).abs() < 1e-9);
    }
}
