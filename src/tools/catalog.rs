//! Catalog tools: listing, comparison and facet discovery.

use super::{product_json, seller_name, STRUCTURED_CONTENT_MESSAGE};
use crate::application::catalog::{
    CompareProducts, GetAvailableBrands, GetAvailableCategories, GetCatalogList, DEFAULT_PAGE,
    DEFAULT_PAGE_SIZE,
};
use crate::application::Mediator;
use crate::error::Result;
use crate::mcp::metadata::{widget_session, ToolMetadata};
use crate::mcp::registry::{Arguments, RequestContext, Tool, ToolDescriptor, ToolOutput};
use crate::mcp::schema::ParamSpec;
use crate::state::AppState;
use crate::widgets::{CATALOG_URI, PRODUCT_COMPARISON_URI};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const SHOP_KEY_HELP: &str = "Shop key (string, REQUIRED). Get this value by calling \
    'get_available_sellers' tool first. Examples: 'mercury', 'coolbox', 'promart', \
    'plazavea', 'oechsle', 'wong', 'metrope'.";

const FACET_SHOP_KEY_HELP: &str = "Shop key (string, REQUIRED). Get this value by calling \
    'get_available_sellers' tool first. Must match a shopKey from the sellers list.";

// ===== catalog_list =====

pub struct CatalogListTool {
    mediator: Mediator,
}

#[async_trait]
impl Tool for CatalogListTool {
    fn descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: "catalog_list",
            title: "Browse catalog",
            description: "Retrieves a paginated list of products from the catalog. Supports \
                filtering by category and search. ALWAYS call 'get_available_sellers' first to \
                get shopKey.",
            params: vec![
                ParamSpec::of::<String>("shopKey", SHOP_KEY_HELP),
                ParamSpec::of::<Option<String>>(
                    "category",
                    "Category name filter (string, optional). Use 'get_available_categories' \
                     tool with the same shopKey to see all available categories. Leave null to \
                     show all categories.",
                ),
                ParamSpec::of::<Option<String>>(
                    "searchTerm",
                    "Search term to filter products by name or description (string, optional). \
                     Leave null to show all products.",
                ),
                ParamSpec::of::<i32>(
                    "page",
                    "Page number for pagination (int, optional, default: 1).",
                )
                .with_default(json!(DEFAULT_PAGE)),
                ParamSpec::of::<i32>(
                    "pageSize",
                    "Number of items per page (int, optional, default: 20).",
                )
                .with_default(json!(DEFAULT_PAGE_SIZE)),
                ParamSpec::of::<Option<String>>(
                    "cartId",
                    "Cart identifier for session persistence (string, optional). Use cartId \
                     from previous cart operations (get_cart, add_to_cart) to maintain cart \
                     state in the widget. Leave null to start a new session.",
                ),
            ],
            metadata: ToolMetadata::new("Running...", "Done.").widget(CATALOG_URI),
        }
    }

    fn resolve(state: &AppState, _ctx: &RequestContext) -> Self {
        Self {
            mediator: state.mediator.clone(),
        }
    }

    async fn call(&self, args: Arguments, _cancel: &CancellationToken) -> Result<ToolOutput> {
        let shop_key: String = args.require("shopKey")?;
        let cart_id = args
            .get::<String>("cartId")?
            .filter(|id| !id.is_empty());

        let page = self
            .mediator
            .send(GetCatalogList {
                shop_key: shop_key.clone(),
                category: args.get("category")?,
                search_term: args.get("searchTerm")?,
                page: args.require("page")?,
                page_size: args.require("pageSize")?,
            })
            .await?;
        let seller_name = seller_name(&self.mediator, &shop_key).await?;

        let products: Vec<Value> = page
            .products
            .iter()
            .map(|p| product_json(p, &seller_name, &shop_key))
            .collect();

        let mut structured = json!({
            "products": products,
            "totalCount": page.total_count,
            "page": page.page,
            "pageSize": page.page_size,
            "sellerName": seller_name,
            "shopKey": shop_key,
            "status": "completed",
        });

        if let Some(cart_id) = &cart_id {
            structured["cartId"] = json!(cart_id);
        }

        let output = ToolOutput::new(STRUCTURED_CONTENT_MESSAGE, structured);
        Ok(match cart_id {
            Some(cart_id) => output.with_meta(widget_session(&cart_id)),
            None => output,
        })
    }
}

// ===== product_comparison =====

pub struct ProductComparisonTool {
    mediator: Mediator,
}

#[async_trait]
impl Tool for ProductComparisonTool {
    fn descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: "product_comparison",
            title: "Compare products",
            description: "Compares multiple products by their IDs. Returns detailed product \
                information for side-by-side comparison. ALWAYS call 'get_available_sellers' \
                first to get shopKey.",
            params: vec![
                ParamSpec::of::<Vec<Uuid>>(
                    "productIds",
                    "Array of product IDs (Guid[], required). Must contain at least 2 product \
                     IDs to compare. Get product IDs from catalog_list results.",
                ),
                ParamSpec::of::<String>("shopKey", SHOP_KEY_HELP),
            ],
            metadata: ToolMetadata::new("Running...", "Done.").widget(PRODUCT_COMPARISON_URI),
        }
    }

    fn resolve(state: &AppState, _ctx: &RequestContext) -> Self {
        Self {
            mediator: state.mediator.clone(),
        }
    }

    async fn call(&self, args: Arguments, _cancel: &CancellationToken) -> Result<ToolOutput> {
        let product_ids: Vec<Uuid> = args.require("productIds")?;
        let shop_key: String = args.require("shopKey")?;

        let comparison = self
            .mediator
            .send(CompareProducts {
                product_ids,
                shop_key: shop_key.clone(),
            })
            .await?;
        let seller_name = seller_name(&self.mediator, &shop_key).await?;

        let products: Vec<Value> = comparison
            .products
            .iter()
            .map(|p| product_json(p, &seller_name, &shop_key))
            .collect();

        Ok(ToolOutput::new(
            STRUCTURED_CONTENT_MESSAGE,
            json!({
                "products": products,
                "comparisonData": comparison.comparison,
                "sellerName": seller_name,
                "shopKey": shop_key,
                "status": "completed",
            }),
        ))
    }
}

// ===== get_available_categories =====

pub struct GetAvailableCategoriesTool {
    mediator: Mediator,
}

#[async_trait]
impl Tool for GetAvailableCategoriesTool {
    fn descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: "get_available_categories",
            title: "List categories",
            description: "Retrieves all available product categories for a shop. Use the \
                shopKey from 'get_available_sellers'. Returns category names for use in \
                catalog_list filter.",
            params: vec![ParamSpec::of::<String>("shopKey", FACET_SHOP_KEY_HELP)],
            metadata: ToolMetadata::new("Running...", "Done."),
        }
    }

    fn resolve(state: &AppState, _ctx: &RequestContext) -> Self {
        Self {
            mediator: state.mediator.clone(),
        }
    }

    async fn call(&self, args: Arguments, _cancel: &CancellationToken) -> Result<ToolOutput> {
        let categories = self
            .mediator
            .send(GetAvailableCategories {
                shop_key: args.require("shopKey")?,
            })
            .await?;

        Ok(ToolOutput::new(
            STRUCTURED_CONTENT_MESSAGE,
            json!({ "count": categories.len(), "categories": categories }),
        ))
    }
}

// ===== get_available_brands =====

pub struct GetAvailableBrandsTool {
    mediator: Mediator,
}

#[async_trait]
impl Tool for GetAvailableBrandsTool {
    fn descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: "get_available_brands",
            title: "List brands",
            description: "Retrieves all available product brands for a shop. Use the shopKey \
                from 'get_available_sellers'. Returns brand names for reference.",
            params: vec![ParamSpec::of::<String>("shopKey", FACET_SHOP_KEY_HELP)],
            metadata: ToolMetadata::new("Running...", "Done."),
        }
    }

    fn resolve(state: &AppState, _ctx: &RequestContext) -> Self {
        Self {
            mediator: state.mediator.clone(),
        }
    }

    async fn call(&self, args: Arguments, _cancel: &CancellationToken) -> Result<ToolOutput> {
        let brands = self
            .mediator
            .send(GetAvailableBrands {
                shop_key: args.require("shopKey")?,
            })
            .await?;

        Ok(ToolOutput::new(
            STRUCTURED_CONTENT_MESSAGE,
            json!({ "count": brands.len(), "brands": brands }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::mcp::registry::RequestContext;
    use crate::state::AppState;
    use crate::tools::registry;
    use serde_json::{json, Value};
    use tokio_util::sync::CancellationToken;
    use uuid::Uuid;

    async fn call(name: &str, args: Value) -> Value {
        let state = AppState::default();
        registry()
            .unwrap()
            .call_tool(
                &state,
                RequestContext::default(),
                name,
                &args,
                &CancellationToken::new(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn catalog_list_pages_with_defaults() {
        let result = call("catalog_list", json!({ "shopKey": "wong" })).await;
        let data = &result["structuredContent"];

        assert_eq!(result["content"][0]["text"], "Data available in structuredContent");
        assert_eq!(data["totalCount"], 4);
        assert_eq!(data["page"], 1);
        assert_eq!(data["pageSize"], 20);
        assert_eq!(data["sellerName"], "Wong");
        assert_eq!(data["status"], "completed");
        assert_eq!(data["products"].as_array().unwrap().len(), 4);
        assert_eq!(data["products"][0]["shopKey"], "wong");
        assert!(data.get("cartId").is_none());
        assert_eq!(result["_meta"]["openai/outputTemplate"], "ui://widget/catalog.html");
        assert!(result["_meta"].get("openai/widgetSessionId").is_none());
    }

    #[tokio::test]
    async fn catalog_list_binds_widget_to_cart() {
        let result = call(
            "catalog_list",
            json!({ "shopKey": "unknown", "cartId": "cart-9", "page": "2", "pageSize": 3 }),
        )
        .await;
        let data = &result["structuredContent"];

        assert_eq!(data["cartId"], "cart-9");
        assert_eq!(data["sellerName"], "");
        assert_eq!(data["page"], 2);
        assert_eq!(data["products"].as_array().unwrap().len(), 1);
        assert_eq!(result["_meta"]["openai/widgetSessionId"], "cart-9");
    }

    #[tokio::test]
    async fn catalog_list_ignores_empty_cart_id() {
        let result = call("catalog_list", json!({ "shopKey": "wong", "cartId": "" })).await;
        assert!(result["structuredContent"].get("cartId").is_none());
        assert!(result["_meta"].get("openai/widgetSessionId").is_none());
    }

    #[tokio::test]
    async fn comparison_skips_unknown_and_empty_ids() {
        let first = Uuid::from_u128(1).to_string();
        let second = Uuid::from_u128(2).to_string();
        let missing = Uuid::from_u128(99).to_string();

        let result = call(
            "product_comparison",
            json!({ "productIds": [first, "", second, missing], "shopKey": "promart" }),
        )
        .await;
        let data = &result["structuredContent"];

        assert_eq!(data["products"].as_array().unwrap().len(), 2);
        assert_eq!(data["sellerName"], "Promart");
        let prices = &data["comparisonData"]["Price"];
        assert!(prices.get(first.as_str()).is_some());
        assert!(prices.get(second.as_str()).is_some());
        assert_eq!(
            result["_meta"]["openai/outputTemplate"],
            "ui://widget/product-comparison.html"
        );
    }

    #[tokio::test]
    async fn facets_report_counts() {
        let result = call("get_available_categories", json!({ "shopKey": "wong" })).await;
        assert_eq!(
            result["structuredContent"],
            json!({ "categories": ["Food", "Meat", "Produce"], "count": 3 })
        );
        assert!(result["_meta"].get("openai/outputTemplate").is_none());

        let result = call("get_available_brands", json!({ "shopKey": "wong" })).await;
        assert_eq!(result["structuredContent"]["count"], 3);
    }
}
