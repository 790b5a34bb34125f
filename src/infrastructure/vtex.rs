//! VTEX storefront catalog
//!
//! Products are read from the public catalog search API of the store named by
//! the shop key (`https://{shop}.vtexcommercestable.com.br`). Network and
//! decoding failures are logged and surface as empty results; the catalog
//! tools never fail because a storefront is down.

use crate::domain::{Product, ProductRepository};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::{collections::BTreeMap, time::Duration};
use tracing::{error, info, warn};
use uuid::Uuid;

const ORDER_BY: (&str, &str) = ("O", "OrderByPriceDESC");

// =============================================================================
// Wire DTOs
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VtexProduct {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub product_reference: Option<String>,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    #[serde(default)]
    pub items: Vec<VtexItem>,
    #[serde(default)]
    pub images: Vec<VtexImage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VtexItem {
    pub item_id: Option<String>,
    #[serde(default)]
    pub reference_id: Vec<VtexReferenceId>,
    #[serde(default)]
    pub images: Vec<VtexImage>,
    #[serde(default)]
    pub sellers: Vec<VtexSeller>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VtexReferenceId {
    #[serde(rename = "Key")]
    pub key: Option<String>,
    #[serde(rename = "Value")]
    pub value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VtexImage {
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VtexSeller {
    pub commertial_offer: Option<VtexOffer>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct VtexOffer {
    #[serde(rename = "Price")]
    pub price: Option<Decimal>,
    #[serde(rename = "AvailableQuantity")]
    pub available_quantity: Option<i32>,
}

impl VtexOffer {
    fn price(&self) -> Decimal {
        self.price.unwrap_or_default()
    }

    fn stock(&self) -> i32 {
        self.available_quantity.unwrap_or_default()
    }
}

// =============================================================================
// Repository
// =============================================================================

pub struct VtexProductRepository {
    client: reqwest::Client,
}

impl VtexProductRepository {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn fetch(&self, shop_key: &str, query: &[(&str, &str)]) -> Result<Vec<Product>> {
        let url = search_url(shop_key)?;
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        let raw: Vec<VtexProduct> = response.json().await?;

        if raw.is_empty() {
            warn!(shop_key, "no products returned from VTEX");
            return Ok(Vec::new());
        }

        let products: Vec<Product> = raw.into_iter().filter_map(map_product).collect();
        info!(shop_key, count = products.len(), "mapped VTEX products");
        Ok(products)
    }

    /// Runs a fetch, logging and swallowing any failure.
    async fn fetch_or_empty(&self, shop_key: &str, query: &[(&str, &str)]) -> Vec<Product> {
        match self.fetch(shop_key, query).await {
            Ok(products) => products,
            Err(err) => {
                error!(shop_key, error = %err, "VTEX catalog request failed");
                Vec::new()
            }
        }
    }
}

pub fn search_url(shop_key: &str) -> Result<String> {
    let shop_key = shop_key.trim();
    if shop_key.is_empty() {
        return Err(AppError::Config(
            "a shop key is required for the VTEX catalog".into(),
        ));
    }
    Ok(format!(
        "https://{shop_key}.vtexcommercestable.com.br/api/catalog_system/pub/products/search"
    ))
}

#[async_trait]
impl ProductRepository for VtexProductRepository {
    async fn get_all(&self, shop_key: &str) -> Result<Vec<Product>> {
        self.search("", shop_key).await
    }

    async fn get_by_id(&self, id: Uuid, shop_key: &str) -> Result<Option<Product>> {
        let products = self.search(&id.to_string(), shop_key).await?;
        Ok(products.into_iter().find(|p| p.id == id))
    }

    async fn get_by_category(&self, category: &str, shop_key: &str) -> Result<Vec<Product>> {
        info!(category, shop_key, "searching VTEX products by category");
        let filter = format!("C:/{category}/");
        Ok(self
            .fetch_or_empty(shop_key, &[("fq", filter.as_str()), ORDER_BY])
            .await)
    }

    async fn search(&self, search_term: &str, shop_key: &str) -> Result<Vec<Product>> {
        info!(search_term, shop_key, "searching VTEX products");
        let products = if search_term.trim().is_empty() {
            self.fetch_or_empty(shop_key, &[ORDER_BY]).await
        } else {
            self.fetch_or_empty(shop_key, &[("ft", search_term), ORDER_BY])
                .await
        };
        Ok(products)
    }
}

// =============================================================================
// Mapping
// =============================================================================

/// Picks the offer a product is listed with, searching every seller of every
/// item. Returns the owning item index and the offer.
///
/// 1. priced and in stock: highest price, ties broken by stock
/// 2. priced: highest price
/// 3. in stock: highest stock
fn best_offer(items: &[VtexItem]) -> Option<(usize, VtexOffer)> {
    let offers: Vec<(usize, VtexOffer)> = items
        .iter()
        .enumerate()
        .flat_map(|(idx, item)| {
            item.sellers
                .iter()
                .filter_map(move |s| s.commertial_offer.map(|o| (idx, o)))
        })
        .collect();

    pick_offer(
        &offers,
        |o| o.price() > Decimal::ZERO && o.stock() > 0,
        |o, b| o.price() > b.price() || (o.price() == b.price() && o.stock() > b.stock()),
    )
    .or_else(|| {
        pick_offer(
            &offers,
            |o| o.price() > Decimal::ZERO,
            |o, b| o.price() > b.price(),
        )
    })
    .or_else(|| pick_offer(&offers, |o| o.stock() > 0, |o, b| o.stock() > b.stock()))
}

/// First offer passing `keep`, replaced only by offers that are `better`.
fn pick_offer<K, B>(offers: &[(usize, VtexOffer)], keep: K, better: B) -> Option<(usize, VtexOffer)>
where
    K: Fn(&VtexOffer) -> bool,
    B: Fn(&VtexOffer, &VtexOffer) -> bool,
{
    let mut best: Option<(usize, VtexOffer)> = None;
    for (idx, offer) in offers.iter().filter(|(_, o)| keep(o)) {
        let replace = match &best {
            Some((_, current)) => better(offer, current),
            None => true,
        };
        if replace {
            best = Some((*idx, *offer));
        }
    }
    best
}

fn image_urls(images: &[VtexImage]) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for url in images.iter().filter_map(|i| i.image_url.as_deref()) {
        if !url.trim().is_empty() && !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
        }
    }
    urls
}

/// Stable id for a VTEX product. Numeric VTEX ids are hashed into a
/// name-based UUID so the same product always gets the same id.
pub fn product_uuid(product_id: &str) -> Uuid {
    Uuid::parse_str(product_id)
        .unwrap_or_else(|_| Uuid::new_v5(&Uuid::NAMESPACE_OID, product_id.as_bytes()))
}

/// Converts a VTEX search hit into a [`Product`]. Products without an id or
/// without a usable offer are dropped.
pub fn map_product(raw: VtexProduct) -> Option<Product> {
    let product_id = raw.product_id.as_deref().map(str::trim).unwrap_or_default();
    if product_id.is_empty() {
        return None;
    }

    let Some((best_idx, offer)) = best_offer(&raw.items) else {
        warn!(product_id, "VTEX product has no valid commercial offer");
        return None;
    };
    let best_item = &raw.items[best_idx];

    let mut images = image_urls(&best_item.images);
    if best_item.images.is_empty() {
        if let Some(item) = raw.items.iter().find(|i| !i.images.is_empty()) {
            images = image_urls(&item.images);
        }
    }
    if images.is_empty() {
        images = image_urls(&raw.images);
    }

    let attributes: BTreeMap<String, String> = best_item
        .reference_id
        .iter()
        .filter_map(|r| match (r.key.as_deref(), r.value.as_deref()) {
            (Some(k), Some(v)) if !k.trim().is_empty() && !v.trim().is_empty() => {
                Some((k.to_string(), v.to_string()))
            }
            _ => None,
        })
        .collect();

    let sku = best_item
        .item_id
        .clone()
        .or_else(|| raw.product_reference.clone())
        .unwrap_or_default();

    Some(Product {
        id: product_uuid(product_id),
        name: raw.product_name.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        price: offer.price(),
        sku,
        category: raw.category_name.or(raw.category_id).unwrap_or_default(),
        brand: raw.brand.unwrap_or_default(),
        image_url: images.first().cloned().unwrap_or_default(),
        image_urls: images,
        stock: offer.stock(),
        attributes,
        features: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> VtexProduct {
        serde_json::from_value(value).unwrap()
    }

    fn offer(price: f64, stock: i32) -> serde_json::Value {
        json!({ "commertialOffer": { "Price": price, "AvailableQuantity": stock } })
    }

    #[test]
    fn prefers_priced_offers_in_stock() {
        let raw = parse(json!({
            "productId": "42",
            "productName": "TV",
            "items": [
                { "itemId": "a", "sellers": [offer(999.0, 0)] },
                { "itemId": "b", "sellers": [offer(500.0, 3), offer(500.0, 7)] },
                { "itemId": "c", "sellers": [offer(300.0, 10)] }
            ]
        }));

        let product = map_product(raw).unwrap();
        assert_eq!(product.sku, "b");
        assert_eq!(product.price, dec!(500));
        assert_eq!(product.stock, 7);
    }

    #[test]
    fn falls_back_to_priced_then_stocked() {
        let priced = parse(json!({
            "productId": "1",
            "items": [{ "itemId": "x", "sellers": [offer(10.0, 0), offer(20.0, 0)] }]
        }));
        assert_eq!(map_product(priced).unwrap().price, dec!(20));

        let stocked = parse(json!({
            "productId": "2",
            "items": [{ "itemId": "y", "sellers": [offer(0.0, 4), offer(0.0, 9)] }]
        }));
        let product = map_product(stocked).unwrap();
        assert_eq!(product.price, Decimal::ZERO);
        assert_eq!(product.stock, 9);
    }

    #[test]
    fn drops_products_without_offer_or_id() {
        let no_offer = parse(json!({
            "productId": "1",
            "items": [{ "itemId": "x", "sellers": [offer(0.0, 0)] }]
        }));
        assert!(map_product(no_offer).is_none());

        let no_id = parse(json!({ "items": [{ "sellers": [offer(1.0, 1)] }] }));
        assert!(map_product(no_id).is_none());
    }

    #[test]
    fn images_fall_back_to_other_items_then_product() {
        let raw = parse(json!({
            "productId": "1",
            "images": [{ "imageUrl": "https://p/1.jpg" }],
            "items": [
                { "itemId": "a", "sellers": [offer(5.0, 1)] },
                { "itemId": "b", "images": [
                    { "imageUrl": "https://i/1.jpg" },
                    { "imageUrl": "https://i/1.jpg" },
                    { "imageUrl": "" }
                ] }
            ]
        }));
        let product = map_product(raw).unwrap();
        assert_eq!(product.image_urls, vec!["https://i/1.jpg"]);
        assert_eq!(product.image_url, "https://i/1.jpg");

        let raw = parse(json!({
            "productId": "1",
            "images": [{ "imageUrl": "https://p/1.jpg" }],
            "items": [{ "itemId": "a", "sellers": [offer(5.0, 1)] }]
        }));
        assert_eq!(map_product(raw).unwrap().image_urls, vec!["https://p/1.jpg"]);
    }

    #[test]
    fn reference_ids_become_attributes() {
        let raw = parse(json!({
            "productId": "1",
            "productReference": "REF-1",
            "categoryId": "12",
            "items": [{
                "sellers": [offer(5.0, 1)],
                "referenceId": [
                    { "Key": "RefId", "Value": "ABC" },
                    { "Key": "Empty", "Value": " " }
                ]
            }]
        }));
        let product = map_product(raw).unwrap();
        assert_eq!(product.sku, "REF-1");
        assert_eq!(product.category, "12");
        assert_eq!(product.attributes.len(), 1);
        assert_eq!(product.attributes["RefId"], "ABC");
    }

    #[test]
    fn numeric_ids_map_to_stable_uuids() {
        assert_eq!(product_uuid("12345"), product_uuid("12345"));
        assert_ne!(product_uuid("12345"), product_uuid("12346"));

        let guid = "6f1c1f7e-8c3a-4d5e-9b8a-1234567890ab";
        assert_eq!(product_uuid(guid).to_string(), guid);
    }

    #[test]
    fn search_url_requires_shop_key() {
        assert!(search_url("  ").is_err());
        assert_eq!(
            search_url("wong").unwrap(),
            "https://wong.vtexcommercestable.com.br/api/catalog_system/pub/products/search"
        );
    }
}
