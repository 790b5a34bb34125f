//! Catalog Domain Models

use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A product as exposed by a seller's catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub sku: String,
    pub category: String,
    pub brand: String,

    /// First image, kept for widgets that only read a single URL.
    pub image_url: String,
    pub image_urls: Vec<String>,
    pub stock: i32,
    pub attributes: BTreeMap<String, String>,
    pub features: Vec<String>,
}

impl Product {
    /// `image_urls` when populated, otherwise the single `image_url`.
    pub fn display_images(&self) -> Vec<String> {
        if !self.image_urls.is_empty() {
            return self
                .image_urls
                .iter()
                .filter(|url| !url.is_empty())
                .cloned()
                .collect();
        }
        if self.image_url.is_empty() {
            Vec::new()
        } else {
            vec![self.image_url.clone()]
        }
    }
}

/// Read access to a catalog. Every lookup is scoped to a shop key; backends
/// that serve a single catalog may ignore it.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn get_all(&self, shop_key: &str) -> Result<Vec<Product>>;
    async fn get_by_id(&self, id: Uuid, shop_key: &str) -> Result<Option<Product>>;
    async fn get_by_category(&self, category: &str, shop_key: &str) -> Result<Vec<Product>>;
    async fn search(&self, search_term: &str, shop_key: &str) -> Result<Vec<Product>>;
}
