//! Seller Domain Models

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Commerce platform a seller's catalog is hosted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SellerProvider {
    Vtex,
    Shopify,
}

impl fmt::Display for SellerProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SellerProvider::Vtex => f.write_str("Vtex"),
            SellerProvider::Shopify => f.write_str("Shopify"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    pub id: Uuid,
    pub name: String,
    pub provider: SellerProvider,

    /// Key used by catalog tools to select this seller's storefront.
    pub shop_key: String,
}

#[async_trait]
pub trait SellerRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Seller>>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Seller>>;

    /// Shop keys compare case-insensitively.
    async fn get_by_shop_key(&self, shop_key: &str) -> Result<Option<Seller>>;
}
