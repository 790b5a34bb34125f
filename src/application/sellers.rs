//! Seller queries.

use super::{Mediator, Request, RequestHandler};
use crate::domain::Seller;
use crate::error::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct GetAvailableSellers;

impl Request for GetAvailableSellers {
    type Response = Vec<Seller>;
}

#[async_trait]
impl RequestHandler<GetAvailableSellers> for Mediator {
    async fn handle(&self, _request: GetAvailableSellers) -> Result<Vec<Seller>> {
        self.sellers.get_all().await
    }
}

#[derive(Debug, Clone)]
pub struct GetSellerByShopKey {
    pub shop_key: String,
}

impl Request for GetSellerByShopKey {
    type Response = Option<Seller>;
}

#[async_trait]
impl RequestHandler<GetSellerByShopKey> for Mediator {
    async fn handle(&self, request: GetSellerByShopKey) -> Result<Option<Seller>> {
        self.sellers.get_by_shop_key(&request.shop_key).await
    }
}
