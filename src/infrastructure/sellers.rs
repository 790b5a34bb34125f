use crate::domain::{Seller, SellerProvider, SellerRepository};
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// The VTEX storefronts the demo knows about.
pub struct InMemorySellerRepository {
    sellers: Vec<Seller>,
}

impl Default for InMemorySellerRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySellerRepository {
    pub fn new() -> Self {
        let sellers = [
            (2, "Coolbox", "coolbox"),
            (3, "Shopstar", "mercury"),
            (4, "Promart", "promart"),
            (5, "Plaza Vea", "plazavea"),
            (6, "OE", "oechsle"),
            (7, "Wong", "wong"),
            (8, "Metro", "metrope"),
        ]
        .into_iter()
        .map(|(id, name, shop_key)| Seller {
            id: Uuid::from_u128(id),
            name: name.into(),
            provider: SellerProvider::Vtex,
            shop_key: shop_key.into(),
        })
        .collect();

        Self { sellers }
    }
}

#[async_trait]
impl SellerRepository for InMemorySellerRepository {
    async fn get_all(&self) -> Result<Vec<Seller>> {
        Ok(self.sellers.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Seller>> {
        Ok(self.sellers.iter().find(|s| s.id == id).cloned())
    }

    async fn get_by_shop_key(&self, shop_key: &str) -> Result<Option<Seller>> {
        Ok(self
            .sellers
            .iter()
            .find(|s| s.shop_key.eq_ignore_ascii_case(shop_key))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_by_id_and_shop_key() {
        let repo = InMemorySellerRepository::new();
        let wong = repo.get_by_id(Uuid::from_u128(7)).await.unwrap().unwrap();
        assert_eq!(wong.shop_key, "wong");

        let metro = repo.get_by_shop_key("MetroPE").await.unwrap().unwrap();
        assert_eq!(metro.name, "Metro");
        assert_eq!(metro.provider, SellerProvider::Vtex);
    }
}
