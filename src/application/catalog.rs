//! Catalog queries: paged listing, comparison, facets.

use super::{Mediator, Request, RequestHandler};
use crate::domain::Product;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

pub const DEFAULT_PAGE: i32 = 1;
pub const DEFAULT_PAGE_SIZE: i32 = 20;

#[derive(Debug, Clone)]
pub struct GetCatalogList {
    pub shop_key: String,
    pub category: Option<String>,
    pub search_term: Option<String>,
    pub page: i32,
    pub page_size: i32,
}

impl GetCatalogList {
    pub fn new(shop_key: impl Into<String>) -> Self {
        Self {
            shop_key: shop_key.into(),
            category: None,
            search_term: None,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub products: Vec<Product>,
    pub total_count: usize,
    pub page: i32,
    pub page_size: i32,
}

impl Request for GetCatalogList {
    type Response = CatalogPage;
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[async_trait]
impl RequestHandler<GetCatalogList> for Mediator {
    async fn handle(&self, request: GetCatalogList) -> Result<CatalogPage> {
        // A category filter takes precedence over free-text search.
        let products = if let Some(category) = non_blank(&request.category) {
            self.products
                .get_by_category(category, &request.shop_key)
                .await?
        } else if let Some(term) = non_blank(&request.search_term) {
            self.products.search(term, &request.shop_key).await?
        } else {
            self.products.get_all(&request.shop_key).await?
        };

        let total_count = products.len();
        let skip = request
            .page
            .saturating_sub(1)
            .saturating_mul(request.page_size)
            .max(0) as usize;
        let take = request.page_size.max(0) as usize;
        let products = products.into_iter().skip(skip).take(take).collect();

        Ok(CatalogPage {
            products,
            total_count,
            page: request.page,
            page_size: request.page_size,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CompareProducts {
    pub product_ids: Vec<Uuid>,
    pub shop_key: String,
}

/// Row name → product id → value.
pub type ComparisonTable = BTreeMap<String, BTreeMap<Uuid, Value>>;

#[derive(Debug, Clone)]
pub struct ProductComparison {
    pub products: Vec<Product>,
    pub comparison: ComparisonTable,
}

impl Request for CompareProducts {
    type Response = ProductComparison;
}

#[async_trait]
impl RequestHandler<CompareProducts> for Mediator {
    async fn handle(&self, request: CompareProducts) -> Result<ProductComparison> {
        let mut products = Vec::with_capacity(request.product_ids.len());
        for id in &request.product_ids {
            if let Some(product) = self.products.get_by_id(*id, &request.shop_key).await? {
                products.push(product);
            }
        }

        let mut comparison = ComparisonTable::new();
        for product in &products {
            let mut set = |row: &str, value: Value| {
                comparison
                    .entry(row.to_string())
                    .or_default()
                    .insert(product.id, value);
            };
            set("Price", json!(product.price));
            set("Stock", json!(product.stock));
            set("Category", json!(product.category));
            for (key, value) in &product.attributes {
                set(key, json!(value));
            }
        }

        Ok(ProductComparison {
            products,
            comparison,
        })
    }
}

#[derive(Debug, Clone)]
pub struct GetAvailableCategories {
    pub shop_key: String,
}

impl Request for GetAvailableCategories {
    type Response = Vec<String>;
}

#[async_trait]
impl RequestHandler<GetAvailableCategories> for Mediator {
    async fn handle(&self, request: GetAvailableCategories) -> Result<Vec<String>> {
        let products = self.products.get_all(&request.shop_key).await?;
        Ok(distinct_sorted(products.into_iter().map(|p| p.category)))
    }
}

#[derive(Debug, Clone)]
pub struct GetAvailableBrands {
    pub shop_key: String,
}

impl Request for GetAvailableBrands {
    type Response = Vec<String>;
}

#[async_trait]
impl RequestHandler<GetAvailableBrands> for Mediator {
    async fn handle(&self, request: GetAvailableBrands) -> Result<Vec<String>> {
        let products = self.products.get_all(&request.shop_key).await?;
        Ok(distinct_sorted(products.into_iter().map(|p| p.brand)))
    }
}

/// Drops blanks, de-duplicates ignoring case (first spelling wins), sorts.
fn distinct_sorted(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out: Vec<String> = values
        .filter(|v| !v.trim().is_empty())
        .filter(|v| seen.insert(v.to_lowercase()))
        .collect();
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_mediator;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[tokio::test]
    async fn catalog_list_returns_everything_by_default() {
        let page = test_mediator()
            .send(GetCatalogList::new("any"))
            .await
            .unwrap();
        assert_eq!(page.total_count, 4);
        assert_eq!(page.products.len(), 4);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 20);
    }

    #[tokio::test]
    async fn category_wins_over_search_term() {
        let request = GetCatalogList {
            category: Some("food".into()),
            search_term: Some("avocado".into()),
            ..GetCatalogList::new("any")
        };
        let page = test_mediator().send(request).await.unwrap();
        assert_eq!(page.total_count, 2);
        assert!(page.products.iter().all(|p| p.category == "Food"));
    }

    #[tokio::test]
    async fn blank_category_falls_through_to_search() {
        let request = GetCatalogList {
            category: Some("   ".into()),
            search_term: Some("pizza".into()),
            ..GetCatalogList::new("any")
        };
        let page = test_mediator().send(request).await.unwrap();
        assert_eq!(page.total_count, 2);
    }

    #[tokio::test]
    async fn paging_skips_and_takes() {
        let request = GetCatalogList {
            page: 2,
            page_size: 3,
            ..GetCatalogList::new("any")
        };
        let page = test_mediator().send(request).await.unwrap();
        assert_eq!(page.total_count, 4);
        assert_eq!(page.products.len(), 1);
        assert_eq!(page.products[0].id, id(4));

        let request = GetCatalogList {
            page: 0,
            page_size: 2,
            ..GetCatalogList::new("any")
        };
        let page = test_mediator().send(request).await.unwrap();
        assert_eq!(page.products.len(), 2);
    }

    #[tokio::test]
    async fn comparison_table_has_fixed_rows_and_attributes() {
        let result = test_mediator()
            .send(CompareProducts {
                product_ids: vec![id(1), id(999), id(2)],
                shop_key: "any".into(),
            })
            .await
            .unwrap();

        let ids: Vec<_> = result.products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![id(1), id(2)]);

        let price = result.comparison["Price"][&id(2)].as_f64().unwrap();
        assert!((price - 12.99).abs() < 1e-9);
        assert_eq!(result.comparison["Stock"][&id(1)], json!(50));
        assert_eq!(result.comparison["Category"][&id(2)], json!("Food"));
        assert_eq!(result.comparison["Calories"][&id(1)], json!("160"));
    }

    #[tokio::test]
    async fn categories_and_brands_are_distinct_and_sorted() {
        let mediator = test_mediator();
        let categories = mediator
            .send(GetAvailableCategories {
                shop_key: "any".into(),
            })
            .await
            .unwrap();
        assert_eq!(categories, vec!["Food", "Meat", "Produce"]);

        let brands = mediator
            .send(GetAvailableBrands {
                shop_key: "any".into(),
            })
            .await
            .unwrap();
        assert_eq!(brands, vec!["Artisan Pizza", "Farm Fresh", "Fresh Farm"]);
    }

    #[test]
    fn distinct_ignores_case_and_blanks() {
        let values = ["b", "B", "", "  ", "a"].into_iter().map(String::from);
        assert_eq!(distinct_sorted(values), vec!["a", "b"]);
    }
}
