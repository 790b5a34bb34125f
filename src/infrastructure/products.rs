//! Fixed demo catalog. The shop key is accepted and ignored.

use crate::domain::{Product, ProductRepository};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use uuid::Uuid;

pub struct InMemoryProductRepository {
    products: Vec<Product>,
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            products: demo_products(),
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn get_all(&self, _shop_key: &str) -> Result<Vec<Product>> {
        Ok(self.products.clone())
    }

    async fn get_by_id(&self, id: Uuid, _shop_key: &str) -> Result<Option<Product>> {
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }

    async fn get_by_category(&self, category: &str, _shop_key: &str) -> Result<Vec<Product>> {
        Ok(self
            .products
            .iter()
            .filter(|p| p.category.eq_ignore_ascii_case(category))
            .cloned()
            .collect())
    }

    async fn search(&self, search_term: &str, _shop_key: &str) -> Result<Vec<Product>> {
        let term = search_term.to_lowercase();
        Ok(self
            .products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&term)
                    || p.description.to_lowercase().contains(&term)
                    || p.sku.to_lowercase().contains(&term)
            })
            .cloned()
            .collect())
    }
}

fn unsplash(photo: &str) -> String {
    format!("https://images.unsplash.com/photo-{photo}?w=800&h=800&fit=crop")
}

fn pairs(items: &[(&str, &str)]) -> BTreeMap<String, String> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn demo_products() -> Vec<Product> {
    vec![
        Product {
            id: Uuid::from_u128(1),
            name: "Avocados".into(),
            description: "Creamy Hass avocados picked at peak ripeness. Ideal for smashing into \
                          guacamole or topping tacos. Perfectly ripe and ready for slicing. Rich \
                          in healthy fats and naturally creamy."
                .into(),
            price: dec!(1.00),
            sku: "AVO-001".into(),
            category: "Produce".into(),
            brand: "Fresh Farm".into(),
            image_url: unsplash("1523049673857-eb18f1d7b578"),
            image_urls: vec![
                unsplash("1523049673857-eb18f1d7b578"),
                unsplash("1601034913836-a1f3e82555b0"),
                unsplash("1584270354949-c26b0d5b4a0c"),
            ],
            stock: 50,
            attributes: pairs(&[
                ("Fiber", "7g"),
                ("Fat", "15g"),
                ("Potassium", "485mg"),
                ("Calories", "160"),
                ("Package", "3 ct"),
                ("PricePerUnit", "$1.00/ea"),
            ]),
            features: strings(&[
                "Picked at peak ripeness",
                "Perfect for guacamole",
                "Rich in healthy fats",
                "Naturally creamy texture",
                "Ready to eat",
            ]),
        },
        Product {
            id: Uuid::from_u128(2),
            name: "Hojicha Pizza".into(),
            description: "Delicious pizza with hojicha sauce & honey. A unique blend of roasted \
                          green tea flavor with sweet honey drizzle."
                .into(),
            price: dec!(12.99),
            sku: "PIZ-001".into(),
            category: "Food".into(),
            brand: "Artisan Pizza".into(),
            image_url: unsplash("1513104890138-7c749659a591"),
            image_urls: vec![
                unsplash("1513104890138-7c749659a591"),
                unsplash("1574071318508-1cdbab80d002"),
                unsplash("1565299624946-b28f40a0ae38"),
            ],
            stock: 20,
            attributes: pairs(&[
                ("Protein", "18g"),
                ("Carbs", "35g"),
                ("Fat", "12g"),
                ("Calories", "320"),
                ("Size", "12 inch"),
            ]),
            features: strings(&[
                "Roasted green tea flavor",
                "Sweet honey drizzle",
                "Hand-crafted dough",
                "Fresh ingredients",
                "12 inch size",
            ]),
        },
        Product {
            id: Uuid::from_u128(3),
            name: "Pesto & Tomatoes Pizza".into(),
            description: "Fresh pizza topped with basil pesto and cherry tomatoes. A classic \
                          combination of flavors."
                .into(),
            price: dec!(11.99),
            sku: "PIZ-002".into(),
            category: "Food".into(),
            brand: "Artisan Pizza".into(),
            image_url: unsplash("1574071318508-1cdbab80d002"),
            image_urls: vec![
                unsplash("1574071318508-1cdbab80d002"),
                unsplash("1513104890138-7c749659a591"),
                unsplash("1565299624946-b28f40a0ae38"),
            ],
            stock: 15,
            attributes: pairs(&[
                ("Protein", "16g"),
                ("Carbs", "38g"),
                ("Fat", "14g"),
                ("Calories", "340"),
                ("Size", "12 inch"),
            ]),
            features: strings(&[
                "Basil pesto sauce",
                "Cherry tomatoes",
                "Classic Italian flavors",
                "Fresh mozzarella",
                "12 inch size",
            ]),
        },
        Product {
            id: Uuid::from_u128(4),
            name: "Meaty Chicken Drumsticks".into(),
            description: "Juicy chicken drumsticks seasoned to perfection. Great for grilling or \
                          baking."
                .into(),
            price: dec!(8.99),
            sku: "CHK-001".into(),
            category: "Meat".into(),
            brand: "Farm Fresh".into(),
            image_url: unsplash("1604503468506-a8da13d82791"),
            image_urls: vec![
                unsplash("1604503468506-a8da13d82791"),
                format!("{}&q=80", unsplash("1604503468506-a8da13d82791")),
                format!("{}&q=60", unsplash("1604503468506-a8da13d82791")),
            ],
            stock: 30,
            attributes: pairs(&[
                ("Protein", "28g"),
                ("Carbs", "0g"),
                ("Fat", "8g"),
                ("Calories", "190"),
                ("Package", "4 pieces"),
            ]),
            features: strings(&[
                "Premium quality chicken",
                "Perfectly seasoned",
                "Great for grilling",
                "Ideal for baking",
                "4 pieces per package",
            ]),
        },
    ]
}
