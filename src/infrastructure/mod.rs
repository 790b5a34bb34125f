//! Infrastructure Module
//!
//! Repository implementations. Sellers and carts are always in memory; the
//! product catalog is chosen by [`Config::product_repository`].

pub mod carts;
pub mod products;
pub mod sellers;
pub mod vtex;

pub use carts::InMemoryCartRepository;
pub use products::InMemoryProductRepository;
pub use sellers::InMemorySellerRepository;
pub use vtex::VtexProductRepository;

use crate::application::Mediator;
use crate::config::{Config, ProductRepositoryKind};
use crate::domain::ProductRepository;
use crate::error::Result;
use std::sync::Arc;
use tracing::info;

pub fn product_repository(config: &Config) -> Result<Arc<dyn ProductRepository>> {
    let repo: Arc<dyn ProductRepository> = match config.product_repository {
        ProductRepositoryKind::InMemory => Arc::new(InMemoryProductRepository::new()),
        ProductRepositoryKind::Vtex => Arc::new(VtexProductRepository::new(config.vtex_timeout())?),
    };
    info!(backend = ?config.product_repository, "product repository ready");
    Ok(repo)
}

/// Wires every repository behind a [`Mediator`].
pub fn build_mediator(config: &Config) -> Result<Mediator> {
    Ok(Mediator::new(
        product_repository(config)?,
        Arc::new(InMemorySellerRepository::new()),
        Arc::new(InMemoryCartRepository::new()),
    ))
}
