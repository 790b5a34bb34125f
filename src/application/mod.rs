//! Application Module
//!
//! Queries and commands over the domain repositories. Every request type
//! implements [`Request`]; the [`Mediator`] implements [`RequestHandler`] for
//! each of them, so tools only ever call `mediator.send(request)`.

pub mod cart;
pub mod catalog;
pub mod sellers;

use crate::domain::{CartRepository, ProductRepository, SellerRepository};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A query or command with a typed response.
pub trait Request: Send + 'static {
    type Response: Send;
}

#[async_trait]
pub trait RequestHandler<R: Request> {
    async fn handle(&self, request: R) -> Result<R::Response>;
}

/// Routes requests to their handler. Cheap to clone; repositories are shared.
#[derive(Clone)]
pub struct Mediator {
    products: Arc<dyn ProductRepository>,
    sellers: Arc<dyn SellerRepository>,
    carts: Arc<dyn CartRepository>,
}

impl Mediator {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        sellers: Arc<dyn SellerRepository>,
        carts: Arc<dyn CartRepository>,
    ) -> Self {
        Self {
            products,
            sellers,
            carts,
        }
    }

    pub async fn send<R>(&self, request: R) -> Result<R::Response>
    where
        R: Request,
        Self: RequestHandler<R>,
    {
        self.handle(request).await
    }
}

#[cfg(test)]
pub(crate) fn test_mediator() -> Mediator {
    use crate::infrastructure::{
        InMemoryCartRepository, InMemoryProductRepository, InMemorySellerRepository,
    };

    Mediator::new(
        Arc::new(InMemoryProductRepository::new()),
        Arc::new(InMemorySellerRepository::new()),
        Arc::new(InMemoryCartRepository::new()),
    )
}
