//! Widget HTML Resources
//!
//! Each widget is a minimal HTML shell that loads its compiled bundle from
//! this server. The bundles themselves are served from `wwwroot` by the
//! router (`/widgets/*.js`, `/assets/*.css`).

use crate::error::Result;
use crate::mcp::metadata::ResourceMetadata;
use crate::mcp::models::WIDGET_MIME_TYPE;
use crate::mcp::registry::{RequestContext, Resource, ResourceDescriptor};
use crate::state::AppState;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub const CATALOG_URI: &str = "ui://widget/catalog.html";
pub const PRODUCT_COMPARISON_URI: &str = "ui://widget/product-comparison.html";
pub const CART_URI: &str = "ui://widget/cart.html";

/// Bundle names making up one widget shell.
struct Shell<'a> {
    title: &'a str,
    script: &'a str,
    styles: &'a [&'a str],
    /// Light theme forced on the document element.
    themed: bool,
}

impl Shell<'_> {
    fn render(&self, base_url: &str) -> String {
        let links: String = self
            .styles
            .iter()
            .map(|css| format!("<link rel=\"stylesheet\" href=\"{base_url}/assets/{css}.css\">"))
            .collect();
        let html_attrs = if self.themed {
            " lang=\"en\" data-theme=\"light\""
        } else {
            " lang=\"en\""
        };

        format!(
            "<!DOCTYPE html><html{html_attrs}><head><meta charset=\"UTF-8\">\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\
             <title>{title}</title>{links}</head><body><div id=\"root\"></div>\
             <script>window.openai = window.openai || {{}};</script>\
             <script type=\"module\" src=\"{base_url}/widgets/{script}.js\"></script>\
             </body></html>",
            title = self.title,
            script = self.script,
        )
    }
}

// =============================================================================
// Catalog
// =============================================================================

pub struct CatalogWidget {
    base_url: String,
}

#[async_trait]
impl Resource for CatalogWidget {
    fn descriptor() -> ResourceDescriptor {
        ResourceDescriptor {
            uri: CATALOG_URI,
            name: "catalog",
            title: "HTML widget view of the product catalog",
            description: "Product grid with filters, pagination and add-to-cart.",
            mime_type: WIDGET_MIME_TYPE,
            metadata: ResourceMetadata {
                invoking: "Loading catalog...",
                invoked: "Catalog loaded.",
            },
        }
    }

    fn resolve(_state: &AppState, ctx: &RequestContext) -> Self {
        Self {
            base_url: ctx.base_url.clone(),
        }
    }

    async fn read(&self, _cancel: &CancellationToken) -> Result<String> {
        Ok(Shell {
            title: "Catalog Widget",
            script: "catalog",
            styles: &["catalog", "index"],
            themed: true,
        }
        .render(&self.base_url))
    }
}

// =============================================================================
// Product comparison
// =============================================================================

pub struct ProductComparisonWidget {
    base_url: String,
}

#[async_trait]
impl Resource for ProductComparisonWidget {
    fn descriptor() -> ResourceDescriptor {
        ResourceDescriptor {
            uri: PRODUCT_COMPARISON_URI,
            name: "product-comparison",
            title: "HTML widget view for product comparison",
            description: "Side-by-side comparison table for selected products.",
            mime_type: WIDGET_MIME_TYPE,
            metadata: ResourceMetadata {
                invoking: "Loading comparison...",
                invoked: "Comparison loaded.",
            },
        }
    }

    fn resolve(_state: &AppState, ctx: &RequestContext) -> Self {
        Self {
            base_url: ctx.base_url.clone(),
        }
    }

    async fn read(&self, _cancel: &CancellationToken) -> Result<String> {
        Ok(Shell {
            title: "Product Comparison Widget",
            script: "product-comparison",
            styles: &["main"],
            themed: false,
        }
        .render(&self.base_url))
    }
}

// =============================================================================
// Cart
// =============================================================================

pub struct CartWidget {
    base_url: String,
}

#[async_trait]
impl Resource for CartWidget {
    fn descriptor() -> ResourceDescriptor {
        ResourceDescriptor {
            uri: CART_URI,
            name: "cart",
            title: "HTML widget view of the shopping cart",
            description: "Cart contents with quantity controls and totals.",
            mime_type: WIDGET_MIME_TYPE,
            metadata: ResourceMetadata {
                invoking: "Loading cart...",
                invoked: "Cart loaded.",
            },
        }
    }

    fn resolve(_state: &AppState, ctx: &RequestContext) -> Self {
        Self {
            base_url: ctx.base_url.clone(),
        }
    }

    async fn read(&self, _cancel: &CancellationToken) -> Result<String> {
        Ok(Shell {
            title: "Cart Widget",
            script: "cart",
            styles: &["main", "index"],
            themed: true,
        }
        .render(&self.base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(base_url: &str) -> RequestContext {
        RequestContext {
            base_url: base_url.into(),
        }
    }

    #[tokio::test]
    async fn catalog_shell_links_bundles_under_base_url() {
        let state = AppState::default();
        let html = CatalogWidget::resolve(&state, &ctx("https://abc.ngrok.app"))
            .read(&CancellationToken::new())
            .await
            .unwrap();

        assert!(html.starts_with("<!DOCTYPE html><html lang=\"en\" data-theme=\"light\">"));
        assert!(html.contains("<title>Catalog Widget</title>"));
        assert!(html.contains("href=\"https://abc.ngrok.app/assets/catalog.css\""));
        assert!(html.contains("href=\"https://abc.ngrok.app/assets/index.css\""));
        assert!(html.contains(
            "<script type=\"module\" src=\"https://abc.ngrok.app/widgets/catalog.js\"></script>"
        ));
        assert!(html.contains("<div id=\"root\"></div>"));
        assert!(html.contains("window.openai = window.openai || {};"));
        assert!(!html.contains('\n'));
    }

    #[tokio::test]
    async fn comparison_and_cart_shells() {
        let state = AppState::default();
        let cancel = CancellationToken::new();

        let html = ProductComparisonWidget::resolve(&state, &ctx("https://h"))
            .read(&cancel)
            .await
            .unwrap();
        assert!(html.starts_with("<!DOCTYPE html><html lang=\"en\"><head>"));
        assert!(html.contains("https://h/widgets/product-comparison.js"));
        assert!(html.contains("https://h/assets/main.css"));

        let html = CartWidget::resolve(&state, &ctx("https://h"))
            .read(&cancel)
            .await
            .unwrap();
        assert!(html.contains("https://h/widgets/cart.js"));
        assert!(html.contains("https://h/assets/main.css"));
        assert!(html.contains("https://h/assets/index.css"));
    }
}
