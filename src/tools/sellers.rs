use super::STRUCTURED_CONTENT_MESSAGE;
use crate::application::{sellers::GetAvailableSellers, Mediator};
use crate::error::Result;
use crate::mcp::metadata::ToolMetadata;
use crate::mcp::registry::{Arguments, RequestContext, Tool, ToolDescriptor, ToolOutput};
use crate::state::AppState;
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

pub struct GetAvailableSellersTool {
    mediator: Mediator,
}

#[async_trait]
impl Tool for GetAvailableSellersTool {
    fn descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: "get_available_sellers",
            title: "List shops",
            description: "Retrieves all available sellers (shops). MUST be called FIRST before \
                any catalog operations. Use the shopKey from the response in other catalog \
                tools.",
            params: vec![],
            metadata: ToolMetadata::new("Retrieving available shops...", "Shops retrieved."),
        }
    }

    fn resolve(state: &AppState, _ctx: &RequestContext) -> Self {
        Self {
            mediator: state.mediator.clone(),
        }
    }

    async fn call(&self, _args: Arguments, _cancel: &CancellationToken) -> Result<ToolOutput> {
        let sellers = self.mediator.send(GetAvailableSellers).await?;
        let sellers: Vec<Value> = sellers
            .iter()
            .map(|s| {
                json!({
                    "id": s.id,
                    "name": s.name,
                    "provider": s.provider.to_string(),
                    "shopKey": s.shop_key,
                })
            })
            .collect();

        Ok(ToolOutput::new(
            STRUCTURED_CONTENT_MESSAGE,
            json!({ "count": sellers.len(), "sellers": sellers }),
        ))
    }
}
