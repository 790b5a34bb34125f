//! Tool and resource registry
//!
//! The registry is the single dispatch table behind `tools/*` and
//! `resources/*`. It is built once per process (see [`Registry::shared`]),
//! never mutated afterwards, and looked up case-insensitively by tool name or
//! resource URI.
//!
//! Each entry keeps the declared parameters, the rendered static `_meta`, the
//! name of the handler type, and a plain function pointer that resolves a
//! fresh handler from [`AppState`] and runs it.

use super::metadata::{ResourceMetadata, ToolMetadata};
use super::schema::{input_schema, invalid_argument, ParamSpec};
use crate::error::{AppError, Result};
use crate::state::AppState;
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::{any::type_name, collections::HashMap, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

// =============================================================================
// Handler contracts
// =============================================================================

/// Per-request data a handler may need besides application state.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Origin that widget shells load their bundles from, without a trailing
    /// slash.
    pub base_url: String,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:4444".into(),
        }
    }
}

/// Static description of a tool.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
    pub metadata: ToolMetadata,
}

/// What a tool returns: a message for the model, the payload for the widget,
/// and `_meta` keys to add on top of the static metadata.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub text: String,
    pub structured: Value,
    pub meta: Map<String, Value>,
}

impl ToolOutput {
    pub fn new(text: impl Into<String>, structured: Value) -> Self {
        Self {
            text: text.into(),
            structured,
            meta: Map::new(),
        }
    }

    pub fn with_meta(mut self, (key, value): (String, Value)) -> Self {
        self.meta.insert(key, value);
        self
    }
}

#[async_trait]
pub trait Tool: Send + Sync + Sized + 'static {
    fn descriptor() -> ToolDescriptor;

    /// Builds a fresh handler for one call.
    fn resolve(state: &AppState, ctx: &RequestContext) -> Self;

    async fn call(&self, args: Arguments, cancel: &CancellationToken) -> Result<ToolOutput>;
}

#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    pub uri: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
    pub metadata: ResourceMetadata,
}

#[async_trait]
pub trait Resource: Send + Sync + Sized + 'static {
    fn descriptor() -> ResourceDescriptor;

    fn resolve(state: &AppState, ctx: &RequestContext) -> Self;

    /// Returns the resource body.
    async fn read(&self, cancel: &CancellationToken) -> Result<String>;
}

// =============================================================================
// Arguments
// =============================================================================

/// Decoded call arguments, one value per declared parameter. Absent optional
/// parameters hold `null`.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: Map<String, Value>,
}

impl Arguments {
    /// Resolves every declared parameter from the raw `arguments` object.
    /// Keys that match no parameter are ignored.
    pub fn bind(params: &[ParamSpec], raw: &Value) -> Result<Self> {
        let raw = match raw {
            Value::Null => None,
            Value::Object(map) => Some(map),
            other => {
                return Err(invalid_argument(
                    "arguments",
                    format!("expected an object, found {other}"),
                ))
            }
        };

        let mut values = Map::new();
        for param in params {
            let supplied = raw.and_then(|map| map.get(param.name));
            values.insert(param.name.to_string(), param.resolve(supplied)?);
        }
        Ok(Self { values })
    }

    /// Typed value of `name`; `None` when absent.
    pub fn get<T: DeserializeOwned>(&self, name: &'static str) -> Result<Option<T>> {
        match self.values.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|source| AppError::InvalidArguments {
                    param: name.to_string(),
                    source,
                }),
        }
    }

    pub fn require<T: DeserializeOwned>(&self, name: &'static str) -> Result<T> {
        self.get(name)?.ok_or(AppError::MissingParam(name))
    }
}

// =============================================================================
// Entries
// =============================================================================

type ToolInvoker = for<'a> fn(
    &'a AppState,
    RequestContext,
    Arguments,
    CancellationToken,
) -> BoxFuture<'a, Result<ToolOutput>>;

type ResourceReader =
    for<'a> fn(&'a AppState, RequestContext, CancellationToken) -> BoxFuture<'a, Result<String>>;

fn invoke_tool<'a, T: Tool>(
    state: &'a AppState,
    ctx: RequestContext,
    args: Arguments,
    cancel: CancellationToken,
) -> BoxFuture<'a, Result<ToolOutput>> {
    Box::pin(async move {
        let handler = T::resolve(state, &ctx);
        handler.call(args, &cancel).await
    })
}

fn read_resource<'a, R: Resource>(
    state: &'a AppState,
    ctx: RequestContext,
    cancel: CancellationToken,
) -> BoxFuture<'a, Result<String>> {
    Box::pin(async move {
        let handler = R::resolve(state, &ctx);
        handler.read(&cancel).await
    })
}

pub struct ToolEntry {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Type name of the handler that owns this tool.
    pub handler: &'static str,
    pub params: Vec<ParamSpec>,
    meta: Map<String, Value>,
    invoke: ToolInvoker,
}

impl ToolEntry {
    pub fn of<T: Tool>() -> Self {
        let d = T::descriptor();
        Self {
            name: d.name,
            title: d.title,
            description: d.description,
            handler: type_name::<T>(),
            params: d.params,
            meta: d.metadata.to_meta(),
            invoke: invoke_tool::<T>,
        }
    }

    pub fn meta(&self) -> Map<String, Value> {
        self.meta.clone()
    }

    fn summary(&self) -> Value {
        json!({
            "name": self.name,
            "title": self.title,
            "description": self.description,
            "inputSchema": input_schema(&self.params),
            "_meta": self.meta(),
        })
    }

    fn envelope(&self, output: ToolOutput) -> Value {
        let mut meta = self.meta();
        meta.extend(output.meta);
        json!({
            "content": [{ "type": "text", "text": output.text }],
            "structuredContent": output.structured,
            "_meta": meta,
        })
    }

    fn failure(&self, err: &AppError) -> Value {
        json!({
            "content": [{ "type": "text", "text": err.to_string() }],
            "isError": true,
            "_meta": self.meta(),
        })
    }
}

pub struct ResourceEntry {
    pub uri: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
    pub handler: &'static str,
    meta: Map<String, Value>,
    read: ResourceReader,
}

impl ResourceEntry {
    pub fn of<R: Resource>() -> Self {
        let d = R::descriptor();
        Self {
            uri: d.uri,
            name: d.name,
            title: d.title,
            description: d.description,
            mime_type: d.mime_type,
            handler: type_name::<R>(),
            meta: d.metadata.to_meta(d.uri),
            read: read_resource::<R>,
        }
    }

    pub fn meta(&self) -> Map<String, Value> {
        self.meta.clone()
    }

    fn summary(&self) -> Value {
        json!({
            "uri": self.uri,
            "name": self.name,
            "title": self.title,
            "description": self.description,
            "mimeType": self.mime_type,
            "_meta": self.meta(),
        })
    }
}

// =============================================================================
// Registry
// =============================================================================

static SHARED: OnceCell<Arc<Registry>> = OnceCell::new();

#[derive(Default)]
pub struct RegistryBuilder {
    tools: Vec<ToolEntry>,
    resources: Vec<ResourceEntry>,
}

impl RegistryBuilder {
    pub fn tool<T: Tool>(mut self) -> Self {
        self.tools.push(ToolEntry::of::<T>());
        self
    }

    pub fn resource<R: Resource>(mut self) -> Self {
        self.resources.push(ResourceEntry::of::<R>());
        self
    }

    /// Fails on a duplicate tool name or resource URI (ignoring case).
    pub fn build(self) -> Result<Registry> {
        let mut tool_index = HashMap::with_capacity(self.tools.len());
        for (idx, tool) in self.tools.iter().enumerate() {
            if tool_index.insert(tool.name.to_lowercase(), idx).is_some() {
                return Err(AppError::DuplicateTool(tool.name.to_string()));
            }
        }

        let mut resource_index = HashMap::with_capacity(self.resources.len());
        for (idx, resource) in self.resources.iter().enumerate() {
            if resource_index
                .insert(resource.uri.to_lowercase(), idx)
                .is_some()
            {
                return Err(AppError::DuplicateResource(resource.uri.to_string()));
            }
        }

        Ok(Registry {
            tools: self.tools,
            tool_index,
            resources: self.resources,
            resource_index,
        })
    }
}

pub struct Registry {
    tools: Vec<ToolEntry>,
    tool_index: HashMap<String, usize>,
    resources: Vec<ResourceEntry>,
    resource_index: HashMap<String, usize>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The process-wide registry, built on first use. Concurrent first callers
    /// wait for a single build.
    pub fn shared() -> Result<Arc<Registry>> {
        SHARED
            .get_or_try_init(|| {
                let registry = crate::tools::registry()?;
                info!(
                    tools = registry.tools.len(),
                    resources = registry.resources.len(),
                    "registry built"
                );
                Ok(Arc::new(registry))
            })
            .cloned()
    }

    pub fn tools(&self) -> &[ToolEntry] {
        &self.tools
    }

    pub fn resources(&self) -> &[ResourceEntry] {
        &self.resources
    }

    pub fn find_tool(&self, name: &str) -> Result<&ToolEntry> {
        self.tool_index
            .get(&name.to_lowercase())
            .map(|&idx| &self.tools[idx])
            .ok_or_else(|| AppError::ToolNotFound(name.to_string()))
    }

    pub fn find_resource(&self, uri: &str) -> Result<&ResourceEntry> {
        self.resource_index
            .get(&uri.to_lowercase())
            .map(|&idx| &self.resources[idx])
            .ok_or_else(|| AppError::ResourceNotFound(uri.to_string()))
    }

    /// `tools/list` result.
    pub fn list_tools(&self) -> Value {
        let tools: Vec<Value> = self.tools.iter().map(ToolEntry::summary).collect();
        json!({ "tools": tools })
    }

    /// `resources/list` result.
    pub fn list_resources(&self) -> Value {
        let resources: Vec<Value> = self.resources.iter().map(ResourceEntry::summary).collect();
        json!({ "resources": resources })
    }

    /// `tools/call`: decodes `arguments` against the declared parameters and
    /// runs the tool. Handler failures come back as an `isError` result;
    /// lookup and decoding failures are returned as errors.
    pub async fn call_tool(
        &self,
        state: &AppState,
        ctx: RequestContext,
        name: &str,
        arguments: &Value,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let entry = self.find_tool(name)?;
        let args = Arguments::bind(&entry.params, arguments)?;

        debug!(tool = entry.name, handler = entry.handler, "invoking tool");
        let call = (entry.invoke)(state, ctx, args, cancel.clone());
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AppError::Cancelled),
            outcome = call => outcome,
        };

        match outcome {
            Ok(output) => Ok(entry.envelope(output)),
            Err(err) if err.is_tool_failure() => {
                warn!(tool = entry.name, error = %err, "tool reported failure");
                Ok(entry.failure(&err))
            }
            Err(err) => Err(err),
        }
    }

    /// `resources/read`.
    pub async fn read_resource(
        &self,
        state: &AppState,
        ctx: RequestContext,
        uri: &str,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let entry = self.find_resource(uri)?;

        debug!(uri = entry.uri, handler = entry.handler, "reading resource");
        let read = (entry.read)(state, ctx, cancel.clone());
        let text = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AppError::Cancelled),
            text = read => text,
        }?;

        Ok(json!({
            "contents": [{
                "uri": entry.uri,
                "mimeType": entry.mime_type,
                "text": text,
                "_meta": entry.meta(),
            }]
        }))
    }
}
