//! OpenAI Apps `_meta` blocks
//!
//! Each tool and resource declares its metadata once; the registry renders it
//! into a JSON map when it is built and hands out a clone per call, so a
//! handler adding per-call keys never touches the shared copy.

use serde_json::{json, Map, Value};

/// Static metadata attached to a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolMetadata {
    pub output_template: Option<&'static str>,
    pub widget_accessible: bool,
    pub result_can_produce_widget: bool,
    pub visibility: &'static str,
    pub invoking: &'static str,
    pub invoked: &'static str,
}

impl ToolMetadata {
    pub const fn new(invoking: &'static str, invoked: &'static str) -> Self {
        Self {
            output_template: None,
            widget_accessible: false,
            result_can_produce_widget: false,
            visibility: "public",
            invoking,
            invoked,
        }
    }

    /// Marks the tool as rendering its result in the widget at `template`.
    pub const fn widget(mut self, template: &'static str) -> Self {
        self.output_template = Some(template);
        self.widget_accessible = true;
        self.result_can_produce_widget = true;
        self
    }

    pub fn to_meta(&self) -> Map<String, Value> {
        let mut meta = Map::new();
        meta.insert("securitySchemes".into(), json!([{ "type": "noauth" }]));
        meta.insert("openai/visibility".into(), json!(self.visibility));
        meta.insert("openai/toolInvocation/invoking".into(), json!(self.invoking));
        meta.insert("openai/toolInvocation/invoked".into(), json!(self.invoked));

        if let Some(template) = self.output_template {
            meta.insert("openai/outputTemplate".into(), json!(template));
            meta.insert("openai/widgetAccessible".into(), json!(self.widget_accessible));
            meta.insert(
                "openai/resultCanProduceWidget".into(),
                json!(self.result_can_produce_widget),
            );
        }
        meta
    }
}

/// Static metadata attached to a widget resource. Resources are always
/// widget templates for themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceMetadata {
    pub invoking: &'static str,
    pub invoked: &'static str,
}

impl ResourceMetadata {
    pub fn to_meta(&self, uri: &str) -> Map<String, Value> {
        let mut meta = Map::new();
        meta.insert("openai/outputTemplate".into(), json!(uri));
        meta.insert("openai/widgetAccessible".into(), json!(true));
        meta.insert("openai/resultCanProduceWidget".into(), json!(true));
        meta.insert("openai/toolInvocation/invoking".into(), json!(self.invoking));
        meta.insert("openai/toolInvocation/invoked".into(), json!(self.invoked));
        meta
    }
}

/// Per-call key linking a result to the widget instance for `session_id`.
pub fn widget_session(session_id: &str) -> (String, Value) {
    ("openai/widgetSessionId".into(), json!(session_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_tool_has_no_widget_keys() {
        let meta = ToolMetadata::new("Working...", "Done.").to_meta();
        assert_eq!(meta["securitySchemes"], json!([{ "type": "noauth" }]));
        assert_eq!(meta["openai/visibility"], "public");
        assert_eq!(meta["openai/toolInvocation/invoking"], "Working...");
        assert!(!meta.contains_key("openai/outputTemplate"));
        assert!(!meta.contains_key("openai/widgetAccessible"));
    }

    #[test]
    fn widget_tool_points_at_template() {
        let meta = ToolMetadata::new("a", "b")
            .widget("ui://widget/cart.html")
            .to_meta();
        assert_eq!(meta["openai/outputTemplate"], "ui://widget/cart.html");
        assert_eq!(meta["openai/widgetAccessible"], true);
        assert_eq!(meta["openai/resultCanProduceWidget"], true);
    }

    #[test]
    fn resource_meta_uses_own_uri() {
        let meta = ResourceMetadata {
            invoking: "Loading...",
            invoked: "Loaded.",
        }
        .to_meta("ui://widget/catalog.html");
        assert_eq!(meta["openai/outputTemplate"], "ui://widget/catalog.html");
        assert_eq!(meta["openai/toolInvocation/invoked"], "Loaded.");
    }
}
