//! Object-safe tool handler trait and closure adapter.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use super::ToolDefinition;
use crate::schema::JsonSchema;

/// Boxed error for handler faults. Keeps the original cause for diagnostics.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Boxed future returned by [`ToolHandler::execute`].
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, BoxError>> + Send + 'a>>;

/// An executable tool.
///
/// Object-safe so the registry can hold heterogeneous handlers behind
/// `Arc<dyn ToolHandler>`; implementations box their futures.
pub trait ToolHandler: Send + Sync {
    /// The tool's name, description, and parameter schema.
    fn definition(&self) -> &ToolDefinition;

    /// Runs the tool. `arguments` have already passed schema validation.
    ///
    /// A `String` return value is used verbatim as the result content; any
    /// other JSON value is serialized.
    fn execute(&self, arguments: Value) -> HandlerFuture<'_>;
}

struct FnToolHandler<F> {
    definition: ToolDefinition,
    func: F,
}

impl<F> ToolHandler for FnToolHandler<F>
where
    F: Fn(Value) -> HandlerFuture<'static> + Send + Sync,
{
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    fn execute(&self, arguments: Value) -> HandlerFuture<'_> {
        (self.func)(arguments)
    }
}

/// Wraps an async closure as a [`ToolHandler`].
///
/// The common path for defining tools; see the module docs for an example.
pub fn tool_fn<F, Fut>(
    name: impl Into<String>,
    description: impl Into<String>,
    parameters: JsonSchema,
    func: F,
) -> Arc<dyn ToolHandler>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, BoxError>> + Send + 'static,
{
    Arc::new(FnToolHandler {
        definition: ToolDefinition::new(name, description, parameters),
        func: move |arguments: Value| Box::pin(func(arguments)) as HandlerFuture<'static>,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_tool_fn_executes_closure() {
        let handler = tool_fn("echo", "Echoes its input", JsonSchema::empty_object(), |args| {
            async move { Ok(args) }
        });

        assert_eq!(handler.definition().name, "echo");
        let out = handler.execute(json!({ "x": 1 })).await.unwrap();
        assert_eq!(out, json!({ "x": 1 }));
    }

    #[tokio::test]
    async fn test_tool_fn_propagates_fault() {
        let handler = tool_fn("boom", "Always fails", JsonSchema::empty_object(), |_| async {
            Err::<Value, BoxError>("kaboom".into())
        });

        let err = handler.execute(json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "kaboom");
    }
}
