//! Translation between `turnstream`'s data model and the wire types.

use turnstream::backend::TurnRequest;
use turnstream::chat::{ChatRole, Message, ToolCall};
use turnstream::tool::ToolDefinition;

use crate::config::OllamaConfig;
use crate::types::{
    ChatRequest, WireFunction, WireFunctionCall, WireMessage, WireTool, WireToolCall,
};

pub(crate) fn build_request(request: &TurnRequest, config: &OllamaConfig) -> ChatRequest {
    ChatRequest {
        model: config.model.clone(),
        messages: request.messages.iter().map(convert_message).collect(),
        stream: true,
        tools: if request.tools.is_empty() {
            None
        } else {
            Some(request.tools.iter().map(convert_tool).collect())
        },
        format: request
            .format
            .as_ref()
            .map(|schema| schema.as_value().clone()),
    }
}

fn convert_message(message: &Message) -> WireMessage {
    let role = match message.role {
        ChatRole::System => "system",
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
        ChatRole::Tool => "tool",
    };
    WireMessage {
        role: role.into(),
        content: message.content.clone(),
        // The wire format has no call-id field on tool messages; Ollama
        // correlates results positionally, so `tool_call_id` stays local.
        tool_calls: message
            .tool_calls
            .as_ref()
            .map(|calls| calls.iter().map(convert_call).collect()),
    }
}

fn convert_call(call: &ToolCall) -> WireToolCall {
    WireToolCall {
        function: WireFunctionCall {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
        },
    }
}

fn convert_tool(definition: &ToolDefinition) -> WireTool {
    WireTool {
        tool_type: "function",
        function: WireFunction {
            name: definition.name.clone(),
            description: definition.description.clone(),
            parameters: definition.parameters.as_value().clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use turnstream::schema::JsonSchema;

    use super::*;

    #[test]
    fn test_tools_omitted_for_empty_registry() {
        let request = TurnRequest::plain(vec![Message::user("hi")]);
        let wire = build_request(&request, &OllamaConfig::default());
        assert!(wire.tools.is_none());
        assert!(wire.format.is_none());
        assert!(wire.stream);
        assert_eq!(wire.model, "llama3.2");
    }

    #[test]
    fn test_tools_and_format_included() {
        let schema = JsonSchema::new(json!({ "type": "object" }));
        let request = TurnRequest {
            messages: vec![Message::user("hi")],
            tools: vec![ToolDefinition::new("add", "Adds", schema.clone())],
            format: Some(schema),
        };
        let wire = build_request(&request, &OllamaConfig::default());
        let tools = wire.tools.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].tool_type, "function");
        assert_eq!(tools[0].function.name, "add");
        assert_eq!(wire.format, Some(json!({ "type": "object" })));
    }

    #[test]
    fn test_roles_and_history_order() {
        let request = TurnRequest::plain(vec![
            Message::system("be terse"),
            Message::user("2+3?"),
            Message::assistant_with_calls(
                "",
                vec![ToolCall {
                    id: "call_add_0".into(),
                    name: "add".into(),
                    arguments: json!({ "a": 2, "b": 3 }),
                }],
            ),
            Message::tool("5", "call_add_0"),
        ]);
        let wire = build_request(&request, &OllamaConfig::default());
        let roles: Vec<&str> = wire.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "tool"]);

        let calls = wire.messages[2].tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "add");
        assert_eq!(calls[0].function.arguments, json!({ "a": 2, "b": 3 }));
        assert_eq!(wire.messages[3].content, "5");
    }
}
