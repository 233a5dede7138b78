use serde::Serialize;
use serde_json::Value;

/// A function the model may call, described by a JSON-schema parameter object.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A tool invocation returned by the model. `arguments` is the raw JSON text
/// exactly as the model produced it; callers decide how to parse it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    pub call_type: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCall {
    /// Convenience constructor for a plain function call.
    pub fn function(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            call_type: "function".to_string(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    pub fn is_function(&self) -> bool {
        self.call_type == "function"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_call_is_function() {
        let call = ToolCall::function("get_batch_details", r#"{"batch_number":662}"#);
        assert!(call.is_function());
        assert_eq!(call.name, "get_batch_details");
    }

    #[test]
    fn other_call_types_are_not_functions() {
        let call = ToolCall {
            id: "call_1".to_string(),
            call_type: "custom".to_string(),
            name: "anything".to_string(),
            arguments: String::new(),
        };
        assert!(!call.is_function());
    }

    #[test]
    fn definition_serializes_flat() {
        let def = ToolDefinition::new("echo", "Echo back", serde_json::json!({"type": "object"}));
        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(value["name"], "echo");
        assert_eq!(value["parameters"]["type"], "object");
    }
}
