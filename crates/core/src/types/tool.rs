use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

// =============================================================================
// Tool Descriptor Types
// =============================================================================

/// Declared type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl ParamType {
    /// Parse a JSON Schema type name, defaulting to string for unknown names.
    pub fn from_schema_name(name: &str) -> Self {
        match name {
            "integer" => Self::Integer,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "object" => Self::Object,
            "array" => Self::Array,
            _ => Self::String,
        }
    }

    /// The JSON Schema type name for this parameter type.
    pub fn schema_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Whether a JSON value is acceptable for this type, allowing the
    /// coercions the wire format tolerates (numeric strings for numbers,
    /// "true"/"false" for booleans).
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => {
                value.is_i64()
                    || value.is_u64()
                    || value
                        .as_str()
                        .is_some_and(|s| s.trim().parse::<i64>().is_ok())
            }
            Self::Number => {
                value.is_number()
                    || value
                        .as_str()
                        .is_some_and(|s| s.trim().parse::<f64>().is_ok())
            }
            Self::Boolean => {
                value.is_boolean()
                    || value
                        .as_str()
                        .is_some_and(|s| matches!(s, "true" | "false"))
            }
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
        }
    }
}

/// A single declared parameter of a tool or skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub param_type: ParamType,
    /// Whether the parameter must be supplied.
    #[serde(default)]
    pub required: bool,
}

impl ParameterSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        param_type: ParamType,
        required: bool,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type,
            required,
        }
    }

    /// A required string parameter.
    pub fn required_string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, ParamType::String, true)
    }

    /// A required integer parameter.
    pub fn required_integer(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, ParamType::Integer, true)
    }
}

/// Descriptor for a tool as published by the tool host catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique, stable tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Declared parameters.
    pub parameters: Vec<ParameterSpec>,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ParameterSpec>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Render the parameter list as a JSON Schema object, the shape the
    /// tool-host discovery endpoint publishes.
    pub fn schema_object(&self) -> Value {
        params_to_schema(&self.parameters)
    }

    /// Parse a catalog entry whose parameters are a JSON Schema object.
    pub fn from_wire(name: &str, description: &str, parameters: &Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters: params_from_schema(parameters),
        }
    }
}

/// Convert a parameter list into the `{type, properties, required}` JSON
/// Schema object used on the wire.
pub fn params_to_schema(params: &[ParameterSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for param in params {
        properties.insert(
            param.name.clone(),
            json!({
                "type": param.param_type.schema_name(),
                "description": param.description,
            }),
        );
        if param.required {
            required.push(Value::String(param.name.clone()));
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Parse a JSON Schema object back into a parameter list.
///
/// Property order in a JSON object is not guaranteed by intermediaries, so
/// the result is sorted by name to keep translation deterministic.
pub fn params_from_schema(schema: &Value) -> Vec<ParameterSpec> {
    let required: Vec<&str> = schema
        .get("required")
        .and_then(|r| r.as_array())
        .map(|a| a.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    let mut params: Vec<ParameterSpec> = schema
        .get("properties")
        .and_then(|p| p.as_object())
        .map(|props| {
            props
                .iter()
                .map(|(name, details)| ParameterSpec {
                    name: name.clone(),
                    description: details
                        .get("description")
                        .and_then(|d| d.as_str())
                        .unwrap_or_default()
                        .to_string(),
                    param_type: ParamType::from_schema_name(
                        details.get("type").and_then(|t| t.as_str()).unwrap_or("string"),
                    ),
                    required: required.contains(&name.as_str()),
                })
                .collect()
        })
        .unwrap_or_default();

    params.sort_by(|a, b| a.name.cmp(&b.name));
    params
}
