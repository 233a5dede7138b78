//! The closed set of tools the model may choose from, and their typed arguments.
//!
//! The model is an untrusted source: its arguments are decoded into the struct
//! for the chosen tool and validated before anything is dispatched.

use ai_client::{tool_parameters, ToolDefinition};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use viewops_common::ViewOpsError;

pub const GET_BATCH_DETAILS: &str = "get_batch_details";
pub const GET_TOTAL_WEIGHT_BY_SCHEME: &str = "get_total_weight_by_scheme";
pub const SEARCH_OPERATIONAL_NOTES: &str = "search_operational_notes";

/// Longest scheme name or search phrase accepted from the model.
pub const MAX_TEXT_ARG_CHARS: usize = 500;

/// Arguments of one catalog tool.
pub trait ToolArgs: DeserializeOwned + Serialize + JsonSchema {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    /// Check and normalize the decoded arguments.
    fn validate(self) -> Result<Self, String>;

    fn definition() -> ToolDefinition {
        ToolDefinition::new(Self::NAME, Self::DESCRIPTION, tool_parameters::<Self>())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BatchDetailsArgs {
    /// The human-readable number for the batch, e.g., 662, 663
    pub batch_number: i32,
}

impl ToolArgs for BatchDetailsArgs {
    const NAME: &'static str = GET_BATCH_DETAILS;
    const DESCRIPTION: &'static str = "Get detailed deterministic information for a specific batch \
        (yield, cost, scheme) using its human-readable batch number (e.g., 662).";

    fn validate(self) -> Result<Self, String> {
        if self.batch_number <= 0 {
            return Err(format!(
                "batch_number must be a positive integer, got {}",
                self.batch_number
            ));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SchemeWeightArgs {
    /// The name of the scheme, e.g., 'Angus Scheme', 'Native Breed'
    pub scheme: String,
}

impl ToolArgs for SchemeWeightArgs {
    const NAME: &'static str = GET_TOTAL_WEIGHT_BY_SCHEME;
    const DESCRIPTION: &'static str =
        "Calculate the total cold weight killed for a specific scheme.";

    fn validate(self) -> Result<Self, String> {
        Ok(Self {
            scheme: non_blank("scheme", &self.scheme)?,
        })
    }
}

impl SchemeWeightArgs {
    /// `_ilike` pattern matching the scheme anywhere in the name.
    pub fn pattern(&self) -> String {
        format!("%{}%", self.scheme)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NoteSearchArgs {
    /// The semantic topic to search for, e.g., 'contamination issues', 'high fat content'
    pub search_query: String,
}

impl ToolArgs for NoteSearchArgs {
    const NAME: &'static str = SEARCH_OPERATIONAL_NOTES;
    const DESCRIPTION: &'static str = "Semantically search through unstructured operational \
        notes, issues, or vet comments to find relevant batches based on a vague description.";

    fn validate(self) -> Result<Self, String> {
        Ok(Self {
            search_query: non_blank("search_query", &self.search_query)?,
        })
    }
}

fn non_blank(field: &str, value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if trimmed.chars().count() > MAX_TEXT_ARG_CHARS {
        return Err(format!(
            "{field} must be at most {MAX_TEXT_ARG_CHARS} characters"
        ));
    }
    Ok(trimmed.to_string())
}

/// Tool definitions handed to the model on every request.
pub fn catalog() -> Vec<ToolDefinition> {
    vec![
        BatchDetailsArgs::definition(),
        SchemeWeightArgs::definition(),
        NoteSearchArgs::definition(),
    ]
}

/// A validated tool call: exactly one tool with its typed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocation {
    BatchDetails(BatchDetailsArgs),
    SchemeWeight(SchemeWeightArgs),
    NoteSearch(NoteSearchArgs),
}

impl ToolInvocation {
    /// Decode the model's tool name and raw argument text.
    ///
    /// Argument text that is not JSON is an internal error; a name outside the
    /// catalog is `NotImplemented`; JSON that does not fit the tool's schema is
    /// a `BadRequest`.
    pub fn from_call(name: &str, arguments: &str) -> Result<Self, ViewOpsError> {
        let value: Value = serde_json::from_str(arguments).map_err(|e| {
            warn!(tool = name, error = %e, "Tool arguments are not valid JSON");
            ViewOpsError::internal(format!("Failed to parse tool arguments: {e}"))
        })?;

        match name {
            GET_BATCH_DETAILS => decode::<BatchDetailsArgs>(value).map(Self::BatchDetails),
            GET_TOTAL_WEIGHT_BY_SCHEME => decode::<SchemeWeightArgs>(value).map(Self::SchemeWeight),
            SEARCH_OPERATIONAL_NOTES => decode::<NoteSearchArgs>(value).map(Self::NoteSearch),
            other => Err(ViewOpsError::NotImplemented(format!(
                "Tool '{other}' is not implemented internally."
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::BatchDetails(_) => BatchDetailsArgs::NAME,
            Self::SchemeWeight(_) => SchemeWeightArgs::NAME,
            Self::NoteSearch(_) => NoteSearchArgs::NAME,
        }
    }

    /// The validated arguments as a JSON object.
    pub fn parameters(&self) -> Value {
        let value = match self {
            Self::BatchDetails(args) => serde_json::to_value(args),
            Self::SchemeWeight(args) => serde_json::to_value(args),
            Self::NoteSearch(args) => serde_json::to_value(args),
        };
        value.unwrap_or(Value::Null)
    }
}

fn decode<T: ToolArgs>(value: Value) -> Result<T, ViewOpsError> {
    let args: T = serde_json::from_value(value).map_err(|e| {
        warn!(tool = T::NAME, error = %e, "Tool arguments do not match schema");
        ViewOpsError::bad_request(format!("Invalid arguments for tool '{}': {e}", T::NAME))
    })?;

    args.validate().map_err(|reason| {
        warn!(tool = T::NAME, reason = reason.as_str(), "Tool arguments rejected");
        ViewOpsError::bad_request(format!("Invalid arguments for tool '{}': {reason}", T::NAME))
    })
}
