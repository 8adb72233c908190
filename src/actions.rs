//! Control-action request shaping
//!
//! Builds the HTTP requests the UI sends to cancel, terminate, signal or
//! reset a workflow execution. Nothing here performs I/O: a planned
//! [`ActionRequest`] carries the method, the API path segments and the
//! JSON body, and is resolved against an API origin by the caller.

use crate::settings::Settings;
use base64::{engine::general_purpose::STANDARD as Base64, Engine as _};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;
use url::Url;

/// Encoding tag attached to signal payloads
const JSON_PLAIN_ENCODING: &str = "json/plain";

/// Errors that can occur while planning a control action
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("{0} is disabled by the current settings")]
    Disabled(ActionKind),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("API origin cannot carry a path: {0}")]
    InvalidOrigin(String),
}

/// Result type for action planning
pub type Result<T> = std::result::Result<T, ActionError>;

/// The kind of control action, used for gating and routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Cancel,
    Terminate,
    Signal,
    Reset,
}

impl ActionKind {
    /// Final API path segment for this action
    pub fn route_segment(&self) -> &'static str {
        match self {
            ActionKind::Cancel => "cancel",
            ActionKind::Terminate => "terminate",
            ActionKind::Signal => "signal",
            ActionKind::Reset => "reset",
        }
    }

    /// Whether `settings` allow this action
    pub fn is_enabled(&self, settings: &Settings) -> bool {
        match self {
            ActionKind::Cancel => settings.workflow_cancel_enabled(),
            ActionKind::Terminate => settings.workflow_terminate_enabled(),
            ActionKind::Signal => settings.workflow_signal_enabled(),
            ActionKind::Reset => settings.workflow_reset_enabled(),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Cancel => "Workflow cancel",
            ActionKind::Terminate => "Workflow terminate",
            ActionKind::Signal => "Workflow signal",
            ActionKind::Reset => "Workflow reset",
        };
        f.write_str(name)
    }
}

/// The execution an action targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTarget {
    pub namespace: String,
    pub workflow_id: String,
    pub run_id: String,
}

impl WorkflowTarget {
    pub fn new(
        namespace: impl Into<String>,
        workflow_id: impl Into<String>,
        run_id: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            workflow_id: workflow_id.into(),
            run_id: run_id.into(),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(ActionError::MissingField("namespace"));
        }
        if self.workflow_id.is_empty() {
            return Err(ActionError::MissingField("workflowId"));
        }
        if self.run_id.is_empty() {
            return Err(ActionError::MissingField("runId"));
        }
        Ok(())
    }
}

/// A control action and its arguments
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowAction {
    Cancel,
    Terminate {
        reason: String,
    },
    Signal {
        name: String,
        /// Signal argument; `None` sends no payload
        input: Option<Value>,
    },
    Reset {
        /// Id of the workflow task completion event to reset to
        event_id: String,
        reason: String,
    },
}

impl WorkflowAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            WorkflowAction::Cancel => ActionKind::Cancel,
            WorkflowAction::Terminate { .. } => ActionKind::Terminate,
            WorkflowAction::Signal { .. } => ActionKind::Signal,
            WorkflowAction::Reset { .. } => ActionKind::Reset,
        }
    }
}

/// HTTP method of a planned request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Method {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "POST")]
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// A fully shaped control-action request, ready for a transport
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRequest {
    pub action: ActionKind,
    pub method: Method,
    /// Unencoded API path segments
    pub segments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ActionRequest {
    /// Resolve the request path against an API origin
    ///
    /// Segments are percent-encoded, so workflow ids containing `/` or
    /// spaces stay a single segment.
    pub fn url(&self, origin: &Url) -> Result<Url> {
        resolve_path(origin, &self.segments)
    }

    /// Body serialized for sending; `None` for bodiless requests
    pub fn body_json(&self) -> Result<Option<String>> {
        self.body
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(ActionError::from)
    }
}

/// Replace the path of `origin` with percent-encoded `segments`
pub(crate) fn resolve_path(origin: &Url, segments: &[String]) -> Result<Url> {
    let mut url = origin.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| ActionError::InvalidOrigin(origin.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Plan a control action against `target`
///
/// # Errors
/// - [`ActionError::Disabled`] if `settings` gate the action off
/// - [`ActionError::MissingField`] if the target or a required argument is
///   empty
pub fn plan(
    action: &WorkflowAction,
    target: &WorkflowTarget,
    settings: &Settings,
) -> Result<ActionRequest> {
    let kind = action.kind();
    if !kind.is_enabled(settings) {
        tracing::debug!(action = ?kind, "action rejected by settings");
        return Err(ActionError::Disabled(kind));
    }
    target.validate()?;

    let body = match action {
        WorkflowAction::Cancel => None,
        WorkflowAction::Terminate { reason } => Some(json!({ "reason": reason })),
        WorkflowAction::Signal { name, input } => {
            if name.is_empty() {
                return Err(ActionError::MissingField("signalName"));
            }
            Some(signal_body(name, input.as_ref())?)
        }
        WorkflowAction::Reset { event_id, reason } => {
            if event_id.is_empty() {
                return Err(ActionError::MissingField("eventId"));
            }
            Some(json!({
                "workflowExecution": {
                    "workflowId": target.workflow_id,
                    "runId": target.run_id,
                },
                "workflowTaskFinishEventId": event_id,
                "requestId": uuid::Uuid::new_v4().to_string(),
                "reason": reason,
            }))
        }
    };

    let segments = [
        "api",
        "v1",
        "namespaces",
        target.namespace.as_str(),
        "workflows",
        target.workflow_id.as_str(),
        "runs",
        target.run_id.as_str(),
        kind.route_segment(),
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    Ok(ActionRequest {
        action: kind,
        method: Method::Post,
        segments,
        body,
    })
}

/// Signal request body with the input encoded as a `json/plain` payload
///
/// A missing, null or empty-string input sends `payloads: null`.
fn signal_body(name: &str, input: Option<&Value>) -> Result<Value> {
    let payloads = match input {
        Some(input) if !input.is_null() && input.as_str() != Some("") => {
            let data = serde_json::to_string(input)?;
            json!([{
                "metadata": { "encoding": Base64.encode(JSON_PLAIN_ENCODING) },
                "data": Base64.encode(data),
            }])
        }
        _ => Value::Null,
    };

    Ok(json!({
        "signalName": name,
        "input": { "payloads": payloads },
    }))
}
