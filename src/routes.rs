//! Read-only API routes: workflow listing, counts and single-workflow fetch
//!
//! Like [`crate::actions`], nothing here performs I/O. Each planned
//! [`ApiRequest`] carries the method, the unencoded path segments and the
//! query parameters, and is resolved against an API origin by the caller.

use crate::actions::{resolve_path, ActionError, Method, Result, WorkflowTarget};
use serde::Serialize;
use url::Url;

/// Endpoint a read request addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Endpoint {
    Workflows,
    ArchivedWorkflows,
    WorkflowCount,
    Workflow,
}

/// A shaped read request, ready for a transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiRequest {
    pub endpoint: Endpoint,
    pub method: Method,
    /// Unencoded API path segments
    pub segments: Vec<String>,
    /// Query parameters in send order
    pub params: Vec<(String, String)>,
}

impl ApiRequest {
    fn get(endpoint: Endpoint, segments: Vec<String>, params: Vec<(String, String)>) -> Self {
        Self {
            endpoint,
            method: Method::Get,
            segments,
            params,
        }
    }

    /// Resolve the request against an API origin
    pub fn url(&self, origin: &Url) -> Result<Url> {
        let mut url = resolve_path(origin, &self.segments)?;
        if !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.params);
        }
        Ok(url)
    }
}

/// Filters for listing workflows
///
/// An explicit `query` wins; otherwise the set filters are combined into a
/// visibility query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParameters {
    pub query: Option<String>,
    pub workflow_id: Option<String>,
    pub workflow_type: Option<String>,
    pub execution_status: Option<String>,
}

impl ListParameters {
    /// Visibility query built from the individual filters
    pub fn filter_query(&self) -> String {
        [
            ("WorkflowId", &self.workflow_id),
            ("WorkflowType", &self.workflow_type),
            ("ExecutionStatus", &self.execution_status),
        ]
        .iter()
        .filter_map(|(attribute, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| format!("{}=\"{}\"", attribute, v))
        })
        .collect::<Vec<_>>()
        .join(" and ")
    }

    /// Query sent with a list request, percent-decoded when it decodes
    pub fn list_query(&self) -> String {
        let raw = match self.query.as_deref() {
            Some(query) if !query.is_empty() => query.to_string(),
            _ => self.filter_query(),
        };
        decode_query(&raw)
    }
}

/// Percent-decode a query, returning it untouched if it is malformed
///
/// A stray `%` without two hex digits, or bytes that do not form UTF-8,
/// leave the whole query as given. `+` is not treated as a space.
pub fn decode_query(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let well_formed = bytes.iter().enumerate().all(|(i, b)| {
        *b != b'%'
            || (bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    });
    if !well_formed {
        return raw.to_string();
    }
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

fn namespace_segments(namespace: &str) -> Result<Vec<String>> {
    if namespace.is_empty() {
        return Err(ActionError::MissingField("namespace"));
    }
    Ok(["api", "v1", "namespaces", namespace]
        .iter()
        .map(|s| s.to_string())
        .collect())
}

/// Plan a workflow list request, live or archived
pub fn list_workflows(
    namespace: &str,
    parameters: &ListParameters,
    archived: bool,
) -> Result<ApiRequest> {
    let mut segments = namespace_segments(namespace)?;
    segments.push("workflows".to_string());
    let endpoint = if archived {
        segments.push("archived".to_string());
        Endpoint::ArchivedWorkflows
    } else {
        Endpoint::Workflows
    };

    let query = parameters.list_query();
    tracing::debug!(namespace, archived, %query, "planned workflow list request");
    Ok(ApiRequest::get(
        endpoint,
        segments,
        vec![("query".to_string(), query)],
    ))
}

/// Count requests for a workflow list
///
/// An unfiltered list needs only the total; a filtered one also counts the
/// matching executions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered: Option<ApiRequest>,
    pub total: ApiRequest,
}

impl CountPlan {
    /// Requests in send order
    pub fn requests(&self) -> impl Iterator<Item = &ApiRequest> {
        self.filtered.iter().chain(std::iter::once(&self.total))
    }
}

/// Plan the count requests for `query`
pub fn count_workflows(namespace: &str, query: &str) -> Result<CountPlan> {
    let mut segments = namespace_segments(namespace)?;
    segments.push("workflow-count".to_string());

    let count = |query: Option<&str>| {
        let params = query
            .map(|q| vec![("query".to_string(), q.to_string())])
            .unwrap_or_default();
        ApiRequest::get(Endpoint::WorkflowCount, segments.clone(), params)
    };

    if query.is_empty() {
        return Ok(CountPlan {
            filtered: None,
            total: count(None),
        });
    }
    Ok(CountPlan {
        filtered: Some(count(Some(query))),
        total: count(Some("")),
    })
}

/// Plan the fetch of a single workflow execution
pub fn fetch_workflow(target: &WorkflowTarget) -> Result<ApiRequest> {
    target.validate()?;
    let mut segments = namespace_segments(&target.namespace)?;
    segments.extend([
        "workflows".to_string(),
        target.workflow_id.clone(),
        "runs".to_string(),
        target.run_id.clone(),
    ]);
    Ok(ApiRequest::get(Endpoint::Workflow, segments, Vec::new()))
}
