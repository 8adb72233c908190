//! UI settings and write-action gates
//!
//! Settings arrive either as the server's settings response (PascalCase
//! JSON, every field optional) or from a TOML settings file (snake_case).
//! Both land in [`Settings`], which decides which control actions the UI
//! may issue.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Namespace used when the server does not configure one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Host suffixes of hosted (cloud) deployments
const CLOUD_HOST_SUFFIXES: [&str; 2] = ["tmprl.cloud", "tmprl-test.cloud"];

/// Remote codec (data converter) endpoint configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub pass_access_token: bool,
}

/// Forced runtime environment, bypassing host detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    Cloud,
    Local,
}

impl RuntimeEnvironment {
    /// Parse an environment override; unknown values are ignored
    pub fn from_override(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cloud" => Some(RuntimeEnvironment::Cloud),
            "local" => Some(RuntimeEnvironment::Local),
            _ => None,
        }
    }
}

/// Settings controlling what the UI shows and which actions it allows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_namespace: String,
    /// Master switch: disables every write action
    pub disable_write_actions: bool,
    pub workflow_terminate_disabled: bool,
    pub workflow_cancel_disabled: bool,
    pub workflow_signal_disabled: bool,
    pub workflow_reset_disabled: bool,
    pub batch_actions_disabled: bool,
    pub show_system_namespace: bool,
    pub notify_on_new_version: bool,
    pub codec: CodecSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<RuntimeEnvironment>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            disable_write_actions: false,
            workflow_terminate_disabled: false,
            workflow_cancel_disabled: false,
            workflow_signal_disabled: false,
            workflow_reset_disabled: false,
            batch_actions_disabled: false,
            show_system_namespace: false,
            notify_on_new_version: false,
            codec: CodecSettings::default(),
            feedback_url: None,
            version: None,
            environment: None,
        }
    }
}

/// Codec section of the server's settings response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CodecResponse {
    pub endpoint: Option<String>,
    pub pass_access_token: Option<bool>,
}

/// Settings response as returned by the server's settings endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SettingsResponse {
    pub default_namespace: Option<String>,
    pub disable_write_actions: Option<bool>,
    pub workflow_terminate_disabled: Option<bool>,
    pub workflow_cancel_disabled: Option<bool>,
    pub workflow_signal_disabled: Option<bool>,
    pub workflow_reset_disabled: Option<bool>,
    pub batch_actions_disabled: Option<bool>,
    pub show_temporal_system_namespace: Option<bool>,
    pub notify_on_new_version: Option<bool>,
    pub codec: Option<CodecResponse>,
    #[serde(rename = "FeedbackURL")]
    pub feedback_url: Option<String>,
    pub version: Option<String>,
}

impl From<SettingsResponse> for Settings {
    fn from(response: SettingsResponse) -> Self {
        let codec = response.codec.unwrap_or_default();
        Self {
            // The server sends an empty string when no default is configured
            default_namespace: response
                .default_namespace
                .filter(|ns| !ns.is_empty())
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            disable_write_actions: response.disable_write_actions.unwrap_or(false),
            workflow_terminate_disabled: response.workflow_terminate_disabled.unwrap_or(false),
            workflow_cancel_disabled: response.workflow_cancel_disabled.unwrap_or(false),
            workflow_signal_disabled: response.workflow_signal_disabled.unwrap_or(false),
            workflow_reset_disabled: response.workflow_reset_disabled.unwrap_or(false),
            batch_actions_disabled: response.batch_actions_disabled.unwrap_or(false),
            show_system_namespace: response.show_temporal_system_namespace.unwrap_or(false),
            notify_on_new_version: response.notify_on_new_version.unwrap_or(false),
            codec: CodecSettings {
                endpoint: codec.endpoint.filter(|e| !e.is_empty()),
                pass_access_token: codec.pass_access_token.unwrap_or(false),
            },
            feedback_url: response.feedback_url.filter(|u| !u.is_empty()),
            version: response.version.filter(|v| !v.is_empty()),
            environment: None,
        }
    }
}

impl Settings {
    /// Built-in settings compiled into the binary
    pub fn embedded_default() -> Result<Self> {
        const DEFAULT_TOML: &str = include_str!("../settings-default.toml");
        toml::from_str(DEFAULT_TOML).context("Failed to parse embedded settings-default.toml")
    }

    /// Load settings from a TOML file
    ///
    /// Missing keys take their defaults, so a file may set only the gates
    /// it cares about.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read settings file: {}", path.as_ref().display())
        })?;
        let settings: Settings =
            toml::from_str(&content).with_context(|| "Failed to parse TOML settings")?;
        tracing::debug!(path = %path.as_ref().display(), "loaded settings file");
        Ok(settings.normalized())
    }

    /// Parse the server's JSON settings response
    pub fn from_response_json(content: &str) -> Result<Self> {
        let response: SettingsResponse =
            serde_json::from_str(content).context("Failed to parse settings response")?;
        Ok(response.into())
    }

    /// Load settings from a file, choosing the format by extension
    ///
    /// `.json` files are read as a server settings response, anything else
    /// as TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.extension().is_some_and(|ext| ext == "json") {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
            Self::from_response_json(&content)
        } else {
            Self::from_toml(path)
        }
    }

    /// Apply an environment override such as `cloud` or `local`
    pub fn with_environment_override(mut self, value: Option<&str>) -> Self {
        if let Some(env) = value.and_then(RuntimeEnvironment::from_override) {
            self.environment = Some(env);
        }
        self
    }

    fn normalized(mut self) -> Self {
        if self.default_namespace.is_empty() {
            self.default_namespace = DEFAULT_NAMESPACE.to_string();
        }
        self
    }

    pub fn workflow_cancel_enabled(&self) -> bool {
        !self.disable_write_actions && !self.workflow_cancel_disabled
    }

    pub fn workflow_terminate_enabled(&self) -> bool {
        !self.disable_write_actions && !self.workflow_terminate_disabled
    }

    pub fn workflow_signal_enabled(&self) -> bool {
        !self.disable_write_actions && !self.workflow_signal_disabled
    }

    pub fn workflow_reset_enabled(&self) -> bool {
        !self.disable_write_actions && !self.workflow_reset_disabled
    }

    pub fn batch_actions_enabled(&self) -> bool {
        !self.disable_write_actions && !self.batch_actions_disabled
    }

    /// Whether the UI is served from a hosted deployment
    ///
    /// An explicit environment override wins over host detection.
    pub fn is_cloud(&self, host: &str) -> bool {
        match self.environment {
            Some(env) => env == RuntimeEnvironment::Cloud,
            None => is_cloud_host(host),
        }
    }

    pub fn is_local(&self, host: &str) -> bool {
        match self.environment {
            Some(env) => env == RuntimeEnvironment::Local,
            None => !is_cloud_host(host),
        }
    }
}

fn is_cloud_host(host: &str) -> bool {
    CLOUD_HOST_SUFFIXES
        .iter()
        .any(|suffix| host.ends_with(suffix))
}
