//! CLI argument parsing for eventlens

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for summaries and event details
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis (summaries only)
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "eventlens")]
#[command(version)]
#[command(about = "Inspect workflow histories and shape control-action requests", long_about = None)]
pub struct Cli {
    /// Enable debug tracing output to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a one-line summary for every event (or event group) in a history
    Summarize {
        /// History JSON file (API response, {"events": [...]}, or a bare array)
        history: PathBuf,

        /// Collapse related events (activities, timers, child workflows) into groups
        #[arg(short = 'g', long = "group")]
        group: bool,

        /// Output format
        #[arg(long = "format", value_enum, default_value = "text")]
        format: OutputFormat,

        /// Show the stack trace of failed events under their summary (text format)
        #[arg(long = "stack-traces")]
        stack_traces: bool,
    },

    /// Show every displayable attribute of one event
    Inspect {
        /// History JSON file
        history: PathBuf,

        /// Event id to inspect
        #[arg(short = 'e', long = "event", value_name = "ID")]
        event: String,

        /// Output format (text or json)
        #[arg(long = "format", value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Plan a workflow list request (and optionally its counts)
    List {
        /// Namespace (defaults to the settings' default namespace)
        #[arg(short = 'n', long = "namespace")]
        namespace: Option<String>,

        /// Visibility query; percent-encoded queries are decoded
        #[arg(short = 'q', long = "query")]
        query: Option<String>,

        /// Filter by workflow id (ignored when --query is set)
        #[arg(long = "workflow-id")]
        workflow_id: Option<String>,

        /// Filter by workflow type (ignored when --query is set)
        #[arg(long = "workflow-type")]
        workflow_type: Option<String>,

        /// Filter by execution status (ignored when --query is set)
        #[arg(long = "status")]
        status: Option<String>,

        /// List archived executions
        #[arg(long = "archived")]
        archived: bool,

        /// Also print the workflow count requests
        #[arg(long = "count")]
        count: bool,

        /// Settings file (.toml, or .json settings response)
        #[arg(long = "settings", value_name = "FILE")]
        settings: Option<PathBuf>,

        /// API origin the request path is resolved against
        #[arg(long = "address", value_name = "URL", default_value = "http://localhost:8233")]
        address: String,
    },

    /// Plan the fetch of a single workflow execution
    Describe {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Plan a control action and print the request it would send
    Action {
        #[command(subcommand)]
        action: ActionCommand,

        #[command(flatten)]
        target: TargetArgs,
    },
}

/// Execution and settings shared by every action
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Namespace (defaults to the settings' default namespace)
    #[arg(short = 'n', long = "namespace", global = true)]
    pub namespace: Option<String>,

    /// Workflow id
    #[arg(short = 'w', long = "workflow-id", global = true, default_value = "")]
    pub workflow_id: String,

    /// Run id
    #[arg(short = 'r', long = "run-id", global = true, default_value = "")]
    pub run_id: String,

    /// Settings file (.toml, or .json settings response)
    #[arg(long = "settings", value_name = "FILE", global = true)]
    pub settings: Option<PathBuf>,

    /// API origin the request path is resolved against
    #[arg(
        long = "address",
        value_name = "URL",
        global = true,
        default_value = "http://localhost:8233"
    )]
    pub address: String,
}

#[derive(Subcommand, Debug)]
pub enum ActionCommand {
    /// Request cancellation of a workflow execution
    Cancel,

    /// Terminate a workflow execution
    Terminate {
        /// Reason recorded with the termination
        #[arg(long, default_value = "")]
        reason: String,
    },

    /// Send a signal to a workflow execution
    Signal {
        /// Signal name
        #[arg(long = "name")]
        name: String,

        /// Signal input (parsed as JSON, otherwise sent as a string)
        #[arg(long = "input")]
        input: Option<String>,
    },

    /// Reset a workflow execution to a workflow task completion event
    Reset {
        /// Id of the workflow task completed/failed/timed-out event
        #[arg(long = "event-id")]
        event_id: String,

        /// Reason recorded with the reset
        #[arg(long, default_value = "")]
        reason: String,
    },
}
