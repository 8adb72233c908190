use anyhow::{Context, Result};
use clap::Parser;
use eventlens::actions::{self, WorkflowAction, WorkflowTarget};
use eventlens::cli::{ActionCommand, Cli, Command, OutputFormat, TargetArgs};
use eventlens::csv_output::CsvOutput;
use eventlens::event::HistoryItem;
use eventlens::grouping::group_events;
use eventlens::history::load_history;
use eventlens::json_output::{JsonEventDetail, JsonOutput};
use eventlens::report::{attribute_rows, event_stack_trace, DisplayMode, SummaryRow};
use eventlens::routes::{self, ListParameters};
use eventlens::settings::Settings;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Summary rows for a history, grouped or flat
fn summary_rows(history: &Path, group: bool) -> Result<Vec<SummaryRow>> {
    let events = load_history(history)?;
    let rows = if group {
        group_events(events)
            .iter()
            .map(|entry| SummaryRow::from_item(entry.as_item()))
            .collect()
    } else {
        events
            .iter()
            .map(|event| SummaryRow::from_item(HistoryItem::Event(event)))
            .collect()
    };
    Ok(rows)
}

fn print_text_summaries(rows: &[SummaryRow], stack_traces: bool) {
    for row in rows {
        let group = match &row.group {
            Some(group) => format!(" [{} {} x{}]", group.category.as_str(), group.name, group.events),
            None => String::new(),
        };
        if row.summary.is_empty() {
            println!("{:>5}  {}{}", row.id, row.event_type, group);
        } else {
            println!(
                "{:>5}  {}{}  {}: {}",
                row.id,
                row.event_type,
                group,
                row.label,
                row.value_text()
            );
        }

        if let (true, Some(trace)) = (stack_traces, &row.stack_trace) {
            for line in trace.lines() {
                println!("         | {}", line);
            }
        }
    }
}

fn run_summarize(history: &Path, group: bool, format: OutputFormat, stack_traces: bool) -> Result<()> {
    let rows = summary_rows(history, group)?;
    match format {
        OutputFormat::Text => print_text_summaries(&rows, stack_traces),
        OutputFormat::Json => {
            let mut output = JsonOutput::new();
            for row in rows {
                output.add_row(row);
            }
            println!("{}", output.to_json()?);
        }
        OutputFormat::Csv => {
            let mut output = CsvOutput::new(group);
            for row in rows {
                output.add_row(row);
            }
            print!("{}", output.to_csv());
        }
    }
    Ok(())
}

fn run_inspect(history: &Path, event_id: &str, format: OutputFormat) -> Result<()> {
    let events = load_history(history)?;
    let event = events
        .iter()
        .find(|event| event.id == event_id)
        .with_context(|| format!("Event {} not found in {}", event_id, history.display()))?;

    let rows = attribute_rows(event);
    match format {
        OutputFormat::Json => {
            let detail = JsonEventDetail {
                id: event.id.clone(),
                event_type: event.event_type.to_string(),
                attributes: rows,
                stack_trace: event_stack_trace(event),
            };
            println!("{}", detail.to_json()?);
        }
        OutputFormat::Text => {
            println!("Event {} ({})", event.id, event.event_type);
            let width = rows.iter().map(|row| row.label.len()).max().unwrap_or(0);
            for row in &rows {
                let value = match &row.value {
                    Value::String(s) => s.clone(),
                    other if row.display == DisplayMode::CodeBlock => {
                        serde_json::to_string_pretty(other)?
                    }
                    other => other.to_string(),
                };
                let tag = match row.display {
                    DisplayMode::Link(link) => format!("  -> {:?}", link),
                    _ => String::new(),
                };
                println!("  {:<width$}  {}{}", row.label, value, tag, width = width);
            }
            if let Some(trace) = event_stack_trace(event) {
                println!("Stack trace:");
                println!("{}", trace);
            }
        }
        OutputFormat::Csv => anyhow::bail!("CSV output is only supported for summarize"),
    }
    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let settings = match path {
        Some(path) => Settings::load(path)?,
        None => Settings::embedded_default()?,
    };
    let env_override = std::env::var("EVENTLENS_ENV").ok();
    Ok(settings.with_environment_override(env_override.as_deref()))
}

/// Signal input is sent as JSON when it parses, otherwise as a string
fn parse_signal_input(input: Option<String>) -> Option<Value> {
    input.map(|raw| serde_json::from_str(&raw).unwrap_or(Value::String(raw)))
}

fn parse_origin(address: &str) -> Result<Url> {
    Url::parse(address).with_context(|| format!("Invalid API address: {}", address))
}

fn workflow_target(target: &TargetArgs, settings: &Settings) -> WorkflowTarget {
    WorkflowTarget::new(
        target
            .namespace
            .clone()
            .unwrap_or_else(|| settings.default_namespace.clone()),
        target.workflow_id.clone(),
        target.run_id.clone(),
    )
}

struct ListOptions {
    namespace: Option<String>,
    parameters: ListParameters,
    archived: bool,
    count: bool,
    settings: Option<PathBuf>,
    address: String,
}

fn run_list(options: ListOptions) -> Result<()> {
    let settings = load_settings(options.settings.as_deref())?;
    let origin = parse_origin(&options.address)?;
    let namespace = options
        .namespace
        .unwrap_or_else(|| settings.default_namespace.clone());

    let request = routes::list_workflows(&namespace, &options.parameters, options.archived)?;
    println!("{} {}", request.method, request.url(&origin)?);

    if options.count {
        let query = options.parameters.list_query();
        let plan = routes::count_workflows(&namespace, &query)?;
        for request in plan.requests() {
            println!("{} {}", request.method, request.url(&origin)?);
        }
    }
    Ok(())
}

fn run_describe(target: TargetArgs) -> Result<()> {
    let settings = load_settings(target.settings.as_deref())?;
    let origin = parse_origin(&target.address)?;
    let request = routes::fetch_workflow(&workflow_target(&target, &settings))?;
    println!("{} {}", request.method, request.url(&origin)?);
    Ok(())
}

fn run_action(action: ActionCommand, target: TargetArgs) -> Result<()> {
    let settings = load_settings(target.settings.as_deref())?;
    let origin = parse_origin(&target.address)?;
    let execution = workflow_target(&target, &settings);

    let action = match action {
        ActionCommand::Cancel => WorkflowAction::Cancel,
        ActionCommand::Terminate { reason } => WorkflowAction::Terminate { reason },
        ActionCommand::Signal { name, input } => WorkflowAction::Signal {
            name,
            input: parse_signal_input(input),
        },
        ActionCommand::Reset { event_id, reason } => WorkflowAction::Reset { event_id, reason },
    };

    let request = actions::plan(&action, &execution, &settings)?;
    println!("{} {}", request.method, request.url(&origin)?);
    if let Some(body) = request.body_json()? {
        println!("{}", body);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    match args.command {
        Command::Summarize {
            history,
            group,
            format,
            stack_traces,
        } => run_summarize(&history, group, format, stack_traces),
        Command::Inspect {
            history,
            event,
            format,
        } => run_inspect(&history, &event, format),
        Command::List {
            namespace,
            query,
            workflow_id,
            workflow_type,
            status,
            archived,
            count,
            settings,
            address,
        } => run_list(ListOptions {
            namespace,
            parameters: ListParameters {
                query,
                workflow_id,
                workflow_type,
                execution_status: status,
            },
            archived,
            count,
            settings,
            address,
        }),
        Command::Describe { target } => run_describe(target),
        Command::Action { action, target } => run_action(action, target),
    }
}
