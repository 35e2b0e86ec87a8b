use crate::diagnostics::TracingDiagnostics;
use crate::handler::ConsoleResultHandler;
use crate::launch::{LaunchDispatcher, LaunchGate, LaunchTrigger};
use crate::model::LaunchConfig;
use crate::orchestrator::{forward_stdin, run_controller, TriggerCommand, HELP};
use crate::output::{OutputLine, OutputWriter};
use crate::service::{ExecutionService, GraphqlExecutionService};
use crate::variables::{ExecutionTag, VariablesFile};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "pipeline-launch",
    version,
    about = "Launch pipeline runs through a GraphQL execution service"
)]
pub struct Cli {
    /// Name of the pipeline to launch
    pub pipeline: String,

    /// Base URL of the execution service (the GraphQL endpoint is <base-url>/graphql)
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    pub base_url: String,

    /// Run config JSON file [default: <config dir>/pipeline-launch/variables.json]
    #[arg(long)]
    pub variables: Option<PathBuf>,

    /// Execution mode
    #[arg(long, default_value = "default")]
    pub mode: String,

    /// Restrict the run to these solids (repeatable)
    #[arg(long = "solid")]
    pub solids: Vec<String>,

    /// Attach an execution tag, as key=value (repeatable)
    #[arg(long = "tag", value_parser = ExecutionTag::parse)]
    pub tags: Vec<ExecutionTag>,

    /// Request timeout for the execution service
    #[arg(long, default_value = "30s")]
    pub timeout: humantime::Duration,

    /// Print each outcome as a JSON object
    #[arg(long)]
    pub json: bool,

    /// Keep the trigger open and drive it from stdin
    #[arg(long)]
    pub interactive: bool,

    /// Start the interactive trigger disabled
    #[arg(long, requires = "interactive")]
    pub disabled: bool,
}

fn default_variables_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("pipeline-launch"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("variables.json")
}

/// Build a `LaunchConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> LaunchConfig {
    LaunchConfig {
        base_url: args.base_url.trim_end_matches('/').to_string(),
        pipeline: args.pipeline.clone(),
        variables_path: args.variables.clone().unwrap_or_else(default_variables_path),
        mode: args.mode.clone(),
        solid_subset: (!args.solids.is_empty()).then(|| args.solids.clone()),
        tags: args.tags.clone(),
        request_timeout: Duration::from(args.timeout),
        user_agent: format!("pipeline-launch/{}", env!("CARGO_PKG_VERSION")),
        json: args.json,
        interactive: args.interactive,
        start_disabled: args.disabled,
    }
}

/// Everything a launch session needs once the execution service is chosen.
struct Session {
    trigger: LaunchTrigger,
    handler: Arc<ConsoleResultHandler>,
    writer: OutputWriter,
}

impl Session {
    fn open(cfg: &LaunchConfig, service: Arc<dyn ExecutionService>, writer: OutputWriter) -> Self {
        let source = VariablesFile {
            path: cfg.variables_path.clone(),
            pipeline_name: cfg.pipeline.clone(),
            mode: cfg.mode.clone(),
            solid_subset: cfg.solid_subset.clone(),
            tags: cfg.tags.clone(),
        };
        let handler = Arc::new(ConsoleResultHandler::new(
            &cfg.base_url,
            cfg.json,
            writer.sender(),
        ));
        let dispatcher = LaunchDispatcher::new(
            LaunchGate::new(Arc::new(source)),
            service,
            handler.clone(),
            Arc::new(TracingDiagnostics),
        );
        let mut trigger = LaunchTrigger::new(cfg.pipeline.clone(), Arc::new(dispatcher));
        trigger.set_disabled(cfg.start_disabled);
        Self {
            trigger,
            handler,
            writer,
        }
    }
}

/// Outcome counts of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SessionSummary {
    launched: usize,
    failed: usize,
}

/// Drive the session to completion and flush its output.
async fn run_session(session: Session, interactive: bool) -> (Result<()>, SessionSummary) {
    let Session {
        trigger,
        handler,
        writer,
    } = session;

    let res = if interactive {
        run_interactive(trigger, &writer.sender()).await;
        Ok(())
    } else {
        run_once(trigger).await
    };

    let summary = SessionSummary {
        launched: handler.launched(),
        failed: handler.failed(),
    };
    // The writer exits once the handler's sender is gone as well.
    drop(handler);
    writer.finish().await;
    (res, summary)
}

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    tracing::debug!(?cfg, "resolved launch config");

    let service = GraphqlExecutionService::new(&cfg.base_url, cfg.request_timeout, &cfg.user_agent)
        .context("failed to build HTTP client")?;
    let session = Session::open(&cfg, Arc::new(service), OutputWriter::spawn());
    let (res, summary) = run_session(session, cfg.interactive).await;
    res?;

    if !cfg.interactive && summary.launched == 0 {
        if summary.failed > 0 {
            anyhow::bail!("launch of {} was rejected", cfg.pipeline);
        }
        anyhow::bail!(
            "no run launched for {} (check the run config at {} and the log above)",
            cfg.pipeline,
            cfg.variables_path.display()
        );
    }
    Ok(())
}

/// Activate the trigger once and wait for the outcome to be dispatched.
async fn run_once(trigger: LaunchTrigger) -> Result<()> {
    let handle = trigger
        .activate()
        .context("trigger is disabled")?;
    handle.await.context("launch task failed")
}

async fn run_interactive(trigger: LaunchTrigger, out_tx: &mpsc::UnboundedSender<OutputLine>) {
    let pipeline = trigger.state().identifier.clone();
    let _ = out_tx.send(OutputLine::Stderr(format!("{pipeline}: {HELP}")));

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<TriggerCommand>();
    let input = tokio::spawn(forward_stdin(cmd_tx));
    let activations = run_controller(trigger, cmd_rx).await;
    // A pending stdin read cannot be interrupted; main exits the process explicitly.
    input.abort();

    tracing::info!(pipeline = %pipeline, activations, "interactive session finished");
}
