use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use netdesign_app::{EditorSettings, TopologyEditor};
use netdesign_backend::{BackendSnapshot, InMemoryBackend};
use netdesign_core::{NodeId, ValidationRules};
use netdesign_events::{EditorContext, Event, EventListener};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend document (nodes, links, multicast groups, traffics) as JSON
    #[arg(short, long)]
    scenario: PathBuf,

    /// Editor settings file. Defaults to the per-user config location
    #[arg(long)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the routed frame handed to the renderer
    Render,
    /// Validate the topology and print every error
    Validate {
        /// Required-property rules document
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },
    /// Print the hop-shortest path between two nodes
    Path { from: String, to: String },
    /// Print the generated switch policies
    Policies,
    /// Write the settings in effect to the per-user config location
    SaveSettings,
}

/// Writes the editor's user notifications to stderr.
struct NotificationPrinter;

impl EventListener for NotificationPrinter {
    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::ShowInfo { message } => eprintln!("info: {message}"),
            Event::ShowWarning { message } => eprintln!("warning: {message}"),
            Event::ShowError { message } => eprintln!("error: {message}"),
            _ => {}
        }
    }
}

fn read_rules(path: Option<&Path>) -> Result<ValidationRules> {
    let Some(path) = path else {
        return Ok(ValidationRules::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules {}", path.display()))?;
    ValidationRules::from_json(&content).context("Failed to parse validation rules")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => EditorSettings::load_from(path),
        None => EditorSettings::load(),
    };
    let content = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("Failed to read scenario {}", args.scenario.display()))?;
    let snapshot: BackendSnapshot =
        serde_json::from_str(&content).context("Failed to parse scenario")?;

    let backend = InMemoryBackend::with_snapshot(snapshot);
    let mut editor = TopologyEditor::new(backend, settings, EditorContext::default());
    let loaded = editor.load_from_backend().await;
    editor.context().bus().dispatch_to(&mut NotificationPrinter);
    loaded?;
    tracing::info!(
        nodes = editor.graph().node_count(),
        links = editor.graph().edge_count(),
        "scenario loaded"
    );

    match args.command {
        Command::Render => {
            println!("{}", editor.frame().to_json()?);
        }
        Command::Validate { rules } => {
            let rules = read_rules(rules.as_deref())?;
            let mut count = 0;
            for error in editor.validate(&rules).iter().flatten() {
                println!("{error}");
                count += 1;
            }
            for error in editor.check_multicast_groups() {
                println!("{error}");
                count += 1;
            }
            println!("{count} validation error(s)");
        }
        Command::Path { from, to } => {
            let path = editor.highlight_signal_path(&NodeId::new(from), &NodeId::new(to));
            if path.is_empty() {
                println!("No path found.");
            } else {
                let hops: Vec<_> = path.iter().map(NodeId::as_str).collect();
                println!("{}", hops.join(" -> "));
            }
        }
        Command::Policies => {
            let policies = editor.generate_policies().await?;
            println!("{}", String::from_utf8_lossy(&policies));
        }
        Command::SaveSettings => {
            editor.settings().save();
            if let Some(path) = EditorSettings::default_path() {
                println!("{}", path.display());
            }
        }
    }
    editor.context().bus().dispatch_to(&mut NotificationPrinter);
    Ok(())
}
