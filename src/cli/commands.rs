//! Command dispatch for the sankey-tree CLI

use std::collections::HashSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::services::VisibilityService;
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{Action, Layout, LinkKey, Snapshot};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::infrastructure::traits::{LayoutEngine, LinkCache};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see --help".to_string(),
        ));
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?;
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Tree { data } => cmd_tree(&container, data.as_deref()),
        Commands::View {
            data,
            actions,
            json,
        } => cmd_view(&container, data.as_deref(), actions, *json),
        Commands::Layout {
            data,
            actions,
            width,
            height,
        } => cmd_layout(&container, data.as_deref(), actions, *width, *height),
        Commands::Config { command } => cmd_config(&container, command),
        Commands::Completion { .. } => Ok(()),
    }
}

/// Data file from the command line, falling back to `data_file` in settings.
fn resolve_data(container: &ServiceContainer, data: Option<&Path>) -> CliResult<PathBuf> {
    data.map(Path::to_path_buf)
        .or_else(|| container.settings.data_file.clone())
        .ok_or_else(|| {
            CliError::Usage("no data file given and no data_file configured".to_string())
        })
}

/// Build the engine, run the initial render and check the configured root.
fn start_engine(container: &ServiceContainer, data: &Path) -> CliResult<VisibilityService> {
    let mut engine = container.visibility_service(data)?;
    let initial_root = container.settings.initial_root.as_deref();
    if let Some(root) = initial_root {
        if engine.store().find(root).is_none() {
            output::warning(&format!("initial_root '{root}' not found, nothing expanded"));
        }
    }
    engine.reveal_initial(initial_root);
    Ok(engine)
}

/// Mark a snapshot as rendered; returns the links it newly shows.
fn render(snapshot: &Snapshot, cache: &dyn LinkCache) -> HashSet<LinkKey> {
    let entering: HashSet<LinkKey> = snapshot
        .entering_links(|key| cache.contains(key))
        .map(|link| link.key.clone())
        .collect();
    for link in &snapshot.links {
        cache.remember(&link.key);
    }
    entering
}

fn to_json(value: &impl Serialize) -> CliResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| {
        ApplicationError::OperationFailed {
            context: "serialize output".to_string(),
            source: Box::new(e),
        }
        .into()
    })
}

/// Write machine-readable output to stdout.
fn emit(text: &str) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{text}").map_err(|e| InfraError::output("stdout", e))?;
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_tree(container: &ServiceContainer, data: Option<&Path>) -> CliResult<()> {
    let data = resolve_data(container, data)?;
    let store = container.dataset_service().build_store(&data)?;
    debug!("cmd_tree: {} nodes, depth {}", store.len(), store.depth());
    output::info(&output::store_tree(&store));
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_view(
    container: &ServiceContainer,
    data: Option<&Path>,
    actions: &[Action],
    json: bool,
) -> CliResult<()> {
    let data = resolve_data(container, data)?;
    let mut engine = start_engine(container, &data)?;
    let cache = container.link_cache.as_ref();

    let mut snapshot = engine.snapshot();
    let mut entering = render(&snapshot, cache);
    for action in actions {
        if engine.store().find(action.target()).is_none() {
            output::warning(&format!("no node named '{}', ignoring {action}", action.target()));
        }
        snapshot = engine.apply(action);
        entering = render(&snapshot, cache);
        debug!("cmd_view: {action} -> {} entering links", entering.len());
    }

    if json {
        emit(&to_json(&snapshot)?)?;
    } else {
        output::info(&output::snapshot_tree(&snapshot, &entering));
    }
    Ok(())
}

#[derive(Serialize)]
struct PositionedNode<'a> {
    name: &'a str,
    #[serde(flatten)]
    geometry: crate::domain::NodeGeometry,
}

#[derive(Serialize)]
struct PositionedLink<'a> {
    key: &'a LinkKey,
    source: &'a str,
    target: &'a str,
    value: f64,
    #[serde(flatten)]
    geometry: crate::domain::LinkGeometry,
}

#[derive(Serialize)]
struct PositionedSnapshot<'a> {
    nodes: Vec<PositionedNode<'a>>,
    links: Vec<PositionedLink<'a>>,
}

/// Join domain snapshot and geometry by handle and link key.
fn join_geometry<'a>(snapshot: &'a Snapshot, layout: &Layout) -> PositionedSnapshot<'a> {
    PositionedSnapshot {
        nodes: snapshot
            .nodes
            .iter()
            .filter_map(|node| {
                layout.node(node.id).map(|g| PositionedNode {
                    name: &node.name,
                    geometry: *g,
                })
            })
            .collect(),
        links: snapshot
            .links
            .iter()
            .filter_map(|link| {
                layout.link(&link.key).map(|g| PositionedLink {
                    key: &link.key,
                    source: &link.source_name,
                    target: &link.target_name,
                    value: link.value,
                    geometry: *g,
                })
            })
            .collect(),
    }
}

#[instrument(level = "debug", skip(container))]
fn cmd_layout(
    container: &ServiceContainer,
    data: Option<&Path>,
    actions: &[Action],
    width: Option<f64>,
    height: Option<f64>,
) -> CliResult<()> {
    let data = resolve_data(container, data)?;
    let mut engine = start_engine(container, &data)?;
    for action in actions {
        engine.apply(action);
    }
    let snapshot = engine.snapshot();

    let mut layout_engine = container.layout_engine();
    if let Some(width) = width {
        layout_engine.width = width;
    }
    if let Some(height) = height {
        layout_engine.height = height;
    }
    if layout_engine.width <= 0.0 || layout_engine.height <= 0.0 {
        return Err(CliError::InvalidArgs(
            "width and height must be positive".to_string(),
        ));
    }

    let layout = layout_engine.layout(&snapshot);
    emit(&to_json(&join_geometry(&snapshot, &layout))?)
}

fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::header("Effective settings");
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => {
                let state = if path.exists() { "exists" } else { "not created" };
                output::action("global", &path.display());
                output::detail(&state);
            }
            None => output::warning("no home directory, global config unavailable"),
        },
    }
    Ok(())
}
