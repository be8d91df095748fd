use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pdf_canvas_core::{EngineConfig, NewElement, PageInput, Point};
use pdf_canvas_ui::{Editor, Key, Modifiers, PointerEvent, SignaturePayload, Tool, ToolStyle};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "pdf-canvas-cli")]
#[command(about = "PDF annotation canvas CLI")]
pub struct Cli {
    /// Engine configuration file (JSON). Environment overrides still apply.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay an input script against a document and print the element export.
    Replay {
        /// Document description: rendered pages and optional preloaded elements.
        #[arg(long, value_name = "FILE")]
        document: PathBuf,
        /// JSON list of input steps.
        #[arg(long, value_name = "FILE")]
        script: PathBuf,
        /// Print the draw list of this page instead of the export.
        #[arg(long, value_name = "PAGE")]
        scene: Option<usize>,
    },
    /// Print the vertical page layout of a document.
    Layout {
        #[arg(long, value_name = "FILE")]
        document: PathBuf,
        #[arg(long, default_value_t = 1.0)]
        zoom: f32,
    },
    /// Print the effective engine configuration.
    Config,
    /// Print CLI version.
    Version,
}

/// Input document as handed over by an external renderer
#[derive(Debug, Deserialize)]
struct DocumentFile {
    pages: Vec<PageInput>,
    #[serde(default)]
    elements: Vec<NewElement>,
}

/// One step of a replay script
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ScriptStep {
    SetTool {
        tool: Tool,
    },
    SetStyle {
        style: ToolStyle,
    },
    SetSignature {
        #[serde(default)]
        payload: Option<SignaturePayload>,
    },
    SetZoom {
        zoom: f32,
    },
    SetScroll {
        x: f32,
        y: f32,
    },
    SetOrigin {
        x: f32,
        y: f32,
    },
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    /// Press, move and release in one step
    Drag {
        from: Point,
        to: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Click {
        x: f32,
        y: f32,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        double: bool,
    },
    Key {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Text {
        text: String,
    },
    Blur,
    Add {
        element: NewElement,
    },
}

#[derive(Debug, Serialize)]
struct LayoutOutput {
    page_count: usize,
    gap: f32,
    zoom: f32,
    total_height: f32,
    canvas_width: f32,
    canvas_height: f32,
    pages: Vec<PageSlotOutput>,
}

#[derive(Debug, Serialize)]
struct PageSlotOutput {
    index: usize,
    offset: f32,
    width: f32,
    height: f32,
    available: bool,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Replay { document, script, scene } => {
            let config = load_config(cli.config.as_deref())?;
            run_replay(config, &document, &script, scene)
        }
        Commands::Layout { document, zoom } => {
            let config = load_config(cli.config.as_deref())?;
            run_layout(config, &document, zoom)
        }
        Commands::Config => {
            let config = load_config(cli.config.as_deref())?;
            print_json(&config)
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?
            .with_env_overrides()
            .context("invalid configuration override in environment"),
        None => EngineConfig::from_env().context("invalid configuration override in environment"),
    }
}

fn run_replay(
    config: EngineConfig,
    document: &Path,
    script: &Path,
    scene: Option<usize>,
) -> Result<()> {
    let mut editor = open_editor(config, document)?;

    let steps: Vec<ScriptStep> = read_json(script)?;
    info!(steps = steps.len(), "replaying script");
    for (index, step) in steps.into_iter().enumerate() {
        apply_step(&mut editor, step).with_context(|| format!("script step {index} failed"))?;
    }

    match scene {
        Some(page) => {
            let scene =
                editor.render_page(page).with_context(|| format!("failed to render page {page}"))?;
            print_json(&scene)
        }
        None => print_json(&editor.export()),
    }
}

fn run_layout(config: EngineConfig, document: &Path, zoom: f32) -> Result<()> {
    let mut editor = open_editor(config, document)?;
    let zoom = editor.set_zoom(zoom);

    let Some(loaded) = editor.controller().document() else {
        anyhow::bail!("no document loaded");
    };
    let layout = loaded.layout();
    let canvas = editor.canvas_size();
    let pages = (0..layout.page_count())
        .filter_map(|index| {
            layout.slot(index).map(|slot| PageSlotOutput {
                index,
                offset: slot.offset,
                width: slot.width,
                height: slot.height,
                available: slot.available,
            })
        })
        .collect();

    let payload = LayoutOutput {
        page_count: layout.page_count(),
        gap: layout.gap(),
        zoom,
        total_height: layout.total_height(),
        canvas_width: canvas.width,
        canvas_height: canvas.height,
        pages,
    };
    print_json(&payload)
}

fn open_editor(config: EngineConfig, document: &Path) -> Result<Editor> {
    let file: DocumentFile = read_json(document)?;
    if file.pages.is_empty() {
        anyhow::bail!("document {} has no pages", document.display());
    }

    let mut editor = Editor::new(config);
    let handle = editor.load_document(file.pages);
    debug!(%handle, "document loaded");

    for element in file.elements {
        editor.add_element(element).context("failed to import element")?;
    }
    Ok(editor)
}

fn apply_step(editor: &mut Editor, step: ScriptStep) -> Result<()> {
    match step {
        ScriptStep::SetTool { tool } => editor.set_tool(tool),
        ScriptStep::SetStyle { style } => editor.set_style(style),
        ScriptStep::SetSignature { payload } => editor.set_signature_payload(payload),
        ScriptStep::SetZoom { zoom } => {
            editor.set_zoom(zoom);
        }
        ScriptStep::SetScroll { x, y } => editor.set_scroll(x, y),
        ScriptStep::SetOrigin { x, y } => editor.set_container_origin(x, y),
        ScriptStep::PointerDown(event) => editor.pointer_down(event),
        ScriptStep::PointerMove(event) => editor.pointer_move(event),
        ScriptStep::PointerUp(event) => editor.pointer_up(event),
        ScriptStep::Drag { from, to, modifiers } => {
            editor.pointer_down(PointerEvent::at(from.x, from.y).with_modifiers(modifiers));
            editor.pointer_move(PointerEvent::at(to.x, to.y).with_modifiers(modifiers));
            editor.pointer_up(PointerEvent::at(to.x, to.y).with_modifiers(modifiers));
        }
        ScriptStep::Click { x, y, modifiers, double } => {
            let mut event = PointerEvent::at(x, y).with_modifiers(modifiers);
            if double {
                event = event.double_click();
            }
            editor.pointer_down(event);
            editor.pointer_up(event);
        }
        ScriptStep::Key { key, modifiers } => editor.key_down(key, modifiers),
        ScriptStep::Text { text } => editor.text_input(&text),
        ScriptStep::Blur => editor.blur_editor(),
        ScriptStep::Add { element } => {
            editor.add_element(element)?;
        }
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
