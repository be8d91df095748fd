//! Framework-agnostic page scene
//!
//! Rendering produces a flat list of draw instructions in screen pixels,
//! relative to the page's top-left corner. The host maps them onto whatever
//! drawing surface it uses. Order matters: raster, occlusion patches,
//! elements, selection outlines, then the active gesture preview.

use pdf_canvas_core::{
    Bounds, Color, Element, ElementProperties, ElementStore, Page, Point, RasterHandle,
    SelectionManager, ShapeKind, ShapeProperties, Size, TextAlignment, TextOcclusionManager,
};
use serde::{Deserialize, Serialize};

use crate::session::{EditSession, EditTarget};

/// Arrow head length as a multiple of the stroke width
const ARROW_HEAD_FACTOR: f32 = 4.0;

/// Rectangle in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn from_document(bounds: Bounds, zoom: f32, origin: Point) -> Self {
        Self::new(
            origin.x + bounds.x * zoom,
            origin.y + bounds.y * zoom,
            bounds.width * zoom,
            bounds.height * zoom,
        )
    }
}

/// Visual primitive the host must draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawInstruction {
    /// The page's rendered raster surface
    Raster { rect: Rect, handle: RasterHandle },
    /// Opaque fill, used to mask occluded source text
    FillRect { rect: Rect, color: Color },
    Rectangle {
        rect: Rect,
        stroke: Color,
        stroke_width: f32,
        fill: Option<Color>,
        dash: Vec<f32>,
        opacity: f32,
    },
    Ellipse {
        rect: Rect,
        stroke: Color,
        stroke_width: f32,
        fill: Option<Color>,
        dash: Vec<f32>,
        opacity: f32,
    },
    Line {
        start: Point,
        end: Point,
        stroke: Color,
        stroke_width: f32,
        dash: Vec<f32>,
        opacity: f32,
    },
    Arrow {
        start: Point,
        end: Point,
        stroke: Color,
        stroke_width: f32,
        head_length: f32,
        opacity: f32,
    },
    Polyline {
        points: Vec<Point>,
        stroke: Color,
        stroke_width: f32,
        opacity: f32,
    },
    Text {
        rect: Rect,
        text: String,
        font_size: f32,
        font_family: String,
        font_weight: String,
        color: Color,
        alignment: TextAlignment,
        opacity: f32,
    },
    Image {
        rect: Rect,
        src: String,
        opacity: f32,
    },
    /// Dashed outline around a selected element
    SelectionOutline { rect: Rect },
    /// Inline text editor box with its current draft
    EditorBox {
        rect: Rect,
        text: String,
        font_size: f32,
        font_family: String,
        color: Color,
    },
}

/// Everything drawn for one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageScene {
    pub page_index: usize,
    /// Page size in screen pixels
    pub size: Size,
    pub instructions: Vec<DrawInstruction>,
}

/// State read while rendering a page
#[derive(Debug, Clone, Copy)]
pub struct SceneSource<'a> {
    pub page: &'a Page,
    pub zoom: f32,
    pub store: &'a ElementStore,
    pub selection: &'a SelectionManager,
    pub occlusion: &'a TextOcclusionManager,
    pub session: Option<&'a EditSession>,
}

/// Draw instructions for one element
///
/// `page_origin` is where the page's top-left corner sits on the host
/// surface, so several pages can share one canvas.
pub fn render_element(element: &Element, zoom: f32, page_origin: Point) -> Vec<DrawInstruction> {
    if !element.visible {
        return Vec::new();
    }
    let rect = Rect::from_document(element.bounds, zoom, page_origin);
    let opacity = element.opacity;

    match &element.properties {
        ElementProperties::Text(text) => vec![DrawInstruction::Text {
            rect,
            text: text.text.clone(),
            font_size: text.font_size * zoom,
            font_family: text.font_family.clone(),
            font_weight: text.font_weight.clone(),
            color: text.color,
            alignment: text.alignment,
            opacity,
        }],
        ElementProperties::Shape { kind, style } => {
            vec![render_shape(*kind, style, rect, zoom, opacity)]
        }
        ElementProperties::Draw(draw) => draw
            .paths
            .iter()
            .filter(|path| path.len() >= 2)
            .map(|path| DrawInstruction::Polyline {
                points: path
                    .iter()
                    .map(|point| Point::new(rect.x + point.x * zoom, rect.y + point.y * zoom))
                    .collect(),
                stroke: draw.color,
                stroke_width: draw.stroke_width * zoom,
                opacity,
            })
            .collect(),
        ElementProperties::Image(image) => vec![DrawInstruction::Image {
            rect,
            src: image.src.clone(),
            opacity,
        }],
        ElementProperties::Signature(signature) => match &signature.text {
            Some(text) if signature.data.is_empty() => vec![DrawInstruction::Text {
                rect,
                text: text.clone(),
                font_size: rect.height * 0.6,
                font_family: "cursive".to_string(),
                font_weight: "normal".to_string(),
                color: signature.color,
                alignment: TextAlignment::Left,
                opacity,
            }],
            _ => vec![DrawInstruction::Image {
                rect,
                src: signature.data.clone(),
                opacity,
            }],
        },
    }
}

fn render_shape(
    kind: ShapeKind,
    style: &ShapeProperties,
    rect: Rect,
    zoom: f32,
    opacity: f32,
) -> DrawInstruction {
    let stroke_width = style.stroke_width * zoom;
    let (start, end) = line_endpoints(style, rect);
    match kind {
        ShapeKind::Rectangle => DrawInstruction::Rectangle {
            rect,
            stroke: style.stroke_color,
            stroke_width,
            fill: style.fill_color,
            dash: style.dash_pattern.clone(),
            opacity,
        },
        ShapeKind::Circle => DrawInstruction::Ellipse {
            rect,
            stroke: style.stroke_color,
            stroke_width,
            fill: style.fill_color,
            dash: style.dash_pattern.clone(),
            opacity,
        },
        ShapeKind::Line => DrawInstruction::Line {
            start,
            end,
            stroke: style.stroke_color,
            stroke_width,
            dash: style.dash_pattern.clone(),
            opacity,
        },
        ShapeKind::Arrow => DrawInstruction::Arrow {
            start,
            end,
            stroke: style.stroke_color,
            stroke_width,
            head_length: stroke_width * ARROW_HEAD_FACTOR,
            opacity,
        },
    }
}

/// Line endpoints across the box, following the drag direction
fn line_endpoints(style: &ShapeProperties, rect: Rect) -> (Point, Point) {
    let (left, right) = (rect.x, rect.x + rect.width);
    let (top, bottom) = (rect.y, rect.y + rect.height);
    let (x0, x1) = if style.flip_x { (right, left) } else { (left, right) };
    let (y0, y1) = if style.flip_y { (bottom, top) } else { (top, bottom) };
    (Point::new(x0, y0), Point::new(x1, y1))
}

/// Full scene of one page
pub fn render_page(source: SceneSource<'_>) -> PageScene {
    let SceneSource {
        page,
        zoom,
        store,
        selection,
        occlusion,
        session,
    } = source;
    let origin = Point::default();
    let size = Size::new(page.viewport.width * zoom, page.viewport.height * zoom);
    let mut instructions = Vec::new();

    if let Some(handle) = &page.raster {
        instructions.push(DrawInstruction::Raster {
            rect: Rect::new(0.0, 0.0, size.width, size.height),
            handle: handle.clone(),
        });
    }

    for patch in occlusion.patches(page.index, &page.text_runs, page.viewport.height) {
        instructions.push(DrawInstruction::FillRect {
            rect: Rect::from_document(patch, zoom, origin),
            color: Color::WHITE,
        });
    }

    let editing = session
        .and_then(EditSession::text_editor)
        .and_then(|editor| match editor.target {
            EditTarget::Element(id) => Some(id),
            _ => None,
        });

    let elements = store.list_for_page(page.index);
    for element in &elements {
        if Some(element.id) == editing {
            continue;
        }
        instructions.extend(render_element(element, zoom, origin));
    }

    for element in elements
        .iter()
        .filter(|e| e.visible && selection.contains(e.id))
    {
        instructions.push(DrawInstruction::SelectionOutline {
            rect: Rect::from_document(element.bounds, zoom, origin),
        });
    }

    if let Some(session) = session.filter(|s| s.page_index() == page.index) {
        instructions.extend(render_session(session, zoom, origin));
    }

    PageScene {
        page_index: page.index,
        size,
        instructions,
    }
}

fn render_session(session: &EditSession, zoom: f32, origin: Point) -> Vec<DrawInstruction> {
    match session {
        EditSession::CreatingShape { .. } => session
            .shape_preview()
            .map(|(kind, bounds)| {
                let mut style = ShapeProperties::new(1.0, Color::SELECTION);
                style.dash_pattern = vec![4.0, 4.0];
                if let EditSession::CreatingShape { start, current, .. } = session {
                    style.flip_x = current.x < start.x;
                    style.flip_y = current.y < start.y;
                }
                render_shape(kind, &style, Rect::from_document(bounds, zoom, origin), zoom, 1.0)
            })
            .into_iter()
            .collect(),
        EditSession::DrawingPath { points, .. } if points.len() >= 2 => {
            vec![DrawInstruction::Polyline {
                points: points
                    .iter()
                    .map(|p| Point::new(origin.x + p.x * zoom, origin.y + p.y * zoom))
                    .collect(),
                stroke: Color::SELECTION,
                stroke_width: zoom,
                opacity: 1.0,
            }]
        }
        EditSession::DrawingPath { .. } => Vec::new(),
        EditSession::EditingText(editor) => vec![DrawInstruction::EditorBox {
            rect: Rect::from_document(editor.committed_bounds(), zoom, origin),
            text: editor.draft().to_string(),
            font_size: editor.properties.font_size * zoom,
            font_family: editor.properties.font_family.clone(),
            color: editor.properties.color,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_canvas_core::{
        Bounds, Document, DocumentHandle, DrawProperties, ElementPatch, NewElement,
        OcclusionHolder, PageInput, RunKey, TextProperties, TextRun,
    };

    fn element(bounds: Bounds, properties: ElementProperties) -> Element {
        Element::from_new(NewElement::new(0, bounds, properties))
    }

    #[test]
    fn test_render_element_scales_and_offsets() {
        let text = element(
            Bounds::new(10.0, 20.0, 100.0, 16.0),
            ElementProperties::Text(TextProperties::new("Hi", 12.0, "Arial")),
        );
        let instructions = render_element(&text, 2.0, Point::new(5.0, 1000.0));
        match &instructions[..] {
            [DrawInstruction::Text { rect, font_size, .. }] => {
                assert_eq!(*rect, Rect::new(25.0, 1040.0, 200.0, 32.0));
                assert_eq!(*font_size, 24.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_line_follows_flip_flags() {
        let mut style = ShapeProperties::new(2.0, Color::RED);
        style.flip_x = true;
        let line = element(
            Bounds::new(0.0, 0.0, 40.0, 30.0),
            ElementProperties::Shape {
                kind: ShapeKind::Line,
                style,
            },
        );
        match &render_element(&line, 1.0, Point::default())[..] {
            [DrawInstruction::Line { start, end, .. }] => {
                assert_eq!(*start, Point::new(40.0, 0.0));
                assert_eq!(*end, Point::new(0.0, 30.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_draw_paths_follow_bounds() {
        let draw = element(
            Bounds::new(100.0, 100.0, 20.0, 20.0),
            ElementProperties::Draw(DrawProperties {
                paths: vec![vec![Point::new(0.0, 0.0), Point::new(10.0, 5.0)]],
                stroke_width: 2.0,
                color: Color::BLUE,
            }),
        );
        match &render_element(&draw, 1.0, Point::default())[..] {
            [DrawInstruction::Polyline { points, .. }] => {
                assert_eq!(points, &vec![Point::new(100.0, 100.0), Point::new(110.0, 105.0)]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_invisible_element_not_rendered() {
        let mut hidden = element(
            Bounds::new(0.0, 0.0, 1.0, 1.0),
            ElementProperties::Text(TextProperties::new("x", 12.0, "Arial")),
        );
        hidden.visible = false;
        assert!(render_element(&hidden, 1.0, Point::default()).is_empty());
    }

    #[test]
    fn test_page_scene_order() {
        let document = Document::from_pages(
            DocumentHandle::first(),
            vec![PageInput {
                viewport: Size::new(600.0, 792.0),
                raster: RasterHandle::new("page-0"),
                text_runs: vec![TextRun::new(
                    "Total",
                    [12.0, 0.0, 0.0, 12.0, 100.0, 680.0],
                    40.0,
                    12.0,
                )],
            }],
            20.0,
        );
        let mut store = ElementStore::new();
        let id = store.add(NewElement::new(
            0,
            Bounds::new(100.0, 100.0, 72.0, 12.0),
            ElementProperties::Text(TextProperties::new("Total due", 12.0, "Arial")),
        ));
        let mut selection = SelectionManager::new();
        selection.select(&[id]);
        let mut occlusion = TextOcclusionManager::new();
        occlusion.hide(RunKey::new(0, 0), OcclusionHolder::Replaced(id));

        let page = document.page(0).unwrap();
        let scene = render_page(SceneSource {
            page,
            zoom: 1.0,
            store: &store,
            selection: &selection,
            occlusion: &occlusion,
            session: None,
        });

        assert_eq!(scene.size, Size::new(600.0, 792.0));
        assert!(matches!(scene.instructions[0], DrawInstruction::Raster { .. }));
        assert_eq!(
            scene.instructions[1],
            DrawInstruction::FillRect {
                rect: Rect::new(100.0, 100.0, 40.0, 12.0),
                color: Color::WHITE,
            }
        );
        assert!(matches!(scene.instructions[2], DrawInstruction::Text { .. }));
        assert!(matches!(
            scene.instructions[3],
            DrawInstruction::SelectionOutline { .. }
        ));
        assert_eq!(scene.instructions.len(), 4);
    }

    #[test]
    fn test_hidden_selected_element_has_no_outline() {
        let document = Document::from_pages(
            DocumentHandle::first(),
            vec![PageInput {
                viewport: Size::new(600.0, 792.0),
                raster: RasterHandle::new("page-0"),
                text_runs: Vec::new(),
            }],
            20.0,
        );
        let mut store = ElementStore::new();
        let shown = store.add(NewElement::new(
            0,
            Bounds::new(10.0, 10.0, 50.0, 20.0),
            ElementProperties::Text(TextProperties::new("Shown", 12.0, "Arial")),
        ));
        let hidden = store.add(NewElement::new(
            0,
            Bounds::new(10.0, 60.0, 50.0, 20.0),
            ElementProperties::Text(TextProperties::new("Hidden", 12.0, "Arial")),
        ));
        store.update(
            hidden,
            &ElementPatch {
                visible: Some(false),
                ..Default::default()
            },
        );
        let mut selection = SelectionManager::new();
        selection.select(&[shown, hidden]);

        let scene = render_page(SceneSource {
            page: document.page(0).unwrap(),
            zoom: 1.0,
            store: &store,
            selection: &selection,
            occlusion: &TextOcclusionManager::new(),
            session: None,
        });

        let outlines: Vec<_> = scene
            .instructions
            .iter()
            .filter_map(|op| match op {
                DrawInstruction::SelectionOutline { rect } => Some(*rect),
                _ => None,
            })
            .collect();
        assert_eq!(outlines, vec![Rect::new(10.0, 10.0, 50.0, 20.0)]);
    }
}
