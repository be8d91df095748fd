//! Tool state machine
//!
//! Decides what a pointer or key event means for the active tool. The machine
//! never touches the element store, selection or occlusion state: it reads
//! a [`PointerContext`] prepared by the controller and answers with
//! [`Command`]s for the controller to apply.

use pdf_canvas_core::{
    Bounds, DrawProperties, ElementId, ElementPatch, ElementProperties, EngineConfig, NewElement,
    Point, RunKey, ShapeKind, ShapeProperties, SignatureProperties, Size, TextProperties,
};
use tracing::{debug, warn};

use crate::input::{Key, Modifiers};
use crate::session::{EditSession, EditTarget, TextEditor, TAB_INSERT};
use crate::tool::{SignaturePayload, Tool, ToolStyle};

/// Existing text the editor can open on
#[derive(Debug, Clone, PartialEq)]
pub struct TextSource {
    pub bounds: Bounds,
    pub properties: TextProperties,
}

/// What the pointer landed on, with what the machine needs to act on it
#[derive(Debug, Clone, PartialEq)]
pub enum HitTarget {
    None,
    Element {
        id: ElementId,
        selected: bool,
        /// Present for text elements
        text: Option<TextSource>,
    },
    TextRun {
        key: RunKey,
        source: TextSource,
    },
}

/// Pointer position on an interactive page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePoint {
    pub page_index: usize,
    /// Page-local document point
    pub point: Point,
    /// Page top edge in stack space
    pub page_offset: f32,
    /// Page viewport in document units
    pub page_size: Size,
}

/// Everything the machine may look at for one pointer event
#[derive(Debug, Clone, PartialEq)]
pub struct PointerContext {
    /// Page-independent document point
    pub stack: Point,
    /// `None` over a gap or a page that is not ready
    pub page: Option<PagePoint>,
    pub target: HitTarget,
    pub modifiers: Modifiers,
    pub click_count: u8,
    pub selection: Vec<ElementId>,
}

/// State change requested by the machine
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Select(Vec<ElementId>),
    ToggleSelect(ElementId),
    ClearSelection,
    /// Start moving these elements
    BeginDrag(Vec<ElementId>),
    /// Total pointer delta since the drag began, in document units
    DragTo(Point),
    EndDrag,
    AddElement(NewElement),
    /// Add a text element standing in for an edited source run
    ReplaceRun {
        key: RunKey,
        element: NewElement,
    },
    UpdateElement {
        id: ElementId,
        patch: ElementPatch,
    },
    HideRun(RunKey),
    RevealRun(RunKey),
    DeleteSelection,
    DuplicateSelection,
    CopySelection,
    Paste,
    SelectAllOnPage,
}

/// Pure mapping from input events to commands
#[derive(Debug, Clone)]
pub struct ToolStateMachine {
    tool: Tool,
    style: ToolStyle,
    config: EngineConfig,
    signature: Option<SignaturePayload>,
    session: Option<EditSession>,
    /// Stack-space point where the current drag began
    drag_origin: Option<Point>,
}

impl ToolStateMachine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            tool: Tool::Select,
            style: ToolStyle::from_config(&config),
            config,
            signature: None,
            session: None,
            drag_origin: None,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn style(&self) -> &ToolStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: ToolStyle) {
        self.style = style;
    }

    pub fn set_signature_payload(&mut self, payload: Option<SignaturePayload>) {
        self.signature = payload;
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    /// Switch tools; an open session is resolved and the selection cleared
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Command> {
        let mut commands = self.resolve_session();
        if self.drag_origin.take().is_some() {
            commands.push(Command::EndDrag);
        }
        commands.push(Command::ClearSelection);
        self.tool = tool;
        commands
    }

    /// Drop all transient state without committing (document replaced)
    pub fn reset(&mut self) {
        self.session = None;
        self.drag_origin = None;
    }

    pub fn pointer_down(&mut self, ctx: &PointerContext) -> Vec<Command> {
        if let (Some(EditSession::EditingText(editor)), Some(page)) = (&self.session, &ctx.page) {
            if editor.page_index == page.page_index && editor.bounds.contains_point(&page.point) {
                return Vec::new();
            }
        }

        let mut commands = self.resolve_session();
        if self.drag_origin.take().is_some() {
            commands.push(Command::EndDrag);
        }

        let Some(page) = ctx.page else {
            debug!(x = ctx.stack.x, y = ctx.stack.y, "pointer down outside an available page");
            return commands;
        };

        match self.tool {
            Tool::Select => self.select_down(ctx, page, &mut commands),
            Tool::Text => self.text_down(ctx, page, &mut commands),
            Tool::Shape(kind) => {
                self.session = Some(EditSession::CreatingShape {
                    kind,
                    page_index: page.page_index,
                    page_offset: page.page_offset,
                    page_size: page.page_size,
                    start: page.point,
                    current: page.point,
                });
            }
            Tool::Draw => {
                self.session = Some(EditSession::DrawingPath {
                    page_index: page.page_index,
                    page_offset: page.page_offset,
                    page_size: page.page_size,
                    points: vec![page.point],
                });
            }
            Tool::Signature => self.place_signature(page, &mut commands),
        }
        commands
    }

    pub fn pointer_move(&mut self, ctx: &PointerContext) -> Vec<Command> {
        if let Some(origin) = self.drag_origin {
            return vec![Command::DragTo(ctx.stack.delta_from(&origin))];
        }

        match &mut self.session {
            Some(EditSession::CreatingShape {
                page_offset,
                page_size,
                current,
                ..
            }) => {
                *current = page_local(ctx.stack, *page_offset, *page_size);
            }
            Some(EditSession::DrawingPath {
                page_offset,
                page_size,
                points,
                ..
            }) => {
                points.push(page_local(ctx.stack, *page_offset, *page_size));
            }
            _ => {}
        }
        Vec::new()
    }

    pub fn pointer_up(&mut self, ctx: &PointerContext) -> Vec<Command> {
        if self.drag_origin.take().is_some() {
            return vec![Command::EndDrag];
        }

        match self.session.take() {
            Some(EditSession::CreatingShape {
                kind,
                page_index,
                page_offset,
                page_size,
                start,
                ..
            }) => {
                let current = page_local(ctx.stack, page_offset, page_size);
                self.commit_shape(kind, page_index, start, current)
                    .into_iter()
                    .collect()
            }
            Some(EditSession::DrawingPath {
                page_index,
                page_offset,
                page_size,
                mut points,
            }) => {
                let last = page_local(ctx.stack, page_offset, page_size);
                if points.last() != Some(&last) {
                    points.push(last);
                }
                self.commit_path(page_index, page_size, points)
                    .into_iter()
                    .collect()
            }
            other => {
                self.session = other;
                Vec::new()
            }
        }
    }

    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Command> {
        if let Some(EditSession::EditingText(editor)) = &mut self.session {
            match key {
                Key::Escape => {}
                Key::Enter if !modifiers.shift => {}
                Key::Enter => editor.insert("\n"),
                Key::Backspace => editor.backspace(),
                Key::Tab => editor.insert(TAB_INSERT),
                Key::Delete | Key::Char(_) => {}
            }
            return match key {
                Key::Escape => self.cancel_session(),
                Key::Enter if !modifiers.shift => self.resolve_session(),
                _ => Vec::new(),
            };
        }

        match key {
            Key::Escape => {
                if self.session.is_some() {
                    return self.cancel_session();
                }
                vec![Command::ClearSelection]
            }
            Key::Delete | Key::Backspace => vec![Command::DeleteSelection],
            Key::Char(c) if modifiers.command() => match c.to_ascii_lowercase() {
                'd' => vec![Command::DuplicateSelection],
                'c' => vec![Command::CopySelection],
                'v' => vec![Command::Paste],
                'a' => vec![Command::SelectAllOnPage],
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// Printable text typed into the open editor
    pub fn text_input(&mut self, text: &str) -> Vec<Command> {
        if let Some(EditSession::EditingText(editor)) = &mut self.session {
            editor.insert(text);
        }
        Vec::new()
    }

    /// The editor lost focus: commit if valid
    pub fn blur(&mut self) -> Vec<Command> {
        match self.session {
            Some(EditSession::EditingText(_)) => self.resolve_session(),
            _ => Vec::new(),
        }
    }

    fn select_down(&mut self, ctx: &PointerContext, page: PagePoint, commands: &mut Vec<Command>) {
        match &ctx.target {
            HitTarget::Element {
                id,
                text: Some(source),
                ..
            } if ctx.click_count >= 2 => {
                self.open_editor(page.page_index, EditTarget::Element(*id), source, commands);
            }
            HitTarget::Element { id, .. }
                if ctx.modifiers.command() || ctx.modifiers.shift =>
            {
                commands.push(Command::ToggleSelect(*id));
            }
            HitTarget::Element { id, selected, .. } => {
                let ids = if *selected {
                    ctx.selection.clone()
                } else {
                    commands.push(Command::Select(vec![*id]));
                    vec![*id]
                };
                commands.push(Command::BeginDrag(ids));
                self.drag_origin = Some(ctx.stack);
            }
            HitTarget::TextRun { key, source } => {
                self.open_editor(page.page_index, EditTarget::SourceRun(*key), source, commands);
            }
            HitTarget::None => commands.push(Command::ClearSelection),
        }
    }

    fn text_down(&mut self, ctx: &PointerContext, page: PagePoint, commands: &mut Vec<Command>) {
        match &ctx.target {
            HitTarget::Element {
                id,
                text: Some(source),
                ..
            } => self.open_editor(page.page_index, EditTarget::Element(*id), source, commands),
            HitTarget::TextRun { key, source } => {
                self.open_editor(page.page_index, EditTarget::SourceRun(*key), source, commands)
            }
            _ => {
                let font_size = self.style.font_size;
                let bounds = Bounds::new(
                    page.point.x,
                    page.point.y,
                    self.config.default_text_width,
                    font_size * self.config.text_line_height_factor,
                )
                .fit_within(page.page_size);
                let mut properties =
                    TextProperties::new("", font_size, self.style.font_family.clone());
                properties.color = self.style.text_color;
                let source = TextSource { bounds, properties };
                self.open_editor(page.page_index, EditTarget::New, &source, commands);
            }
        }
    }

    fn open_editor(
        &mut self,
        page_index: usize,
        target: EditTarget,
        source: &TextSource,
        commands: &mut Vec<Command>,
    ) {
        if let EditTarget::SourceRun(key) = target {
            commands.push(Command::HideRun(key));
        }
        debug!(page = page_index, ?target, "text editor opened");
        self.session = Some(EditSession::EditingText(TextEditor {
            page_index,
            bounds: source.bounds,
            target,
            original: source.properties.text.clone(),
            properties: source.properties.clone(),
            line_height_factor: self.config.text_line_height_factor,
        }));
    }

    fn place_signature(&mut self, page: PagePoint, commands: &mut Vec<Command>) {
        let Some(payload) = &self.signature else {
            warn!(page = page.page_index, "signature tool used without a signature");
            return;
        };
        let bounds = Bounds::new(
            page.point.x,
            page.point.y,
            payload.size.width,
            payload.size.height,
        )
        .fit_within(page.page_size);
        let properties = ElementProperties::Signature(SignatureProperties {
            signature_type: payload.signature_type,
            data: payload.data.clone(),
            text: payload.text.clone(),
            stroke_width: self.style.stroke_width,
            color: self.style.stroke_color,
        });
        commands.push(Command::AddElement(NewElement::new(
            page.page_index,
            bounds,
            properties,
        )));
    }

    fn commit_shape(
        &self,
        kind: ShapeKind,
        page_index: usize,
        start: Point,
        current: Point,
    ) -> Option<Command> {
        let bounds = Bounds::from_corners(start, current);
        let min = self.config.min_shape_size;
        if bounds.width < min || bounds.height < min {
            debug!(
                ?kind,
                width = bounds.width,
                height = bounds.height,
                "shape below minimum size discarded"
            );
            return None;
        }

        let mut style = ShapeProperties::new(self.style.stroke_width, self.style.stroke_color);
        style.fill_color = self.style.fill_color;
        if matches!(kind, ShapeKind::Line | ShapeKind::Arrow) {
            style.flip_x = current.x < start.x;
            style.flip_y = current.y < start.y;
        }
        Some(Command::AddElement(NewElement::new(
            page_index,
            bounds,
            ElementProperties::Shape { kind, style },
        )))
    }

    fn commit_path(
        &self,
        page_index: usize,
        page_size: Size,
        points: Vec<Point>,
    ) -> Option<Command> {
        if points.len() < 2 {
            debug!(points = points.len(), "path too short, discarded");
            return None;
        }
        let stroke_width = self.style.stroke_width;
        let bounds = Bounds::from_points(&points)?
            .expanded(stroke_width)
            .clipped_to(page_size);
        let origin = bounds.origin();
        let path = points
            .iter()
            .map(|point| point.delta_from(&origin))
            .collect();
        Some(Command::AddElement(NewElement::new(
            page_index,
            bounds,
            ElementProperties::Draw(DrawProperties {
                paths: vec![path],
                stroke_width,
                color: self.style.stroke_color,
            }),
        )))
    }

    /// Commit the open session if it is valid, otherwise discard it
    fn resolve_session(&mut self) -> Vec<Command> {
        match self.session.take() {
            None => Vec::new(),
            Some(EditSession::CreatingShape {
                kind,
                page_index,
                start,
                current,
                ..
            }) => self
                .commit_shape(kind, page_index, start, current)
                .into_iter()
                .collect(),
            Some(EditSession::DrawingPath {
                page_index,
                page_size,
                points,
                ..
            }) => self
                .commit_path(page_index, page_size, points)
                .into_iter()
                .collect(),
            Some(EditSession::EditingText(editor)) => self.commit_text(editor),
        }
    }

    fn cancel_session(&mut self) -> Vec<Command> {
        match self.session.take() {
            Some(EditSession::EditingText(TextEditor {
                target: EditTarget::SourceRun(key),
                ..
            })) => vec![Command::RevealRun(key)],
            Some(session) => {
                debug!(page = session.page_index(), "session cancelled");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn commit_text(&mut self, editor: TextEditor) -> Vec<Command> {
        if editor.is_blank() {
            debug!(page = editor.page_index, target = ?editor.target, "blank text discarded");
            return match editor.target {
                EditTarget::SourceRun(key) => vec![Command::RevealRun(key)],
                _ => Vec::new(),
            };
        }

        let bounds = editor.committed_bounds();
        match editor.target {
            EditTarget::New => {
                self.tool = Tool::Select;
                vec![Command::AddElement(NewElement::new(
                    editor.page_index,
                    bounds,
                    ElementProperties::Text(editor.properties),
                ))]
            }
            EditTarget::SourceRun(key) if !editor.is_modified() => {
                debug!(?key, "source run unchanged");
                vec![Command::RevealRun(key)]
            }
            EditTarget::SourceRun(key) => vec![Command::ReplaceRun {
                key,
                element: NewElement::new(
                    editor.page_index,
                    bounds,
                    ElementProperties::Text(editor.properties),
                ),
            }],
            EditTarget::Element(_) if !editor.is_modified() => Vec::new(),
            EditTarget::Element(id) => vec![Command::UpdateElement {
                id,
                patch: ElementPatch {
                    bounds: Some(bounds),
                    properties: Some(ElementProperties::Text(editor.properties)),
                    ..Default::default()
                },
            }],
        }
    }
}

/// Page-local point for a stack position, held inside the page rectangle
fn page_local(stack: Point, page_offset: f32, page_size: Size) -> Point {
    Point::new(stack.x, stack.y - page_offset).clamped_to(page_size)
}
