//! Interaction controller
//!
//! Owns the document, the element store, the selection and the occlusion
//! state, and is the only code that mutates them. Host events are mapped to
//! document space, hit-tested and fed to the [`ToolStateMachine`]; the
//! commands it returns are applied here.

use pdf_canvas_core::{
    screen_to_document, screen_to_stack, Bounds, Color, Document, DocumentExport, DocumentHandle,
    Element, ElementId, ElementPatch, ElementStore, EngineConfig, EngineError, Hit, HitTester,
    NewElement, OcclusionHolder, PageInput, PageText, Point, Result, RunKey, SelectionManager,
    Size, StoreChange, SubscriptionId, TextOcclusionManager, TextProperties, ViewTransform,
};
use tracing::{debug, info, warn};

use crate::input::{Key, Modifiers, PointerEvent};
use crate::scene::{self, PageScene};
use crate::state_machine::{
    Command, HitTarget, PagePoint, PointerContext, TextSource, ToolStateMachine,
};
use crate::tool::{SignaturePayload, Tool, ToolStyle};

/// Elements being moved and the vertical room each has on its page
#[derive(Debug, Clone)]
struct DragState {
    ids: Vec<ElementId>,
    /// Allowed shared vertical delta, `lo <= dy <= hi`
    lo: f32,
    hi: f32,
    /// Delta already applied to the store
    applied: Point,
}

impl DragState {
    fn clamp(&self, delta: Point) -> Point {
        Point::new(delta.x, delta.y.clamp(self.lo, self.hi))
    }
}

pub struct InteractionController {
    config: EngineConfig,
    document: Option<Document>,
    view: ViewTransform,
    store: ElementStore,
    selection: SelectionManager,
    occlusion: TextOcclusionManager,
    machine: ToolStateMachine,
    drag: Option<DragState>,
    clipboard: Vec<NewElement>,
}

impl InteractionController {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            machine: ToolStateMachine::new(config.clone()),
            config,
            document: None,
            view: ViewTransform::default(),
            store: ElementStore::new(),
            selection: SelectionManager::new(),
            occlusion: TextOcclusionManager::new(),
            drag: None,
            clipboard: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn occlusion(&self) -> &TextOcclusionManager {
        &self.occlusion
    }

    pub fn machine(&self) -> &ToolStateMachine {
        &self.machine
    }

    pub fn tool(&self) -> Tool {
        self.machine.tool()
    }

    pub fn subscribe_elements(
        &mut self,
        listener: impl FnMut(&StoreChange, &[Element]) + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    pub fn subscribe_selection(
        &mut self,
        listener: impl FnMut(&[ElementId]) + 'static,
    ) -> SubscriptionId {
        self.selection.subscribe(listener)
    }

    pub fn subscribe_occlusion(
        &mut self,
        listener: impl FnMut(&[RunKey]) + 'static,
    ) -> SubscriptionId {
        self.occlusion.subscribe(listener)
    }

    /// Replace the loaded document and drop all state tied to the old one
    pub fn set_document(&mut self, document: Document) {
        info!(
            handle = %document.handle(),
            pages = document.page_count(),
            "document loaded"
        );
        self.machine.reset();
        self.drag = None;
        self.clipboard.clear();
        self.selection.clear();
        self.occlusion.clear();
        self.store.clear();
        self.document = Some(document);
    }

    pub fn page_ready(
        &mut self,
        handle: DocumentHandle,
        index: usize,
        input: PageInput,
    ) -> Result<()> {
        self.current_document_mut(handle)?.mark_ready(index, input)
    }

    pub fn page_failed(
        &mut self,
        handle: DocumentHandle,
        index: usize,
        reason: impl Into<String>,
    ) -> Result<()> {
        self.current_document_mut(handle)?.mark_failed(index, reason)
    }

    fn current_document_mut(&mut self, handle: DocumentHandle) -> Result<&mut Document> {
        match self.document.as_mut() {
            Some(document) if document.handle() == handle => Ok(document),
            _ => {
                debug!(%handle, "page completion for a replaced document dropped");
                Err(EngineError::StaleDocument)
            }
        }
    }

    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        self.view.zoom = self.config.clamp_zoom(zoom);
        self.view.zoom
    }

    pub fn set_scroll(&mut self, scroll: Point) {
        self.view.scroll = scroll;
    }

    pub fn set_container_origin(&mut self, origin: Point) {
        self.view.origin = origin;
    }

    /// Recompute the current page from scroll and zoom; `true` if it changed
    pub fn refresh_visible_page(&mut self) -> bool {
        let zoom = self.view.zoom;
        let scroll_top = self.view.scroll.y;
        match self.document.as_mut() {
            Some(document) => {
                let page = document.layout().visible_page_for_scroll(scroll_top, zoom);
                document.set_current_visible_page(page)
            }
            None => false,
        }
    }

    pub fn current_visible_page(&self) -> usize {
        self.document
            .as_ref()
            .map(Document::current_visible_page)
            .unwrap_or(0)
    }

    /// Scrollable canvas size in screen pixels
    pub fn canvas_size(&self) -> Size {
        self.document
            .as_ref()
            .map(|document| document.layout().canvas_size(self.view.zoom))
            .unwrap_or_default()
    }

    pub fn set_tool(&mut self, tool: Tool) {
        debug!(?tool, "tool changed");
        let commands = self.machine.set_tool(tool);
        self.apply(commands);
    }

    pub fn set_style(&mut self, style: ToolStyle) {
        self.machine.set_style(style);
    }

    pub fn set_signature_payload(&mut self, payload: Option<SignaturePayload>) {
        self.machine.set_signature_payload(payload);
    }

    pub fn add_element(&mut self, element: NewElement) -> Result<ElementId> {
        let count = self.page_count();
        if element.page_index >= count {
            return Err(EngineError::PageOutOfRange {
                page: element.page_index,
                count,
            });
        }
        Ok(self.store.add(element))
    }

    /// Absent ids are ignored
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        if !self.store.contains(id) {
            debug!(error = %EngineError::InvalidElementReference(id), "update ignored");
            return false;
        }
        self.store.update(id, patch)
    }

    /// Remove elements, pruning the selection and revealing runs they replaced
    pub fn delete_elements(&mut self, ids: &[ElementId]) -> usize {
        let removed: Vec<ElementId> = self.store.remove(ids).iter().map(|e| e.id).collect();
        for id in &removed {
            self.occlusion.release_element(*id);
        }
        self.selection.prune(&removed);
        if let Some(drag) = &mut self.drag {
            drag.ids.retain(|id| !removed.contains(id));
        }
        removed.len()
    }

    pub fn duplicate_elements(&mut self, ids: &[ElementId]) -> Vec<ElementId> {
        let offset = self.config.duplicate_offset;
        let document = self.document.as_ref();
        self.store.duplicate(ids, |element| {
            keep_on_page(
                document,
                element.page_index,
                element.bounds.translated(offset, offset),
            )
        })
    }

    /// Replace the selection; ids without an element are dropped
    pub fn select_elements(&mut self, ids: &[ElementId]) {
        let existing: Vec<ElementId> = ids
            .iter()
            .copied()
            .filter(|id| self.store.contains(*id))
            .collect();
        self.selection.select(&existing);
    }

    pub fn toggle_select(&mut self, id: ElementId) {
        if self.store.contains(id) {
            self.selection.toggle(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn pointer_down(&mut self, event: PointerEvent) {
        let ctx = self.pointer_context(&event, true);
        let commands = self.machine.pointer_down(&ctx);
        self.apply(commands);
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        let ctx = self.pointer_context(&event, false);
        let commands = self.machine.pointer_move(&ctx);
        self.apply(commands);
    }

    pub fn pointer_up(&mut self, event: PointerEvent) {
        let ctx = self.pointer_context(&event, false);
        let commands = self.machine.pointer_up(&ctx);
        self.apply(commands);
    }

    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) {
        let commands = self.machine.key_down(key, modifiers);
        self.apply(commands);
    }

    pub fn text_input(&mut self, text: &str) {
        let commands = self.machine.text_input(text);
        self.apply(commands);
    }

    pub fn blur_editor(&mut self) {
        let commands = self.machine.blur();
        self.apply(commands);
    }

    pub fn export(&self) -> DocumentExport {
        DocumentExport::from_elements(self.page_count(), self.store.all())
    }

    pub fn render_page(&self, page_index: usize) -> Result<PageScene> {
        let count = self.page_count();
        let page = self
            .document
            .as_ref()
            .and_then(|document| document.page(page_index))
            .ok_or(EngineError::PageOutOfRange {
                page: page_index,
                count,
            })?;
        Ok(scene::render_page(scene::SceneSource {
            page,
            zoom: self.view.zoom,
            store: &self.store,
            selection: &self.selection,
            occlusion: &self.occlusion,
            session: self.machine.session(),
        }))
    }

    fn page_count(&self) -> usize {
        self.document.as_ref().map(Document::page_count).unwrap_or(0)
    }

    fn pointer_context(&self, event: &PointerEvent, hit_test: bool) -> PointerContext {
        let stack = screen_to_stack(event.position, &self.view);
        let page = self.document.as_ref().and_then(|document| {
            let position = screen_to_document(event.position, &self.view, document.layout());
            let page_index = position.page_index?;
            if !document.is_page_available(page_index) {
                return None;
            }
            Some(PagePoint {
                page_index,
                point: position.point,
                page_offset: document.layout().page_offset(page_index)?,
                page_size: document.page(page_index)?.viewport,
            })
        });

        let target = match page {
            Some(page) if hit_test => self.hit_target(page),
            _ => HitTarget::None,
        };

        PointerContext {
            stack,
            page,
            target,
            modifiers: event.modifiers,
            click_count: event.click_count,
            selection: self.selection.ids().to_vec(),
        }
    }

    fn hit_target(&self, at: PagePoint) -> HitTarget {
        let Some(page) = self
            .document
            .as_ref()
            .and_then(|document| document.page(at.page_index))
        else {
            return HitTarget::None;
        };
        let text = self.machine.tool().picks_source_text().then_some(PageText {
            runs: &page.text_runs,
            viewport_height: page.viewport.height,
        });

        match HitTester::new(&self.store, &self.occlusion).hit_test(at.page_index, at.point, text) {
            Hit::Element(id) => {
                let text = self.store.get(id).and_then(|element| {
                    element.properties.as_text().map(|properties| TextSource {
                        bounds: element.bounds,
                        properties: properties.clone(),
                    })
                });
                HitTarget::Element {
                    id,
                    selected: self.selection.contains(id),
                    text,
                }
            }
            Hit::TextRun {
                page_index,
                run_index,
            } => match page.text_runs.get(run_index) {
                Some(run) => {
                    let mut properties =
                        TextProperties::new(run.text.clone(), run.font_size(), run.font_family());
                    properties.color = Color::BLACK;
                    HitTarget::TextRun {
                        key: RunKey::new(page_index, run_index),
                        source: TextSource {
                            bounds: run.document_box(page.viewport.height),
                            properties,
                        },
                    }
                }
                None => HitTarget::None,
            },
            Hit::None => HitTarget::None,
        }
    }

    fn apply(&mut self, commands: Vec<Command>) {
        for command in commands {
            self.apply_one(command);
        }
    }

    fn apply_one(&mut self, command: Command) {
        match command {
            Command::Select(ids) => self.select_elements(&ids),
            Command::ToggleSelect(id) => self.toggle_select(id),
            Command::ClearSelection => self.selection.clear(),
            Command::BeginDrag(ids) => self.begin_drag(&ids),
            Command::DragTo(delta) => self.drag_to(delta),
            Command::EndDrag => self.drag = None,
            Command::AddElement(element) => {
                if let Err(err) = self.add_element(element) {
                    warn!(error = %err, "element not added");
                }
            }
            Command::ReplaceRun { key, element } => match self.add_element(element) {
                Ok(id) => self.occlusion.hide(key, OcclusionHolder::Replaced(id)),
                Err(err) => {
                    warn!(error = %err, ?key, "replacement text not added");
                    self.occlusion.reveal(key);
                }
            },
            Command::UpdateElement { id, patch } => {
                self.update_element(id, &patch);
            }
            Command::HideRun(key) => self.occlusion.hide(key, OcclusionHolder::Editing),
            Command::RevealRun(key) => {
                if self.occlusion.holder(key) == Some(OcclusionHolder::Editing) {
                    self.occlusion.reveal(key);
                }
            }
            Command::DeleteSelection => {
                let ids = self.selection.ids().to_vec();
                let removed = self.delete_elements(&ids);
                debug!(removed, "selection deleted");
            }
            Command::DuplicateSelection => {
                let ids = self.selection.ids().to_vec();
                let copies = self.duplicate_elements(&ids);
                if !copies.is_empty() {
                    self.selection.select(&copies);
                }
            }
            Command::CopySelection => {
                self.clipboard = self
                    .store
                    .all()
                    .iter()
                    .filter(|element| self.selection.contains(element.id))
                    .map(Element::to_new)
                    .collect();
                debug!(count = self.clipboard.len(), "selection copied");
            }
            Command::Paste => self.paste(),
            Command::SelectAllOnPage => {
                let page = self.current_visible_page();
                let ids: Vec<ElementId> = self
                    .store
                    .list_for_page(page)
                    .iter()
                    .map(|element| element.id)
                    .collect();
                self.selection.select(&ids);
            }
        }
    }

    fn begin_drag(&mut self, ids: &[ElementId]) {
        let Some(document) = &self.document else {
            return;
        };
        let mut state = DragState {
            ids: Vec::new(),
            lo: f32::NEG_INFINITY,
            hi: f32::INFINITY,
            applied: Point::default(),
        };
        for element in self.store.all().iter().filter(|e| ids.contains(&e.id)) {
            if element.locked {
                continue;
            }
            let page_height = document
                .page(element.page_index)
                .map(|page| page.viewport.height)
                .unwrap_or(0.0);
            let bounds = element.bounds;
            state.lo = state.lo.max((-bounds.y).min(0.0));
            state.hi = state.hi.min((page_height - bounds.y - bounds.height).max(0.0));
            state.ids.push(element.id);
        }

        if state.ids.is_empty() {
            debug!("nothing movable under the pointer");
            return;
        }
        self.drag = Some(state);
    }

    fn drag_to(&mut self, delta: Point) {
        let Some(drag) = &mut self.drag else {
            return;
        };
        let target = drag.clamp(delta);
        let step = target.delta_from(&drag.applied);
        if step.x == 0.0 && step.y == 0.0 {
            return;
        }
        drag.applied = target;
        self.store.translate(&drag.ids, step.x, step.y);
    }

    fn paste(&mut self) {
        if self.clipboard.is_empty() {
            return;
        }
        let offset = self.config.duplicate_offset;
        let document = self.document.as_ref();
        for element in &mut self.clipboard {
            let moved = element.bounds.translated(offset, offset);
            element.bounds = keep_on_page(document, element.page_index, moved);
        }

        let mut pasted = Vec::with_capacity(self.clipboard.len());
        for element in self.clipboard.clone() {
            match self.add_element(element) {
                Ok(id) => pasted.push(id),
                Err(err) => warn!(error = %err, "clipboard element not pasted"),
            }
        }
        self.selection.select(&pasted);
    }
}

/// Shift bounds back inside their page once it is ready
fn keep_on_page(document: Option<&Document>, page_index: usize, bounds: Bounds) -> Bounds {
    match document.and_then(|document| document.page(page_index)) {
        Some(page) if page.is_ready() => bounds.fit_within(page.viewport),
        _ => bounds,
    }
}

impl std::fmt::Debug for InteractionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionController")
            .field("tool", &self.machine.tool())
            .field("elements", &self.store.len())
            .field("selection", &self.selection.len())
            .finish()
    }
}
