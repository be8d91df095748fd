//! Editor facade
//!
//! The programmatic surface a host embeds: document loading, view state,
//! tools, element operations, input forwarding, change callbacks, export and
//! page rendering. Everything is single-threaded; callbacks run synchronously
//! inside the call that caused the change.

use pdf_canvas_core::{
    Document, DocumentExport, DocumentHandle, Element, ElementId, ElementPatch, EngineConfig,
    NewElement, PageInput, Point, Result, Size, StoreChange, SubscriptionId, Subscribers,
};
use tracing::debug;

use crate::controller::InteractionController;
use crate::input::{Key, Modifiers, PointerEvent};
use crate::scene::PageScene;
use crate::tool::{SignaturePayload, Tool, ToolStyle};

type PageListener = dyn FnMut(usize);
type CanvasListener = dyn FnMut(Size);

pub struct Editor {
    controller: InteractionController,
    next_handle: DocumentHandle,
    visible_page_listeners: Subscribers<PageListener>,
    canvas_size_listeners: Subscribers<CanvasListener>,
    last_visible_page: usize,
    last_canvas_size: Size,
}

impl Editor {
    /// Create a new editor with no document loaded
    pub fn new(config: EngineConfig) -> Self {
        Self {
            controller: InteractionController::new(config),
            next_handle: DocumentHandle::first(),
            visible_page_listeners: Subscribers::new(),
            canvas_size_listeners: Subscribers::new(),
            last_visible_page: 0,
            last_canvas_size: Size::default(),
        }
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn config(&self) -> &EngineConfig {
        self.controller.config()
    }

    /// Load a document whose pages are already rendered
    pub fn load_document(&mut self, pages: Vec<PageInput>) -> DocumentHandle {
        let handle = self.allocate_handle();
        let gap = self.config().page_gap;
        self.controller
            .set_document(Document::from_pages(handle, pages, gap));
        self.refresh_view();
        handle
    }

    /// Start a document whose pages will arrive through [`Editor::page_ready`]
    pub fn begin_document(&mut self, page_count: usize) -> DocumentHandle {
        let handle = self.allocate_handle();
        let gap = self.config().page_gap;
        self.controller
            .set_document(Document::loading(handle, page_count, gap));
        self.refresh_view();
        handle
    }

    pub fn page_ready(
        &mut self,
        handle: DocumentHandle,
        index: usize,
        input: PageInput,
    ) -> Result<()> {
        let result = self.controller.page_ready(handle, index, input);
        self.refresh_view();
        result
    }

    pub fn page_failed(
        &mut self,
        handle: DocumentHandle,
        index: usize,
        reason: impl Into<String>,
    ) -> Result<()> {
        let result = self.controller.page_failed(handle, index, reason);
        self.refresh_view();
        result
    }

    /// Set the zoom factor; returns the clamped value actually applied
    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        let applied = self.controller.set_zoom(zoom);
        self.refresh_view();
        applied
    }

    pub fn zoom(&self) -> f32 {
        self.controller.view().zoom
    }

    pub fn set_scroll(&mut self, x: f32, y: f32) {
        self.controller.set_scroll(Point::new(x, y));
        self.refresh_view();
    }

    pub fn set_container_origin(&mut self, x: f32, y: f32) {
        self.controller.set_container_origin(Point::new(x, y));
    }

    pub fn current_visible_page(&self) -> usize {
        self.controller.current_visible_page()
    }

    pub fn canvas_size(&self) -> Size {
        self.controller.canvas_size()
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.controller.set_tool(tool);
    }

    pub fn tool(&self) -> Tool {
        self.controller.tool()
    }

    pub fn set_style(&mut self, style: ToolStyle) {
        self.controller.set_style(style);
    }

    pub fn set_signature_payload(&mut self, payload: Option<SignaturePayload>) {
        self.controller.set_signature_payload(payload);
    }

    pub fn add_element(&mut self, element: NewElement) -> Result<ElementId> {
        self.controller.add_element(element)
    }

    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        self.controller.update_element(id, patch)
    }

    pub fn delete_elements(&mut self, ids: &[ElementId]) -> usize {
        self.controller.delete_elements(ids)
    }

    pub fn duplicate_elements(&mut self, ids: &[ElementId]) -> Vec<ElementId> {
        self.controller.duplicate_elements(ids)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.controller.store().get(id)
    }

    /// All elements in z-order
    pub fn elements(&self) -> &[Element] {
        self.controller.store().all()
    }

    pub fn select_elements(&mut self, ids: &[ElementId]) {
        self.controller.select_elements(ids);
    }

    pub fn toggle_select(&mut self, id: ElementId) {
        self.controller.toggle_select(id);
    }

    pub fn clear_selection(&mut self) {
        self.controller.clear_selection();
    }

    pub fn selection(&self) -> &[ElementId] {
        self.controller.selection().ids()
    }

    pub fn pointer_down(&mut self, event: PointerEvent) {
        self.controller.pointer_down(event);
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        self.controller.pointer_move(event);
    }

    pub fn pointer_up(&mut self, event: PointerEvent) {
        self.controller.pointer_up(event);
    }

    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) {
        self.controller.key_down(key, modifiers);
    }

    pub fn text_input(&mut self, text: &str) {
        self.controller.text_input(text);
    }

    pub fn blur_editor(&mut self) {
        self.controller.blur_editor();
    }

    pub fn on_elements_changed(
        &mut self,
        listener: impl FnMut(&StoreChange, &[Element]) + 'static,
    ) -> SubscriptionId {
        self.controller.subscribe_elements(listener)
    }

    pub fn on_selection_changed(
        &mut self,
        listener: impl FnMut(&[ElementId]) + 'static,
    ) -> SubscriptionId {
        self.controller.subscribe_selection(listener)
    }

    pub fn on_visible_page_changed(
        &mut self,
        listener: impl FnMut(usize) + 'static,
    ) -> SubscriptionId {
        self.visible_page_listeners.subscribe(Box::new(listener))
    }

    pub fn on_canvas_size_changed(
        &mut self,
        listener: impl FnMut(Size) + 'static,
    ) -> SubscriptionId {
        self.canvas_size_listeners.subscribe(Box::new(listener))
    }

    pub fn export(&self) -> DocumentExport {
        self.controller.export()
    }

    pub fn render_page(&self, page_index: usize) -> Result<PageScene> {
        self.controller.render_page(page_index)
    }

    fn allocate_handle(&mut self) -> DocumentHandle {
        let handle = self.next_handle;
        self.next_handle = handle.next();
        handle
    }

    /// Recompute derived view state and notify listeners of what changed
    fn refresh_view(&mut self) {
        self.controller.refresh_visible_page();

        let page = self.controller.current_visible_page();
        if page != self.last_visible_page {
            debug!(page, "visible page changed");
            self.last_visible_page = page;
            for listener in self.visible_page_listeners.iter_mut() {
                listener(page);
            }
        }

        let size = self.controller.canvas_size();
        if size != self.last_canvas_size {
            self.last_canvas_size = size;
            for listener in self.canvas_size_listeners.iter_mut() {
                listener(size);
            }
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("controller", &self.controller)
            .field("visible_page", &self.last_visible_page)
            .finish()
    }
}
