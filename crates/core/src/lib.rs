//! PDF Canvas Core Library
//!
//! Document model and state managers for the annotation canvas: geometry,
//! page layout, coordinate mapping, element storage, selection, text
//! occlusion and hit testing. Nothing here knows about input devices or
//! rendering technology.

pub mod config;
pub mod coords;
pub mod document;
pub mod element;
pub mod error;
pub mod export;
pub mod geometry;
pub mod layout;
pub mod notify;
pub mod occlusion;
pub mod selection;
pub mod store;
pub mod text_run;

pub use config::{ConfigError, EngineConfig};
pub use coords::{
    document_to_screen, screen_to_document, screen_to_stack, stack_to_page, DocumentPosition,
    ViewTransform,
};
pub use document::{Document, DocumentHandle, Page, PageInput, PageState, RasterHandle};
pub use element::{
    DrawProperties, Element, ElementId, ElementKind, ElementPatch, ElementProperties,
    ImageProperties, NewElement, ShapeKind, ShapeProperties, SignatureProperties, SignatureType,
    TextAlignment, TextProperties,
};
pub use error::{EngineError, Result};
pub use export::{DocumentExport, PageExport};
pub use geometry::{Bounds, Color, Point, Size};
pub use hit_test::{Hit, HitTester, PageText};
pub use layout::{DocumentLayout, PageSlot};
pub use notify::{SubscriptionId, Subscribers};
pub use occlusion::{OcclusionHolder, RunKey, TextOcclusionManager};
pub use selection::SelectionManager;
pub use store::{ChangeKind, ElementStore, StoreChange};
pub use text_run::{TextRun, TextRunIndex, FALLBACK_FONT_NAME, FALLBACK_FONT_SIZE};
