//! PDF Canvas UI Library
//!
//! Interaction layer of the annotation canvas: input events, tools, edit
//! sessions, the tool state machine, the controller that applies its
//! commands, scene rendering and the [`Editor`] facade.

pub mod controller;
pub mod editor;
pub mod input;
pub mod scene;
pub mod session;
pub mod state_machine;
pub mod tool;

pub use controller::InteractionController;
pub use editor::Editor;
pub use input::{Key, Modifiers, PointerEvent};
pub use scene::{render_element, render_page, DrawInstruction, PageScene, Rect, SceneSource};
pub use session::{EditSession, EditTarget, TextEditor};
pub use state_machine::{
    Command, HitTarget, PagePoint, PointerContext, TextSource, ToolStateMachine,
};
pub use tool::{SignaturePayload, Tool, ToolStyle};
