//! End-to-end editor behaviour driven through the public API

use pdf_canvas_core::{
    screen_to_document, Bounds, Color, DocumentLayout, ElementKind, ElementPatch,
    ElementProperties, NewElement, OcclusionHolder, PageInput, Point, RasterHandle, RunKey,
    ShapeKind, ShapeProperties, Size, StoreChange, TextProperties, TextRun, ViewTransform,
};
use pdf_canvas_ui::{DrawInstruction, Editor, Key, Modifiers, PointerEvent, Tool};
use std::cell::RefCell;
use std::rc::Rc;

fn page(height: f32, runs: Vec<TextRun>) -> PageInput {
    PageInput {
        viewport: Size::new(600.0, height),
        raster: RasterHandle::new(format!("raster-{height}")),
        text_runs: runs,
    }
}

fn invoice_runs() -> Vec<TextRun> {
    // Box: x 100, y 792 - 680 - 12 = 100, 40 x 12
    vec![TextRun::new("Total", [12.0, 0.0, 0.0, 12.0, 100.0, 680.0], 40.0, 12.0)
        .with_font_name("Helvetica")]
}

fn two_page_editor() -> Editor {
    let mut editor = Editor::default();
    editor.load_document(vec![page(792.0, invoice_runs()), page(792.0, Vec::new())]);
    editor
}

fn rect(page_index: usize, bounds: Bounds) -> NewElement {
    NewElement::new(
        page_index,
        bounds,
        ElementProperties::Shape {
            kind: ShapeKind::Rectangle,
            style: ShapeProperties::new(2.0, Color::BLACK),
        },
    )
}

fn drag(editor: &mut Editor, from: (f32, f32), to: (f32, f32)) {
    editor.pointer_down(PointerEvent::at(from.0, from.1));
    editor.pointer_move(PointerEvent::at(to.0, to.1));
    editor.pointer_up(PointerEvent::at(to.0, to.1));
}

#[test]
fn test_single_page_mapping_is_identity() {
    let layout = DocumentLayout::new(&[Some(Size::new(600.0, 800.0))], 20.0);
    let position = screen_to_document(Point::new(100.0, 150.0), &ViewTransform::default(), &layout);
    assert_eq!(position.page_index, Some(0));
    assert_eq!(position.point, Point::new(100.0, 150.0));
}

#[test]
fn test_second_page_mapping() {
    let layout = DocumentLayout::new(
        &[Some(Size::new(600.0, 800.0)), Some(Size::new(600.0, 800.0))],
        20.0,
    );
    let position = screen_to_document(Point::new(10.0, 850.0), &ViewTransform::default(), &layout);
    assert_eq!(position.page_index, Some(1));
    assert_eq!(position.point.y, 30.0);
}

#[test]
fn test_shape_on_second_page_uses_page_local_coordinates() {
    let mut editor = two_page_editor();
    editor.set_tool(Tool::Shape(ShapeKind::Circle));
    // Page 1 starts at 812
    drag(&mut editor, (50.0, 862.0), (150.0, 912.0));

    let element = &editor.elements()[0];
    assert_eq!(element.page_index, 1);
    assert_eq!(element.bounds, Bounds::new(50.0, 50.0, 100.0, 50.0));
    assert_eq!(element.kind(), ElementKind::Circle);
}

#[test]
fn test_zoomed_and_scrolled_shape() {
    let mut editor = two_page_editor();
    editor.set_zoom(2.0);
    editor.set_scroll(0.0, 100.0);
    editor.set_container_origin(10.0, 20.0);
    editor.set_tool(Tool::Shape(ShapeKind::Rectangle));
    // screen (30, 40) -> content (20, 120) -> document (10, 60)
    drag(&mut editor, (30.0, 40.0), (130.0, 140.0));

    assert_eq!(editor.elements()[0].bounds, Bounds::new(10.0, 60.0, 50.0, 50.0));
}

#[test]
fn test_bounds_never_negative() {
    let mut editor = two_page_editor();
    let id = editor
        .add_element(rect(0, Bounds::new(100.0, 100.0, -40.0, -30.0)))
        .unwrap();
    assert_eq!(editor.element(id).unwrap().bounds, Bounds::new(60.0, 70.0, 40.0, 30.0));

    editor.update_element(id, &ElementPatch::bounds(Bounds::new(0.0, 0.0, -5.0, 5.0)));
    let bounds = editor.element(id).unwrap().bounds;
    assert!(bounds.width >= 0.0 && bounds.height >= 0.0);

    // Dragging a shape up and to the left
    editor.set_tool(Tool::Shape(ShapeKind::Rectangle));
    drag(&mut editor, (300.0, 300.0), (250.0, 260.0));
    let drawn = editor.elements().last().unwrap().bounds;
    assert_eq!(drawn, Bounds::new(250.0, 260.0, 50.0, 40.0));
}

#[test]
fn test_add_get_round_trip() {
    let mut editor = two_page_editor();
    let new = NewElement::new(
        1,
        Bounds::new(5.0, 6.0, 7.0, 8.0),
        ElementProperties::Text(TextProperties::new("Approved", 18.0, "Georgia")),
    );
    let id = editor.add_element(new.clone()).unwrap();
    let stored = editor.element(id).unwrap();
    assert_eq!(stored.id, id);
    assert_eq!(stored.to_new(), new);
}

#[test]
fn test_update_is_idempotent() {
    let mut editor = two_page_editor();
    let id = editor
        .add_element(rect(0, Bounds::new(0.0, 0.0, 10.0, 10.0)))
        .unwrap();
    let patch = ElementPatch {
        bounds: Some(Bounds::new(20.0, 20.0, 30.0, 30.0)),
        opacity: Some(0.5),
        ..Default::default()
    };
    editor.update_element(id, &patch);
    let once = editor.element(id).unwrap().clone();
    editor.update_element(id, &patch);
    let twice = editor.element(id).unwrap();
    assert_eq!(once.bounds, twice.bounds);
    assert_eq!(once.opacity, twice.opacity);
    assert_eq!(once.properties, twice.properties);
}

#[test]
fn test_topmost_element_wins() {
    let mut editor = two_page_editor();
    editor
        .add_element(rect(0, Bounds::new(200.0, 200.0, 100.0, 100.0)))
        .unwrap();
    let top = editor
        .add_element(rect(0, Bounds::new(250.0, 250.0, 100.0, 100.0)))
        .unwrap();

    editor.pointer_down(PointerEvent::at(275.0, 275.0));
    editor.pointer_up(PointerEvent::at(275.0, 275.0));
    assert_eq!(editor.selection(), &[top]);
}

#[test]
fn test_group_drag_moves_all_by_same_delta() {
    let mut editor = two_page_editor();
    let a = editor
        .add_element(rect(0, Bounds::new(200.0, 200.0, 50.0, 50.0)))
        .unwrap();
    let b = editor
        .add_element(rect(0, Bounds::new(400.0, 300.0, 20.0, 20.0)))
        .unwrap();
    let before: Vec<Bounds> = [a, b].iter().map(|id| editor.element(*id).unwrap().bounds).collect();

    editor.pointer_down(PointerEvent::at(210.0, 210.0));
    editor.pointer_up(PointerEvent::at(210.0, 210.0));
    editor.pointer_down(PointerEvent::at(405.0, 305.0).with_modifiers(Modifiers::ctrl()));
    editor.pointer_up(PointerEvent::at(405.0, 305.0));
    assert_eq!(editor.selection(), &[a, b]);

    drag(&mut editor, (210.0, 210.0), (240.0, 190.0));

    for (id, old) in [a, b].iter().zip(before) {
        let new = editor.element(*id).unwrap().bounds;
        assert_eq!(new.x - old.x, 30.0);
        assert_eq!(new.y - old.y, -20.0);
        assert_eq!((new.width, new.height), (old.width, old.height));
    }
}

#[test]
fn test_drag_never_changes_page() {
    let mut editor = two_page_editor();
    let id = editor
        .add_element(rect(0, Bounds::new(100.0, 700.0, 50.0, 50.0)))
        .unwrap();
    drag(&mut editor, (120.0, 720.0), (120.0, 1000.0));

    let element = editor.element(id).unwrap();
    assert_eq!(element.page_index, 0);
    assert_eq!(element.bounds.bottom(), 792.0);
}

#[test]
fn test_minimum_size_rejected() {
    let mut editor = two_page_editor();
    editor.set_tool(Tool::Shape(ShapeKind::Rectangle));
    drag(&mut editor, (100.0, 100.0), (104.0, 200.0));
    drag(&mut editor, (100.0, 100.0), (200.0, 104.0));
    assert!(editor.elements().is_empty());

    drag(&mut editor, (100.0, 100.0), (105.0, 105.0));
    assert_eq!(editor.elements().len(), 1);
    assert_eq!(editor.tool(), Tool::Shape(ShapeKind::Rectangle));
}

#[test]
fn test_blank_new_text_rejected() {
    let mut editor = two_page_editor();
    editor.set_tool(Tool::Text);
    editor.pointer_down(PointerEvent::at(300.0, 400.0));
    editor.pointer_up(PointerEvent::at(300.0, 400.0));
    editor.text_input("  \t ");
    editor.key_down(Key::Enter, Modifiers::default());
    assert!(editor.elements().is_empty());
}

#[test]
fn test_blank_existing_text_rejected() {
    let mut editor = two_page_editor();
    editor.pointer_down(PointerEvent::at(110.0, 105.0));
    editor.pointer_up(PointerEvent::at(110.0, 105.0));
    for _ in 0.."Total".len() {
        editor.key_down(Key::Backspace, Modifiers::default());
    }
    editor.blur_editor();

    assert!(editor.elements().is_empty());
    assert!(!editor.controller().occlusion().is_hidden(RunKey::new(0, 0)));
}

#[test]
fn test_new_text_commit() {
    let mut editor = two_page_editor();
    editor.set_tool(Tool::Text);
    editor.pointer_down(PointerEvent::at(300.0, 400.0));
    editor.pointer_up(PointerEvent::at(300.0, 400.0));
    editor.text_input("Received");
    editor.key_down(Key::Enter, Modifiers::default());

    let element = &editor.elements()[0];
    let text = element.properties.as_text().unwrap();
    assert_eq!(text.text, "Received");
    assert_eq!(text.font_size, 16.0);
    assert_eq!(element.bounds, Bounds::new(300.0, 400.0, 200.0, 24.0));
    assert_eq!(editor.tool(), Tool::Select);
}

#[test]
fn test_in_place_edit_masks_source_run() {
    let mut editor = two_page_editor();
    editor.pointer_down(PointerEvent::at(110.0, 105.0));
    editor.pointer_up(PointerEvent::at(110.0, 105.0));

    // While editing: patch, then the editor box
    let scene = editor.render_page(0).unwrap();
    assert!(scene
        .instructions
        .iter()
        .any(|i| matches!(i, DrawInstruction::FillRect { .. })));
    assert!(matches!(
        scene.instructions.last(),
        Some(DrawInstruction::EditorBox { text, .. }) if text == "Total"
    ));

    editor.text_input(": $42");
    editor.key_down(Key::Enter, Modifiers::default());

    let element = editor.elements()[0].clone();
    let text = element.properties.as_text().unwrap();
    assert_eq!(text.text, "Total: $42");
    assert_eq!(text.font_family, "Helvetica");
    assert_eq!(text.font_size, 12.0);
    assert_eq!(element.bounds.origin(), Point::new(100.0, 100.0));
    assert_eq!(
        editor.controller().occlusion().holder(RunKey::new(0, 0)),
        Some(OcclusionHolder::Replaced(element.id))
    );

    // The masked run is no longer pickable; the click lands on the new element
    editor.pointer_down(PointerEvent::at(110.0, 105.0));
    editor.pointer_up(PointerEvent::at(110.0, 105.0));
    assert_eq!(editor.selection(), &[element.id]);

    editor.key_down(Key::Delete, Modifiers::default());
    assert!(editor.elements().is_empty());
    assert!(!editor.controller().occlusion().is_hidden(RunKey::new(0, 0)));
}

#[test]
fn test_escape_cancels_and_reveals() {
    let mut editor = two_page_editor();
    editor.pointer_down(PointerEvent::at(110.0, 105.0));
    editor.text_input(" changed");
    editor.key_down(Key::Escape, Modifiers::default());

    assert!(editor.elements().is_empty());
    assert!(editor.controller().occlusion().hidden_keys().is_empty());
    assert!(editor.controller().machine().session().is_none());
}

#[test]
fn test_freehand_stroke() {
    let mut editor = two_page_editor();
    editor.set_tool(Tool::Draw);
    editor.pointer_down(PointerEvent::at(10.0, 10.0));
    editor.pointer_move(PointerEvent::at(20.0, 15.0));
    editor.pointer_move(PointerEvent::at(30.0, 40.0));
    editor.pointer_up(PointerEvent::at(30.0, 40.0));

    let element = &editor.elements()[0];
    assert_eq!(element.kind(), ElementKind::Draw);
    assert_eq!(element.bounds, Bounds::new(8.0, 8.0, 24.0, 34.0));
}

#[test]
fn test_click_in_gap_does_nothing() {
    let mut editor = two_page_editor();
    editor.set_tool(Tool::Shape(ShapeKind::Rectangle));
    drag(&mut editor, (100.0, 800.0), (200.0, 900.0));
    assert!(editor.elements().is_empty());
}

#[test]
fn test_shape_dragged_across_page_boundary_stays_on_start_page() {
    let mut editor = Editor::default();
    editor.load_document(vec![page(800.0, Vec::new()), page(600.0, Vec::new())]);
    editor.set_tool(Tool::Shape(ShapeKind::Rectangle));
    // Release lands inside page 1, which starts at 820
    drag(&mut editor, (100.0, 700.0), (200.0, 1100.0));

    let element = &editor.elements()[0];
    assert_eq!(element.page_index, 0);
    assert_eq!(element.bounds, Bounds::new(100.0, 700.0, 100.0, 100.0));
    assert!(element.bounds.bottom() <= 800.0);
}

#[test]
fn test_stroke_across_page_boundary_stays_on_start_page() {
    let mut editor = Editor::default();
    editor.load_document(vec![page(800.0, Vec::new()), page(600.0, Vec::new())]);
    editor.set_tool(Tool::Draw);
    editor.pointer_down(PointerEvent::at(100.0, 780.0));
    editor.pointer_move(PointerEvent::at(105.0, 900.0));
    editor.pointer_up(PointerEvent::at(110.0, 1000.0));

    let element = &editor.elements()[0];
    assert_eq!(element.page_index, 0);
    assert!(element.bounds.bottom() <= 800.0);
    let ElementProperties::Draw(draw) = &element.properties else {
        panic!("expected a stroke, got {:?}", element.properties);
    };
    let origin = element.bounds.origin();
    for point in &draw.paths[0] {
        assert!(origin.y + point.y <= 800.0);
    }
}

#[test]
fn test_escape_mid_shape_discards_gesture() {
    let mut editor = two_page_editor();
    editor.set_tool(Tool::Shape(ShapeKind::Rectangle));
    editor.pointer_down(PointerEvent::at(100.0, 100.0));
    editor.pointer_move(PointerEvent::at(250.0, 220.0));
    editor.key_down(Key::Escape, Modifiers::default());
    assert!(editor.controller().machine().session().is_none());

    editor.pointer_up(PointerEvent::at(250.0, 220.0));
    assert!(editor.elements().is_empty());
    assert!(editor.controller().machine().session().is_none());
}

#[test]
fn test_escape_mid_stroke_discards_gesture() {
    let mut editor = two_page_editor();
    editor.set_tool(Tool::Draw);
    editor.pointer_down(PointerEvent::at(10.0, 10.0));
    editor.pointer_move(PointerEvent::at(40.0, 25.0));
    editor.pointer_move(PointerEvent::at(90.0, 60.0));
    editor.key_down(Key::Escape, Modifiers::default());
    assert!(editor.controller().machine().session().is_none());

    editor.pointer_up(PointerEvent::at(90.0, 60.0));
    assert!(editor.elements().is_empty());
    assert!(editor.controller().machine().session().is_none());
}

#[test]
fn test_delete_prunes_selection_and_notifies() {
    let changes: Rc<RefCell<Vec<StoreChange>>> = Rc::new(RefCell::new(Vec::new()));
    let selections = Rc::new(RefCell::new(Vec::new()));
    let mut editor = two_page_editor();
    let sink = changes.clone();
    editor.on_elements_changed(move |change, _| sink.borrow_mut().push(change.clone()));
    let sink = selections.clone();
    editor.on_selection_changed(move |ids| sink.borrow_mut().push(ids.len()));

    let a = editor.add_element(rect(0, Bounds::new(0.0, 0.0, 10.0, 10.0))).unwrap();
    let b = editor.add_element(rect(0, Bounds::new(50.0, 0.0, 10.0, 10.0))).unwrap();
    editor.select_elements(&[a, b]);
    editor.delete_elements(&[a]);

    assert_eq!(editor.selection(), &[b]);
    assert_eq!(changes.borrow().len(), 3);
    assert_eq!(changes.borrow()[2].ids, vec![a]);
    assert_eq!(*selections.borrow(), vec![2, 1]);
}

#[test]
fn test_duplicate_shortcut_selects_copies() {
    let mut editor = two_page_editor();
    let id = editor
        .add_element(rect(1, Bounds::new(10.0, 10.0, 20.0, 20.0)))
        .unwrap();
    editor.select_elements(&[id]);
    editor.key_down(Key::Char('d'), Modifiers::ctrl());

    assert_eq!(editor.elements().len(), 2);
    let copy = &editor.elements()[1];
    assert_eq!(copy.bounds, Bounds::new(30.0, 30.0, 20.0, 20.0));
    assert_eq!(copy.page_index, 1);
    assert_eq!(editor.selection(), &[copy.id]);
}

#[test]
fn test_export_groups_pages() {
    let mut editor = two_page_editor();
    editor.add_element(rect(1, Bounds::new(0.0, 0.0, 10.0, 10.0))).unwrap();
    editor.add_element(rect(0, Bounds::new(0.0, 0.0, 10.0, 10.0))).unwrap();

    let export = editor.export();
    assert_eq!(export.page_count, 2);
    assert_eq!(export.pages[0].elements.len(), 1);
    assert_eq!(export.pages[1].elements.len(), 1);
    assert!(export.to_json().unwrap().contains("\"rectangle\""));
}

#[test]
fn test_reload_clears_state() {
    let mut editor = two_page_editor();
    let id = editor.add_element(rect(0, Bounds::new(0.0, 0.0, 10.0, 10.0))).unwrap();
    editor.select_elements(&[id]);
    editor.load_document(vec![page(500.0, Vec::new())]);

    assert!(editor.elements().is_empty());
    assert!(editor.selection().is_empty());
    assert_eq!(editor.canvas_size(), Size::new(600.0, 520.0));
}
