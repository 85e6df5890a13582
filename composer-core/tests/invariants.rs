//! Property tests: random operation sequences keep the document invariants.

use composer_core::{
    Document, EditorSession, ElementRef, FontStyle, HitTarget, KeyEvent, Point, StyleChange,
    TransformUpdate,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Type(String),
    AddSticker,
    SelectText(usize),
    SelectSticker(usize),
    DragText(usize, f32, f32),
    TransformSticker(usize, f32),
    Bold,
    Fill,
    DeselectAll,
    DeselectText,
    StageClick,
    Delete,
    BringToFront(usize),
    Undo(usize),
    Redo(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop::sample::select(vec!["", "  ", "a", "Hello", "x y"])
            .prop_map(|s| Op::Type(s.to_string())),
        Just(Op::AddSticker),
        (0usize..4).prop_map(Op::SelectText),
        (0usize..4).prop_map(Op::SelectSticker),
        (0usize..4, -50.0f32..500.0, -50.0f32..500.0).prop_map(|(i, x, y)| Op::DragText(i, x, y)),
        (0usize..4, -3.0f32..3.0).prop_map(|(i, s)| Op::TransformSticker(i, s)),
        Just(Op::Bold),
        Just(Op::Fill),
        Just(Op::DeselectAll),
        Just(Op::DeselectText),
        Just(Op::StageClick),
        Just(Op::Delete),
        (0usize..4).prop_map(Op::BringToFront),
        (1usize..4).prop_map(Op::Undo),
        (1usize..4).prop_map(Op::Redo),
    ]
}

fn apply(session: &mut EditorSession, op: &Op) {
    let doc = session.document();
    let text_id = |i: usize| doc.text_elements.get(i).map(|t| t.id);
    let sticker_id = |i: usize| doc.stickers.get(i).map(|s| s.id);

    match op {
        Op::Type(text) => {
            session.set_text_content(text);
        }
        Op::AddSticker => {
            session.add_sticker("/1.svg");
        }
        Op::SelectText(i) => {
            if let Some(id) = text_id(*i) {
                session.select_text(id);
            }
        }
        Op::SelectSticker(i) => {
            if let Some(id) = sticker_id(*i) {
                session.select_sticker(id);
            }
        }
        Op::DragText(i, x, y) => {
            if let Some(id) = text_id(*i) {
                session.text_drag_start(id);
                session.text_drag_end(id, Point::new(*x, *y));
            }
        }
        Op::TransformSticker(i, scale) => {
            if let Some(id) = sticker_id(*i) {
                let update = TransformUpdate {
                    x: 0.0,
                    y: 0.0,
                    rotation: 10.0,
                    scale_x: *scale,
                    scale_y: *scale,
                    font_size: None,
                };
                session.sticker_transform(id, &update);
            }
        }
        Op::Bold => {
            session.change_font_style(FontStyle::Bold);
        }
        Op::Fill => {
            session.change_style(StyleChange::Fill("#ff00ff".to_string()));
        }
        Op::DeselectAll => session.deselect_all(),
        Op::DeselectText => session.deselect_text(),
        Op::StageClick => {
            session.handle_stage_click(HitTarget::Stage);
        }
        Op::Delete => {
            session.handle_key(&KeyEvent::new("Delete"));
        }
        Op::BringToFront(i) => {
            if let Some(id) = sticker_id(*i) {
                session.bring_to_front(ElementRef::sticker(id));
            }
        }
        Op::Undo(n) => {
            session.undo(*n);
        }
        Op::Redo(n) => {
            session.redo(*n);
        }
    }
}

fn max_element_z(doc: &Document) -> i64 {
    doc.text_elements
        .iter()
        .map(|t| t.style.z_index)
        .chain(doc.stickers.iter().map(|s| s.z_index))
        .max()
        .unwrap_or(0)
}

proptest! {
    #[test]
    fn prop_at_most_one_selected(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut session = EditorSession::default();
        for op in &ops {
            apply(&mut session, op);
            prop_assert!(
                session.document().selection_count() <= 1,
                "more than one element selected after {:?}",
                op
            );
        }
    }

    #[test]
    fn prop_max_z_bounds_every_element(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut session = EditorSession::default();
        for op in &ops {
            apply(&mut session, op);
            let doc = session.document();
            prop_assert!(doc.max_z_index >= max_element_z(doc));
        }
    }

    #[test]
    fn prop_text_input_mirrors_selected_text(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut session = EditorSession::default();
        for op in &ops {
            apply(&mut session, op);
            let doc = session.document();
            if let Some(selected) = doc.selected_text() {
                prop_assert_eq!(&doc.current_text_input, &selected.text);
            }
        }
    }

    #[test]
    fn prop_unselected_text_is_never_blank(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut session = EditorSession::default();
        for op in &ops {
            apply(&mut session, op);
            for el in &session.document().text_elements {
                prop_assert!(el.is_selected || !el.is_blank(), "blank text survived deselect");
            }
        }
    }

    #[test]
    fn prop_undo_then_redo_round_trips(ops in prop::collection::vec(arb_op(), 1..20)) {
        let mut session = EditorSession::default();
        for op in &ops {
            apply(&mut session, op);
        }
        let stickers = session.document().stickers.clone();
        let texts = session.document().text_elements.clone();
        if session.undo(1) {
            prop_assert!(session.redo(1));
            prop_assert_eq!(&session.document().stickers, &stickers);
            prop_assert_eq!(&session.document().text_elements, &texts);
        }
    }
}
