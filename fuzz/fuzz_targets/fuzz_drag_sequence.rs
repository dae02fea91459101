#![no_main]

use arbitrary::Arbitrary;
use folio_core::{
    DragCommand, DragConfig, DragController, DragKey, ElementGeometry, MemoryStore, Modifiers,
    Offset, Point, PointerButton, PointerSample, Rect, Size,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Down { element: u8, pointer: u8, button: i8, x: i16, y: i16 },
    Ack { pointer: u8 },
    Move { pointer: u8, x: i16, y: i16 },
    Up { pointer: u8, button: i8 },
    Cancel { pointer: u8 },
    Lost { pointer: u8 },
    Key { key: u8, shift: bool },
}

#[derive(Debug, Arbitrary)]
struct Input {
    parent: (u16, u16),
    element: (u16, u16),
    ops: Vec<Op>,
}

fn key_from(raw: u8) -> DragKey {
    match raw % 5 {
        0 => DragKey::ArrowUp,
        1 => DragKey::ArrowDown,
        2 => DragKey::ArrowLeft,
        3 => DragKey::ArrowRight,
        _ => DragKey::Escape,
    }
}

fuzz_target!(|input: Input| {
    if input.ops.len() > 256 {
        return;
    }
    let parent = Size::new(f64::from(input.parent.0), f64::from(input.parent.1));
    let element = Size::new(f64::from(input.element.0), f64::from(input.element.1));
    let max_left = (parent.width - element.width).max(0.0);
    let max_top = (parent.height - element.height).max(0.0);

    let backend = MemoryStore::new();
    let mut ctl = DragController::new(DragConfig::default(), backend.clone());
    let ids: Vec<_> = (0..3).map(|_| ctl.enroll("skill-card", None).id).collect();
    let mut current = Offset::default();

    for op in &input.ops {
        let geometry = ElementGeometry {
            element_rect: Rect::new(current.left, current.top, element.width, element.height),
            element_size: element,
            parent_rect: Rect::new(0.0, 0.0, parent.width, parent.height),
            inline: current.to_inline(),
        };
        let before_store = backend.raw("elementPositions");
        let dispatch = match *op {
            Op::Down { element: e, pointer, button, x, y } => {
                let id = ids[usize::from(e) % ids.len()];
                let sample = PointerSample::new(
                    i32::from(pointer),
                    PointerButton::from_dom(i16::from(button)),
                    Point::new(f64::from(x), f64::from(y)),
                );
                ctl.pointer_down(id, sample, &geometry)
            }
            Op::Ack { pointer } => ctl.capture_acquired(i32::from(pointer)),
            Op::Move { pointer, x, y } => {
                let position = Point::new(f64::from(x), f64::from(y));
                ctl.pointer_move(i32::from(pointer), position, &geometry)
            }
            Op::Up { pointer, button } => {
                ctl.pointer_up(i32::from(pointer), PointerButton::from_dom(i16::from(button)))
            }
            Op::Cancel { pointer } => ctl.pointer_cancel(i32::from(pointer)),
            Op::Lost { pointer } => ctl.lost_pointer_capture(i32::from(pointer)),
            Op::Key { key, shift } => {
                let mods = if shift { Modifiers::SHIFT } else { Modifiers::NONE };
                ctl.key_down(key_from(key), mods, &geometry)
            }
        };

        if !dispatch.accepted() {
            assert!(dispatch.commands.is_empty());
            assert_eq!(backend.raw("elementPositions"), before_store);
        }
        // Reverts restore an earlier applied offset, so every write stays
        // inside the parent.
        for command in &dispatch.commands {
            if let DragCommand::ApplyOffset { offset, .. } = *command {
                assert!((0.0..=max_left).contains(&offset.left));
                assert!((0.0..=max_top).contains(&offset.top));
                current = offset;
            }
        }
    }
});
