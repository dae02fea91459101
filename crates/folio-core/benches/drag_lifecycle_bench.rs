#![forbid(unsafe_code)]

use criterion::{Criterion, criterion_group, criterion_main};
use folio_core::{
    DragConfig, DragController, DragKey, ElementGeometry, InlineOffset, MemoryStore, Modifiers,
    Point, PointerButton, PointerSample, Rect, SavedPosition, Size,
};
use std::hint::black_box;

fn resting() -> ElementGeometry {
    ElementGeometry {
        element_rect: Rect::new(100.0, 50.0, 50.0, 50.0),
        element_size: Size::new(50.0, 50.0),
        parent_rect: Rect::new(100.0, 50.0, 300.0, 200.0),
        inline: InlineOffset::default(),
    }
}

fn controller(backend: MemoryStore) -> DragController<MemoryStore> {
    let mut ctl = DragController::new(DragConfig::default(), backend);
    for _ in 0..8 {
        ctl.enroll("skill-card", None);
    }
    ctl
}

fn press(pointer_id: i32) -> PointerSample {
    PointerSample::new(pointer_id, PointerButton::Primary, Point::new(110.0, 60.0))
}

fn bench_drag_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("folio/drag/lifecycle");
    let geometry = resting();

    group.bench_function("down_ack_move_32_up", |b| {
        b.iter(|| {
            let mut ctl = controller(MemoryStore::new());
            let Some(element) = ctl.registry().iter().next().map(|entry| entry.id) else {
                return;
            };
            let down = ctl.pointer_down(element, press(11), &geometry);
            black_box(down.sequence);
            black_box(ctl.capture_acquired(11).sequence);

            for step in 0..32 {
                let x = 110.0 + f64::from(step) * 9.0;
                let dispatch = ctl.pointer_move(11, Point::new(x, 60.0), &geometry);
                black_box(dispatch.commands.len());
            }

            let up = ctl.pointer_up(11, PointerButton::Primary);
            black_box(up.outcome);
        });
    });

    group.bench_function("down_nudge_64_escape", |b| {
        b.iter(|| {
            let mut ctl = controller(MemoryStore::new());
            let Some(element) = ctl.registry().iter().next().map(|entry| entry.id) else {
                return;
            };
            ctl.pointer_down(element, press(3), &geometry);
            for step in 0..64 {
                let key = if step % 2 == 0 {
                    DragKey::ArrowRight
                } else {
                    DragKey::ArrowDown
                };
                let dispatch = ctl.key_down(key, Modifiers::SHIFT, &geometry);
                black_box(dispatch.sequence);
            }
            black_box(ctl.key_down(DragKey::Escape, Modifiers::NONE, &geometry).outcome);
        });
    });

    group.finish();
}

fn bench_position_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("folio/store/save");

    group.bench_function("replace_in_64_records", |b| {
        let records: Vec<_> = (0..64)
            .map(|i| SavedPosition::new(format!("skill-card:{i}"), "10px", "20px"))
            .collect();
        let seeded = serde_json::to_string(&records).unwrap_or_default();
        b.iter(|| {
            let mut ctl = controller(MemoryStore::with_raw("elementPositions", &seeded));
            let Some(element) = ctl.registry().iter().nth(5).map(|entry| entry.id) else {
                return;
            };
            ctl.pointer_down(element, press(1), &geometry_for_store());
            black_box(ctl.pointer_up(1, PointerButton::Primary).outcome);
        });
    });

    group.finish();
}

fn geometry_for_store() -> ElementGeometry {
    ElementGeometry {
        inline: InlineOffset::new("42px", "7px"),
        ..resting()
    }
}

criterion_group!(benches, bench_drag_lifecycle, bench_position_store);
criterion_main!(benches);
