#![no_main]

use folio_core::{MemoryStore, PositionStore, SavedPosition};
use libfuzzer_sys::fuzz_target;

const KEY: &str = "elementPositions";

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    if raw.len() > 8192 {
        return;
    }

    let backend = MemoryStore::with_raw(KEY, raw);
    let mut store = PositionStore::new(backend.clone(), KEY);

    // Arbitrary stored content decodes (possibly to empty) without panicking.
    let before = store.load_all();

    let record = SavedPosition::new("fuzz:0", "12px", "34px");
    store
        .save(record.clone())
        .expect("memory store writes never fail");

    // After a save the stored value is always a well-formed layout holding
    // exactly one record for the identity.
    let stored = backend.raw(KEY).expect("save writes the key");
    let decoded: Vec<SavedPosition> =
        serde_json::from_str(&stored).expect("saved layout must be valid JSON");
    assert_eq!(decoded.iter().filter(|p| p.id == record.id).count(), 1);
    assert!(decoded.contains(&record));

    let others_before = before.iter().filter(|p| p.id != record.id).count();
    let others_after = decoded.iter().filter(|p| p.id != record.id).count();
    assert_eq!(others_before, others_after, "save must not drop other records");
});
