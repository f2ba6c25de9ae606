#![no_main]

use libfuzzer_sys::fuzz_target;
use nfamatch::engine::{Engine, DEFAULT_SCHEMA, LEVEL_COUNT};
use nfamatch::table::LevelTable;

fuzz_target!(|data: &[u8]| {
    // Decoding arbitrary bytes must fail cleanly, and any table that loads
    // must be searchable without panicking
    if let Ok(table) = LevelTable::from_bytes(data, LEVEL_COUNT) {
        let engine = Engine::new(&table, &DEFAULT_SCHEMA).unwrap();
        for start in 0..4u16 {
            let mut query = [start; LEVEL_COUNT];
            query[LEVEL_COUNT - 1] = 0;
            let _ = engine.evaluate(&query);
        }
    }
});
