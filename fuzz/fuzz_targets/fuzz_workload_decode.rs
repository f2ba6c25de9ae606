#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nfamatch::workload::Workload;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    levels: u8,
    bytes: &'a [u8],
}

fuzz_target!(|input: Input| {
    // Size checks must reject every inconsistent header without panicking
    if let Ok(workload) = Workload::from_bytes(input.bytes, input.levels as usize) {
        for query in workload.iter() {
            assert_eq!(query.len(), workload.levels());
        }
    }
});
