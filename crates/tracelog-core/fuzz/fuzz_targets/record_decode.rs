#![no_main]
use libfuzzer_sys::fuzz_target;
use tracelog_core::{RecordEncoder, RecordIter};

fuzz_target!(|data: &[u8]| {
    // Every record the iterator accepts must re-encode to the bytes it came from.
    let mut enc = RecordEncoder::new();
    let mut it = RecordIter::new(data);
    let mut start = 0;
    while let Some(Ok(rec)) = it.next() {
        let end = it.offset();
        assert_eq!(enc.encode_record(&rec).unwrap(), &data[start..end]);
        start = end;
    }
});
