#![no_main]

use buffer::{read_vlq, zigzag_decode, ReadCursor};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut cursor = ReadCursor::new(data);
    let mut reads = 0usize;

    // Use input bytes to drive a bounded sequence of reads.
    while !cursor.is_exhausted() && reads < 1024 {
        reads += 1;
        match cursor.peek().unwrap_or(0) % 3 {
            0 => {
                if let Ok(value) = read_vlq(&mut cursor) {
                    let _ = zigzag_decode(value);
                }
            }
            1 => {
                let _ = cursor.read_u8();
            }
            _ => {
                let len = usize::from(cursor.peek().unwrap_or(0) % 16);
                if cursor.read_bytes(len).is_err() {
                    break;
                }
            }
        }
    }
});
