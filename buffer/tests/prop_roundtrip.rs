use buffer::{read_vlq, vlq_len, write_vlq, zigzag_decode, zigzag_encode, ByteBuffer};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Unsigned(u64),
    Signed(i64),
    Raw(Vec<u8>),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u64>().prop_map(Op::Unsigned),
        any::<i64>().prop_map(Op::Signed),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Op::Raw),
    ]
}

proptest! {
    #[test]
    fn prop_vlq_roundtrip(value in any::<u64>()) {
        let mut buf = ByteBuffer::new();
        write_vlq(&mut buf, value);
        prop_assert_eq!(buf.len(), vlq_len(value));

        let mut cursor = buf.read_cursor();
        prop_assert_eq!(read_vlq(&mut cursor).unwrap(), value);
        prop_assert!(cursor.is_exhausted());
    }

    #[test]
    fn prop_zigzag_roundtrip(value in any::<i64>()) {
        prop_assert_eq!(zigzag_decode(zigzag_encode(value)), value);
    }

    #[test]
    fn prop_roundtrip_ops(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let mut buf = ByteBuffer::new();
        for op in &ops {
            match op {
                Op::Unsigned(v) => write_vlq(&mut buf, *v),
                Op::Signed(v) => write_vlq(&mut buf, zigzag_encode(*v)),
                Op::Raw(bytes) => {
                    write_vlq(&mut buf, bytes.len() as u64);
                    buf.extend_from_slice(bytes);
                }
            }
        }

        let mut cursor = buf.read_cursor();
        for op in &ops {
            match op {
                Op::Unsigned(v) => prop_assert_eq!(read_vlq(&mut cursor).unwrap(), *v),
                Op::Signed(v) => {
                    prop_assert_eq!(zigzag_decode(read_vlq(&mut cursor).unwrap()), *v);
                }
                Op::Raw(bytes) => {
                    let len = read_vlq(&mut cursor).unwrap() as usize;
                    prop_assert_eq!(cursor.read_bytes(len).unwrap(), bytes.as_slice());
                }
            }
        }
        prop_assert!(cursor.is_exhausted());
    }

    #[test]
    fn prop_read_vlq_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..32)) {
        let mut cursor = buffer::ReadCursor::new(&bytes);
        while !cursor.is_exhausted() {
            if read_vlq(&mut cursor).is_err() {
                break;
            }
        }
    }
}
