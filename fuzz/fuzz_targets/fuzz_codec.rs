#![no_main]

use libfuzzer_sys::fuzz_target;
use linepos::mapper::line;
use linepos::utils::FixedWidthCodec;

fuzz_target!(|data: &[u8]| {
    let Some((&width, rest)) = data.split_first() else {
        return;
    };

    // Any width either builds a codec or is rejected, never panics
    if let Ok(codec) = FixedWidthCodec::new(usize::from(width % 10)) {
        let mut reader = rest;
        while let Ok(Some(position)) = codec.decode_from(&mut reader) {
            let mut out = Vec::new();
            codec.encode_to(&mut out, position).expect("write to vec");
            assert_eq!(codec.decode(&out).ok(), Some(position));
        }
    }

    // Line reading on arbitrary bytes stays in bounds
    for offset in [0, rest.len() as u64 / 2, rest.len() as u64, rest.len() as u64 + 3] {
        if let Ok(start) = line::find_line_start(rest, offset) {
            assert!(start <= offset);
            let _ = line::read_line(rest, start);
        }
    }
});
