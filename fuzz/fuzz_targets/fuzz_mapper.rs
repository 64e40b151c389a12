#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use linepos::{CachedMapper, DirectMapper, FullIndexMapper, PositionMapper};

#[derive(Arbitrary, Debug)]
struct Input {
    words: Vec<String>,
    probes: Vec<String>,
    positions: Vec<u16>,
}

fuzz_target!(|input: Input| {
    // Build a valid store: sorted, deduplicated, no empty lines
    let mut words: Vec<&str> = input
        .words
        .iter()
        .map(String::as_str)
        .filter(|w| !w.is_empty() && !w.contains('\n'))
        .collect();
    words.sort_unstable();
    words.dedup();
    let text: String = words.iter().map(|w| format!("{w}\n")).collect();
    let data = text.as_bytes();

    let full = FullIndexMapper::from_reader(data).expect("valid store");
    let direct = DirectMapper::new(data);
    let cached = CachedMapper::new(data);

    // Every strategy agrees on every key and position
    for key in words.iter().copied().chain(input.probes.iter().map(String::as_str)) {
        let expected = full.encode(key).ok();
        assert_eq!(direct.encode(key).ok(), expected, "direct encode {key:?}");
        assert_eq!(cached.encode(key).ok(), expected, "cached encode {key:?}");
    }
    for position in input.positions {
        let position = u64::from(position);
        let expected = full.decode(position).ok();
        assert_eq!(direct.decode(position).ok(), expected, "direct decode {position}");
        assert_eq!(cached.decode(position).ok(), expected, "cached decode {position}");
    }
});
