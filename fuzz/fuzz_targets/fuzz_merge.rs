//! Fuzz testing for the advice bullet merge
//!
//! Existing lines survive in order; each appended line appears once and was
//! not already in the field.
//!
//! Run with: cargo +nightly fuzz run fuzz_merge

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use voice_scribe_lib::note_merge::{merge_bullets, strip_bullet};

#[derive(Debug, Arbitrary)]
struct FuzzMerge {
    existing: String,
    additions: Vec<String>,
}

fuzz_target!(|input: FuzzMerge| {
    let kept: Vec<&str> = input
        .existing
        .lines()
        .map(strip_bullet)
        .filter(|l| !l.is_empty())
        .collect();

    let merged = merge_bullets(&input.existing, &input.additions);
    let lines: Vec<&str> = merged.lines().map(strip_bullet).collect();

    assert_eq!(&lines[..kept.len()], &kept[..]);
    let appended = &lines[kept.len()..];
    for (i, line) in appended.iter().enumerate() {
        assert!(!kept.contains(line));
        assert!(!appended[i + 1..].contains(line));
    }
});
