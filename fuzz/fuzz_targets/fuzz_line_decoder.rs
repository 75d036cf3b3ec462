//! Fuzz target: `LineDecoder::feed`
//!
//! Drives arbitrary byte sequences from a gate controller into the
//! streaming line decoder and asserts that it never panics and only ever
//! yields trimmed, non-empty tokens that fit a line.
//!
//! cargo fuzz run fuzz_line_decoder

#![no_main]

use gatekeeper::serial::codec::{LineDecoder, MAX_LINE};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = LineDecoder::new();

    // Split at the first byte's value so chunk boundaries vary too.
    let cut = data.first().map_or(0, |b| usize::from(*b)).min(data.len());
    let (head, tail) = data.split_at(cut);

    for chunk in [head, tail] {
        if let Some(token) = decoder.feed(chunk) {
            let text = token.as_str();
            assert!(!text.is_empty(), "decoder must not yield an empty token");
            assert!(text.len() <= MAX_LINE, "token exceeds MAX_LINE");
            assert_eq!(text, text.trim(), "token must be trimmed");
        }
    }

    // After a reset the decoder must accept bytes cleanly again.
    decoder.reset();
    let _ = decoder.feed(data);
});
