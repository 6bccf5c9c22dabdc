#![no_main]

use libfuzzer_sys::fuzz_target;
use popstellar_core::core_codec::{decode, encode};

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        // Whatever decodes must re-encode to the exact same text
        if let Ok(bytes) = decode(text) {
            assert_eq!(encode(&bytes), text);
        }
    }
});
