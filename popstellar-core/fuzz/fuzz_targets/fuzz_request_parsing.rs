#![no_main]

use libfuzzer_sys::fuzz_target;
use once_cell::sync::Lazy;
use popstellar_core::core_protocol::{ProtocolRequest, ProtocolSchemas, DEFAULT_MAX_FRAME_BYTES};

static SCHEMAS: Lazy<Option<ProtocolSchemas>> =
    Lazy::new(|| ProtocolSchemas::new(DEFAULT_MAX_FRAME_BYTES).ok());

fuzz_target!(|data: &[u8]| {
    let (Ok(raw), Some(schemas)) = (std::str::from_utf8(data), SCHEMAS.as_ref()) else {
        return;
    };

    if let Ok(request) = ProtocolRequest::parse(raw, schemas) {
        // Accepted frames are well formed, so their envelopes can be checked
        if let Some(message) = request.message() {
            let _ = message.verify();
        }
        let json = request.to_json().expect("accepted request serializes");
        assert!(ProtocolRequest::parse(&json, schemas).is_ok());
    }
});
