#![no_main]

use libfuzzer_sys::fuzz_target;
use once_cell::sync::Lazy;
use popstellar_core::core_protocol::{
    ProtocolResponse, ProtocolSchemas, ResponseBody, DEFAULT_MAX_FRAME_BYTES,
};

static SCHEMAS: Lazy<Option<ProtocolSchemas>> =
    Lazy::new(|| ProtocolSchemas::new(DEFAULT_MAX_FRAME_BYTES).ok());

fuzz_target!(|data: &[u8]| {
    let (Ok(raw), Some(schemas)) = (std::str::from_utf8(data), SCHEMAS.as_ref()) else {
        return;
    };

    if let Ok(response) = ProtocolResponse::parse(raw, schemas) {
        if let ResponseBody::Error(error) = response.body() {
            assert!((-6..=-1).contains(&error.code.code()));
        }
        let json = response.to_json().expect("accepted response serializes");
        assert_eq!(ProtocolResponse::parse(&json, schemas).ok(), Some(response));
    }
});
