#![no_main]

use libfuzzer_sys::fuzz_target;
use popstellar_core::core_wallet::{PasswordCipher, SecureStorage};

fuzz_target!(|data: &[u8]| {
    // Tampered or truncated blobs must fail cleanly, never panic
    let cipher = PasswordCipher::with_cost("fuzz_passphrase", 8, 1);
    let runtime = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(runtime) => runtime,
        Err(_) => return,
    };
    let _ = runtime.block_on(cipher.decrypt(data));
});
