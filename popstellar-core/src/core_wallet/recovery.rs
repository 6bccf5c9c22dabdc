//! Batch token recovery
//!
//! Rebuilds the tokens of many roll calls at once, e.g. after importing a
//! mnemonic. Derivation is CPU bound, so it runs on a dedicated rayon pool
//! with a fixed number of workers.

use super::derivation::derive_key_pair;
use super::mnemonic::RootSeed;
use super::WalletError;
use crate::core_codec::Hash;
use crate::core_message::KeyPair;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Identifies the token of one roll call
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenKey {
    pub lao_id: Hash,
    pub roll_call_id: Hash,
}

impl TokenKey {
    pub fn new(lao_id: Hash, roll_call_id: Hash) -> Self {
        TokenKey {
            lao_id,
            roll_call_id,
        }
    }
}

/// Derive the token of every `(lao_id, roll_call_id)` pair
///
/// Duplicate pairs collapse into one entry. Fails on the first derivation
/// error.
pub fn recover_all(
    seed: &RootSeed,
    pairs: &[TokenKey],
    workers: usize,
) -> Result<HashMap<TokenKey, KeyPair>, WalletError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("token-recovery-{}", i))
        .build()
        .map_err(|e| WalletError::Derivation(format!("Failed to start recovery pool: {}", e)))?;

    let recovered = pool.install(|| {
        pairs
            .par_iter()
            .map(|key| {
                derive_key_pair(seed.as_bytes(), &key.lao_id, &key.roll_call_id)
                    .map(|keys| (key.clone(), keys))
            })
            .collect::<Result<HashMap<_, _>, _>>()
    })?;

    debug!(
        requested = pairs.len(),
        recovered = recovered.len(),
        workers,
        "Recovered tokens"
    );
    Ok(recovered)
}
