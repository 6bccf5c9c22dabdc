//! Wallet persistence
//!
//! Two seams:
//! - `SecureStorage` encrypts and decrypts blobs
//! - `WalletStorage` keeps opaque blobs under a string key
//!
//! `PasswordCipher` encrypts with AES-256-GCM under an Argon2id key derived
//! from a password. Blob format:
//! ```text
//! [Magic: 8 bytes "POPW0001"]
//! [Version: 1 byte]
//! [Salt: 16 bytes]
//! [Nonce: 12 bytes]
//! [Ciphertext + AEAD tag: variable]
//! ```

use super::WalletError;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Argon2, Params};
use async_trait::async_trait;
use rand::RngCore;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use zeroize::Zeroizing;

/// Magic header of encrypted wallet blobs
const MAGIC_HEADER: &[u8; 8] = b"POPW0001";

/// Current blob format version
const FORMAT_VERSION: u8 = 1;

const SALT_LEN: usize = 16;

const NONCE_LEN: usize = 12;

/// magic(8) + version(1) + salt(16) + nonce(12)
const HEADER_SIZE: usize = 8 + 1 + SALT_LEN + NONCE_LEN;

/// AES-GCM tag size
const TAG_LEN: usize = 16;

/// Default Argon2id memory cost in KiB
pub const DEFAULT_ARGON2_MEMORY_KIB: u32 = 19 * 1024;

/// Default Argon2id iterations
pub const DEFAULT_ARGON2_ITERATIONS: u32 = 2;

/// Encrypts wallet secrets before they reach storage
#[async_trait]
pub trait SecureStorage: Send + Sync {
    async fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, WalletError>;

    async fn decrypt(&self, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>, WalletError>;
}

/// Keeps opaque blobs under a key
#[async_trait]
pub trait WalletStorage: Send + Sync {
    /// `None` when nothing is stored under `key`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, WalletError>;

    /// Replace whatever is stored under `key`
    async fn put(&self, key: &str, blob: &[u8]) -> Result<(), WalletError>;

    /// Remove `key`; missing keys are not an error
    async fn delete(&self, key: &str) -> Result<(), WalletError>;
}

/// Password based AES-256-GCM cipher
///
/// Argon2id is CPU and memory heavy, so `encrypt`/`decrypt` run it on the
/// blocking pool.
#[derive(Clone)]
pub struct PasswordCipher {
    password: Zeroizing<String>,
    memory_kib: u32,
    iterations: u32,
}

impl PasswordCipher {
    pub fn new(password: &str) -> Self {
        Self::with_cost(password, DEFAULT_ARGON2_MEMORY_KIB, DEFAULT_ARGON2_ITERATIONS)
    }

    /// Custom Argon2id cost; low values are only meant for tests
    pub fn with_cost(password: &str, memory_kib: u32, iterations: u32) -> Self {
        PasswordCipher {
            password: Zeroizing::new(password.to_string()),
            memory_kib,
            iterations,
        }
    }

    fn derive_key(&self, salt: &[u8]) -> Result<Zeroizing<[u8; 32]>, WalletError> {
        let params = Params::new(self.memory_kib, self.iterations, 1, Some(32))
            .map_err(|e| WalletError::Cryptographic(format!("Invalid Argon2 params: {}", e)))?;
        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

        let mut key = Zeroizing::new([0u8; 32]);
        argon2
            .hash_password_into(self.password.as_bytes(), salt, &mut *key)
            .map_err(|e| WalletError::Cryptographic(format!("Key derivation failed: {}", e)))?;
        Ok(key)
    }

    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, WalletError> {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);

        let key = self.derive_key(&salt)?;
        let cipher = Aes256Gcm::new_from_slice(key.as_slice())
            .map_err(|e| WalletError::Cryptographic(format!("Invalid key: {}", e)))?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|e| WalletError::Cryptographic(format!("Encryption failed: {}", e)))?;

        let mut blob = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
        blob.extend_from_slice(MAGIC_HEADER);
        blob.push(FORMAT_VERSION);
        blob.extend_from_slice(&salt);
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    fn open(&self, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>, WalletError> {
        if blob.len() < 9 || &blob[0..8] != MAGIC_HEADER {
            return Err(WalletError::Cryptographic("Invalid blob header".to_string()));
        }

        let version = blob[8];
        if version != FORMAT_VERSION {
            return Err(WalletError::Cryptographic(format!(
                "Unsupported blob version: {}",
                version
            )));
        }

        if blob.len() < HEADER_SIZE + TAG_LEN {
            return Err(WalletError::Cryptographic("Truncated blob".to_string()));
        }

        let salt = &blob[9..9 + SALT_LEN];
        let nonce_bytes = &blob[9 + SALT_LEN..HEADER_SIZE];
        let ciphertext = &blob[HEADER_SIZE..];

        let key = self.derive_key(salt)?;
        let cipher = Aes256Gcm::new_from_slice(key.as_slice())
            .map_err(|e| WalletError::Cryptographic(format!("Invalid key: {}", e)))?;

        // Tag mismatch: wrong password or corrupted blob
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| WalletError::InvalidPassword)?;
        Ok(Zeroizing::new(plaintext))
    }
}

#[async_trait]
impl SecureStorage for PasswordCipher {
    async fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, WalletError> {
        let cipher = self.clone();
        let plaintext = Zeroizing::new(plaintext.to_vec());

        tokio::task::spawn_blocking(move || cipher.seal(&plaintext))
            .await
            .map_err(|e| WalletError::Cryptographic(format!("Encryption task failed: {}", e)))?
    }

    async fn decrypt(&self, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>, WalletError> {
        let cipher = self.clone();
        let blob = blob.to_vec();

        tokio::task::spawn_blocking(move || cipher.open(&blob))
            .await
            .map_err(|e| WalletError::Cryptographic(format!("Decryption task failed: {}", e)))?
    }
}

/// In-memory blob store (non-persistent, for tests)
#[derive(Clone, Default)]
pub struct MemoryWalletStorage {
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryWalletStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl WalletStorage for MemoryWalletStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, WalletError> {
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, blob: &[u8]) -> Result<(), WalletError> {
        self.blobs.write().await.insert(key.to_string(), blob.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), WalletError> {
        self.blobs.write().await.remove(key);
        Ok(())
    }
}

/// One file per blob under a base directory, written atomically
pub struct FileWalletStorage {
    base_path: PathBuf,
}

impl FileWalletStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, WalletError> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path).map_err(|e| {
            WalletError::Storage(format!("Failed to create wallet directory: {}", e))
        })?;
        Ok(FileWalletStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn blob_path(&self, key: &str) -> Result<PathBuf, WalletError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(WalletError::Storage(format!("Invalid storage key {:?}", key)));
        }
        Ok(self.base_path.join(format!("{}.blob", key)))
    }
}

#[async_trait]
impl WalletStorage for FileWalletStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, WalletError> {
        let path = self.blob_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WalletError::Storage(format!("Read failed: {}", e))),
        }
    }

    async fn put(&self, key: &str, blob: &[u8]) -> Result<(), WalletError> {
        let path = self.blob_path(key)?;
        let temp_path = path.with_extension("tmp");

        tokio::fs::write(&temp_path, blob)
            .await
            .map_err(|e| WalletError::Storage(format!("Write failed: {}", e)))?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| WalletError::Storage(format!("Atomic rename failed: {}", e)))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), WalletError> {
        let path = self.blob_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(WalletError::Storage(format!("Delete failed: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cipher(password: &str) -> PasswordCipher {
        PasswordCipher::with_cost(password, 64, 1)
    }

    #[tokio::test]
    async fn test_encrypt_decrypt() {
        let cipher = cipher("hunter2");
        let blob = cipher.encrypt(b"seed material").await.unwrap();
        assert_eq!(&blob[0..8], MAGIC_HEADER);
        assert_eq!(blob[8], FORMAT_VERSION);
        assert_eq!(cipher.decrypt(&blob).await.unwrap().as_slice(), b"seed material");
    }

    #[tokio::test]
    async fn test_each_encryption_is_salted() {
        let cipher = cipher("hunter2");
        let a = cipher.encrypt(b"same").await.unwrap();
        let b = cipher.encrypt(b"same").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let blob = cipher("right").encrypt(b"secret").await.unwrap();
        assert!(matches!(
            cipher("wrong").decrypt(&blob).await,
            Err(WalletError::InvalidPassword)
        ));
    }

    #[tokio::test]
    async fn test_tampered_blob() {
        let cipher = cipher("pw");
        let mut blob = cipher.encrypt(b"secret").await.unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0xff;
        assert!(cipher.decrypt(&blob).await.is_err());
    }

    #[tokio::test]
    async fn test_bad_header_and_truncation() {
        let cipher = cipher("pw");
        assert!(cipher.decrypt(b"short").await.is_err());
        assert!(cipher.decrypt(b"XXXXXXXX\x01rest-of-it").await.is_err());

        let blob = cipher.encrypt(b"secret").await.unwrap();
        assert!(cipher.decrypt(&blob[..HEADER_SIZE + 4]).await.is_err());

        let mut wrong_version = blob.clone();
        wrong_version[8] = 9;
        assert!(cipher.decrypt(&wrong_version).await.is_err());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_cipher_runs_off_the_executor() {
        let cipher = Arc::new(cipher("pw"));
        let tasks: Vec<_> = (0..4u8)
            .map(|i| {
                let cipher = cipher.clone();
                tokio::spawn(async move {
                    let blob = cipher.encrypt(&[i; 32]).await?;
                    cipher.decrypt(&blob).await
                })
            })
            .collect();

        for (i, task) in tasks.into_iter().enumerate() {
            let plaintext = task.await.unwrap().unwrap();
            assert_eq!(plaintext.as_slice(), &[i as u8; 32]);
        }
    }

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryWalletStorage::new();
        assert_eq!(storage.get("wallet.seed").await.unwrap(), None);

        storage.put("wallet.seed", b"blob").await.unwrap();
        assert_eq!(storage.get("wallet.seed").await.unwrap(), Some(b"blob".to_vec()));
        assert_eq!(storage.len().await, 1);

        storage.delete("wallet.seed").await.unwrap();
        storage.delete("wallet.seed").await.unwrap();
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_file_storage_roundtrip() {
        let dir = TempDir::new().unwrap();
        let storage = FileWalletStorage::new(dir.path()).unwrap();

        storage.put("wallet.seed", b"first").await.unwrap();
        storage.put("wallet.seed", b"second").await.unwrap();
        assert_eq!(storage.get("wallet.seed").await.unwrap(), Some(b"second".to_vec()));
        assert!(dir.path().join("wallet.seed.blob").exists());
        assert!(!dir.path().join("wallet.seed.tmp").exists());

        storage.delete("wallet.seed").await.unwrap();
        assert_eq!(storage.get("wallet.seed").await.unwrap(), None);
        storage.delete("wallet.seed").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_storage_rejects_path_keys() {
        let dir = TempDir::new().unwrap();
        let storage = FileWalletStorage::new(dir.path()).unwrap();
        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(storage.put(key, b"x").await.is_err(), "accepted {:?}", key);
        }
    }
}
