//! age implementation of [`FileCipher`].
//!
//! Recipients are x25519 public keys (`age1...`). Identities are x25519 secret
//! keys (`AGE-SECRET-KEY-1...`), given inline or as the path of an identity
//! file such as the one `age-keygen` writes. Both directions stream, so large
//! attachments are never held in memory.

use super::{decrypted_path, encrypted_path, require_input, CipherOutcome, FileCipher};
use crate::errors::{AppError, AppResult, CryptoError};
use crate::storage;
use age::x25519;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::iter;
use std::path::Path;
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::{debug, info};

const SECRET_KEY_PREFIX: &str = "AGE-SECRET-KEY-";

/// Streams files through age with x25519 keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgeCipher;

impl AgeCipher {
    /// Creates the cipher.
    pub fn new() -> Self {
        AgeCipher
    }
}

impl FileCipher for AgeCipher {
    fn encrypt(&self, path: &Path, recipient: &str) -> AppResult<CipherOutcome> {
        require_input(path)?;
        let recipient = parse_recipient(recipient)?;
        let output_path = encrypted_path(path);

        let encryptor = age::Encryptor::with_recipients(vec![Box::new(recipient)])
            .ok_or_else(|| CryptoError::InvalidRecipient(String::new()))?;

        let mut input = File::open(path)
            .map_err(|e| AppError::io_context("Failed to open file for encryption", e))?;
        let staged = stage_next_to(&output_path)?;
        let mut writer = encryptor
            .wrap_output(BufWriter::new(staged))
            .map_err(CryptoError::EncryptorSetupFailed)?;
        io::copy(&mut input, &mut writer).map_err(CryptoError::EncryptionFailed)?;
        let staged = writer
            .finish()
            .and_then(|buffered| buffered.into_inner().map_err(|e| e.into_error()))
            .map_err(CryptoError::EncryptionFailed)?;
        publish(staged, &output_path)?;

        info!("Encrypted {} to {}", path.display(), output_path.display());
        Ok(CipherOutcome {
            message: format!("Arquivo criptografado com sucesso em {}", output_path.display()),
            output_path,
        })
    }

    fn decrypt(&self, path: &Path, identity: &str) -> AppResult<CipherOutcome> {
        let output_path = decrypted_path(path)?;
        require_input(path)?;
        let identity = parse_identity(identity)?;

        let input = File::open(path)
            .map_err(|e| AppError::io_context("Failed to open file for decryption", e))?;
        let decryptor =
            age::Decryptor::new(BufReader::new(input)).map_err(CryptoError::DecryptionFailed)?;
        let mut reader = match decryptor {
            age::Decryptor::Recipients(decryptor) => decryptor
                .decrypt(iter::once(&identity as &dyn age::Identity))
                .map_err(CryptoError::DecryptionFailed)?,
            _ => return Err(CryptoError::UnsupportedFormat.into()),
        };

        let mut staged = stage_next_to(&output_path)?;
        // age reports payload authentication failures as InvalidData.
        io::copy(&mut reader, &mut staged).map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => AppError::from(CryptoError::PayloadCorrupted(e)),
            _ => AppError::io_context("Failed to decrypt payload", e),
        })?;
        publish(staged, &output_path)?;

        info!("Decrypted {} to {}", path.display(), output_path.display());
        Ok(CipherOutcome {
            message: format!(
                "Arquivo descriptografado com sucesso em {}",
                output_path.display()
            ),
            output_path,
        })
    }
}

fn parse_recipient(recipient: &str) -> AppResult<x25519::Recipient> {
    let recipient = recipient.trim();
    x25519::Recipient::from_str(recipient)
        .map_err(|_| CryptoError::InvalidRecipient(recipient.to_string()).into())
}

/// Accepts an inline secret key or the path of a file that contains one.
fn parse_identity(identity: &str) -> AppResult<x25519::Identity> {
    let identity = identity.trim();
    if identity.starts_with(SECRET_KEY_PREFIX) {
        return x25519::Identity::from_str(identity).map_err(|_| {
            CryptoError::InvalidIdentity("inline secret key is malformed".to_string()).into()
        });
    }

    let contents = fs::read_to_string(identity).map_err(|e| {
        CryptoError::InvalidIdentity(format!("cannot read identity file {}: {}", identity, e))
    })?;
    let key = contents
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(SECRET_KEY_PREFIX))
        .ok_or_else(|| {
            CryptoError::InvalidIdentity(format!("no secret key found in {}", identity))
        })?;
    debug!("Loaded identity from {}", identity);
    x25519::Identity::from_str(key).map_err(|_| {
        CryptoError::InvalidIdentity(format!("secret key in {} is malformed", identity)).into()
    })
}

/// Temp file in the destination's directory, so the final rename stays on one
/// filesystem.
fn stage_next_to(destination: &Path) -> AppResult<NamedTempFile> {
    let parent = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    NamedTempFile::new_in(parent)
        .map_err(|e| AppError::io_context("Failed to create temporary file", e))
}

fn publish(mut staged: NamedTempFile, destination: &Path) -> AppResult<()> {
    staged
        .flush()
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|e| AppError::io_context("Failed to flush output", e))?;
    storage::restrict_file_permissions(staged.as_file())?;
    staged
        .persist(destination)
        .map_err(|e| AppError::io_context("Failed to replace output file", e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use age::secrecy::ExposeSecret;
    use tempfile::tempdir;

    fn keypair() -> (String, String) {
        let identity = x25519::Identity::generate();
        let recipient = identity.to_public().to_string();
        let secret = identity.to_string().expose_secret().to_string();
        (recipient, secret)
    }

    #[test]
    fn test_roundtrip_restores_identical_bytes() {
        let temp = tempdir().expect("Failed to create temporary directory");
        let source = temp.path().join("20250715100000_Dia.md");
        let original = "# Dia\n\nConteúdo secreto com acentuação.\n".repeat(200);
        fs::write(&source, &original).unwrap();
        let (recipient, secret) = keypair();
        let cipher = AgeCipher::new();

        let encrypted = cipher.encrypt(&source, &recipient).unwrap();
        assert_eq!(encrypted.output_path, temp.path().join("20250715100000_Dia.md.age"));
        assert_ne!(fs::read(&encrypted.output_path).unwrap(), original.as_bytes());

        fs::remove_file(&source).unwrap();
        let decrypted = cipher.decrypt(&encrypted.output_path, &secret).unwrap();
        assert_eq!(decrypted.output_path, source);
        assert_eq!(fs::read_to_string(&source).unwrap(), original);
    }

    #[test]
    fn test_identity_file_is_accepted() {
        let temp = tempdir().expect("Failed to create temporary directory");
        let source = temp.path().join("nota.txt");
        fs::write(&source, b"conteudo").unwrap();
        let (recipient, secret) = keypair();
        let key_file = temp.path().join("key.txt");
        fs::write(
            &key_file,
            format!("# created: 2025-07-15\n# public key: {}\n{}\n", recipient, secret),
        )
        .unwrap();
        let cipher = AgeCipher::new();

        let encrypted = cipher.encrypt(&source, &recipient).unwrap();
        fs::remove_file(&source).unwrap();
        cipher
            .decrypt(&encrypted.output_path, key_file.to_str().unwrap())
            .unwrap();
        assert_eq!(fs::read(&source).unwrap(), b"conteudo");
    }

    #[test]
    fn test_wrong_identity_fails() {
        let temp = tempdir().expect("Failed to create temporary directory");
        let source = temp.path().join("nota.txt");
        fs::write(&source, b"conteudo").unwrap();
        let (recipient, _) = keypair();
        let (_, other_secret) = keypair();
        let cipher = AgeCipher::new();

        let encrypted = cipher.encrypt(&source, &recipient).unwrap();
        let err = cipher
            .decrypt(&encrypted.output_path, &other_secret)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
        assert_eq!(fs::read(&source).unwrap(), b"conteudo");
    }

    #[test]
    fn test_tampered_payload_is_a_crypto_error() {
        let temp = tempdir().expect("Failed to create temporary directory");
        let source = temp.path().join("nota.txt");
        fs::write(&source, b"conteudo original").unwrap();
        let (recipient, secret) = keypair();
        let cipher = AgeCipher::new();

        let encrypted = cipher.encrypt(&source, &recipient).unwrap();
        let mut bytes = fs::read(&encrypted.output_path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        fs::write(&encrypted.output_path, &bytes).unwrap();

        let err = cipher.decrypt(&encrypted.output_path, &secret).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
        assert!(matches!(
            err,
            AppError::Crypto(CryptoError::PayloadCorrupted(_))
        ));
        assert_eq!(fs::read(&source).unwrap(), b"conteudo original");
    }

    #[test]
    fn test_invalid_inputs() {
        let temp = tempdir().expect("Failed to create temporary directory");
        let source = temp.path().join("nota.txt");
        fs::write(&source, b"conteudo").unwrap();
        let (recipient, secret) = keypair();
        let cipher = AgeCipher::new();

        assert_eq!(
            cipher
                .encrypt(&temp.path().join("missing.txt"), &recipient)
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            cipher.encrypt(&source, "not-a-recipient").unwrap_err().kind(),
            ErrorKind::Crypto
        );
        assert_eq!(
            cipher.decrypt(&source, &secret).unwrap_err().kind(),
            ErrorKind::Crypto
        );
        assert_eq!(
            cipher
                .decrypt(&temp.path().join("missing.txt.age"), &secret)
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
        assert!(!temp.path().join("nota.txt.age").exists());
    }

    #[test]
    fn test_malformed_identity() {
        let temp = tempdir().expect("Failed to create temporary directory");
        let source = temp.path().join("nota.txt");
        fs::write(&source, b"conteudo").unwrap();
        let (recipient, _) = keypair();
        let cipher = AgeCipher::new();
        let encrypted = cipher.encrypt(&source, &recipient).unwrap();

        let missing_file = temp.path().join("no-key.txt");
        for identity in ["AGE-SECRET-KEY-1BROKEN", missing_file.to_str().unwrap()] {
            let err = cipher
                .decrypt(&encrypted.output_path, identity)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Crypto);
        }
    }
}
