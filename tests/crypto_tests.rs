use age::secrecy::ExposeSecret;
use age::x25519;
use offjournal::crypto::{AgeCipher, FileCipher};
use offjournal::errors::ErrorKind;
use offjournal::EntryStore;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

use test_helpers::base_offjournal_command;

fn keypair() -> (String, String) {
    let identity = x25519::Identity::generate();
    (
        identity.to_public().to_string(),
        identity.to_string().expose_secret().to_string(),
    )
}

#[test]
fn test_encrypt_decrypt_entry_restores_bytes() {
    let temp_dir = tempdir().unwrap();
    let entries = EntryStore::new(temp_dir.path().join("entries"));
    let meta = entries.create("Segredo").unwrap();
    let path = entries.path_of(&meta.id).unwrap();
    let original = fs::read(&path).unwrap();
    let (recipient, secret) = keypair();
    let cipher = AgeCipher::new();

    let encrypted = cipher.encrypt(&path, &recipient).unwrap();
    fs::remove_file(&path).unwrap();
    let decrypted = cipher.decrypt(&encrypted.output_path, &secret).unwrap();

    assert_eq!(decrypted.output_path, path);
    assert_eq!(fs::read(&path).unwrap(), original);
}

#[test]
fn test_encrypted_copy_is_not_listed_as_entry() {
    let temp_dir = tempdir().unwrap();
    let entries = EntryStore::new(temp_dir.path().join("entries"));
    let meta = entries.create("Segredo").unwrap();
    let (recipient, _) = keypair();

    AgeCipher::new()
        .encrypt(&entries.path_of(&meta.id).unwrap(), &recipient)
        .unwrap();

    assert_eq!(entries.list().unwrap().len(), 1);
}

#[test]
fn test_decrypt_requires_age_extension() {
    let temp_dir = tempdir().unwrap();
    let plain = temp_dir.path().join("nota.txt");
    fs::write(&plain, "texto").unwrap();
    let (_, secret) = keypair();

    let err = AgeCipher::new().decrypt(&plain, &secret).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Crypto);
}

#[test]
fn test_cli_encrypt_and_decrypt() {
    let temp_dir = tempdir().unwrap();
    let data_dir = temp_dir.path().join("data");
    let file = temp_dir.path().join("diario.md");
    fs::write(&file, "# Diário\n\nNinguém deve ler.\n").unwrap();
    let (recipient, secret) = keypair();
    let key_file = temp_dir.path().join("identity.txt");
    fs::write(&key_file, format!("{}\n", secret)).unwrap();

    base_offjournal_command(&data_dir)
        .args(["encrypt", file.to_str().unwrap(), "--recipient", &recipient])
        .assert()
        .success()
        .stdout(predicate::str::contains("diario.md.age"));
    fs::remove_file(&file).unwrap();

    let encrypted = temp_dir.path().join("diario.md.age");
    base_offjournal_command(&data_dir)
        .args([
            "decrypt",
            encrypted.to_str().unwrap(),
            "--identity",
            key_file.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "# Diário\n\nNinguém deve ler.\n"
    );
}

#[test]
fn test_cli_invalid_recipient() {
    let temp_dir = tempdir().unwrap();
    let file = temp_dir.path().join("nota.txt");
    fs::write(&file, "texto").unwrap();

    base_offjournal_command(temp_dir.path())
        .args(["encrypt", file.to_str().unwrap(), "--recipient", "bob@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error [crypto]"));
    assert!(!temp_dir.path().join("nota.txt.age").exists());
}
