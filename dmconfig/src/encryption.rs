//! Machine-bound encryption for secrets stored in `config.yaml`
//!
//! Values written as `encrypted:BASE64` are decrypted transparently by
//! [`get_secret`]. The AES-256-GCM key is derived from the machine id, so an
//! encrypted config file only works on the host that produced it.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use anyhow::{anyhow, Result};
use base64::Engine;
use sha2::{Digest, Sha256};

const ENCRYPTED_PREFIX: &str = "encrypted:";
const NONCE_LEN: usize = 12;

fn machine_id() -> Result<String> {
    #[cfg(target_os = "linux")]
    {
        for candidate in ["/etc/machine-id", "/var/lib/dbus/machine-id"] {
            if let Ok(id) = std::fs::read_to_string(candidate) {
                let id = id.trim();
                if !id.is_empty() {
                    return Ok(id.to_string());
                }
            }
        }
        Err(anyhow!("Failed to read machine-id"))
    }

    #[cfg(target_os = "macos")]
    {
        let output = std::process::Command::new("ioreg")
            .args(["-d2", "-c", "IOPlatformExpertDevice"])
            .output()?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .find(|line| line.contains("IOPlatformUUID"))
            .and_then(|line| line.split('"').nth(3))
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Failed to extract IOPlatformUUID from ioreg"))
    }

    #[cfg(target_os = "windows")]
    {
        let output = std::process::Command::new("wmic")
            .args(["csproduct", "get", "UUID"])
            .output()?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .nth(1)
            .map(|line| line.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| anyhow!("Failed to extract UUID from wmic"))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        Err(anyhow!("Unsupported platform for machine id extraction"))
    }
}

fn cipher() -> Result<Aes256Gcm> {
    let mut hasher = Sha256::new();
    hasher.update(machine_id()?.as_bytes());
    hasher.update(b"dismusic-secret-v1");
    let key = hasher.finalize();
    Aes256Gcm::new_from_slice(&key).map_err(|e| anyhow!("Failed to create cipher: {}", e))
}

/// Encrypts `secret` into the `encrypted:BASE64(nonce || ciphertext)` form.
///
/// The nonce is derived from the secret itself so that re-encrypting an
/// unchanged secret yields the same string and leaves `config.yaml` untouched.
pub fn encrypt_secret(secret: &str) -> Result<String> {
    let cipher = cipher()?;

    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b"dismusic-nonce-v1");
    let digest = hasher.finalize();
    let nonce_bytes = &digest[..NONCE_LEN];

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(nonce_bytes), secret.as_bytes())
        .map_err(|e| anyhow!("Encryption failed: {}", e))?;

    let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    combined.extend_from_slice(nonce_bytes);
    combined.extend_from_slice(&ciphertext);

    Ok(format!(
        "{}{}",
        ENCRYPTED_PREFIX,
        base64::engine::general_purpose::STANDARD.encode(&combined)
    ))
}

/// Decrypts a value produced by [`encrypt_secret`].
pub fn decrypt_secret(encrypted: &str) -> Result<String> {
    let encoded = encrypted
        .strip_prefix(ENCRYPTED_PREFIX)
        .ok_or_else(|| anyhow!("Invalid encrypted secret format (missing prefix)"))?;

    let combined = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| anyhow!("Invalid base64: {}", e))?;
    if combined.len() < NONCE_LEN {
        return Err(anyhow!("Invalid ciphertext (too short)"));
    }
    let (nonce, ciphertext) = combined.split_at(NONCE_LEN);

    let plaintext = cipher()?
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|e| anyhow!("Decryption failed (wrong machine or corrupted data): {}", e))?;

    String::from_utf8(plaintext).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
}

pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(ENCRYPTED_PREFIX)
}

/// Returns the plain secret whether `value` is encrypted or not.
pub fn get_secret(value: &str) -> Result<String> {
    if is_encrypted(value) {
        decrypt_secret(value)
    } else {
        Ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_encrypted() {
        assert!(is_encrypted("encrypted:SGVsbG8="));
        assert!(!is_encrypted("plaintext"));
        assert!(!is_encrypted(""));
    }

    #[test]
    fn test_plain_secret_passthrough() {
        assert_eq!(get_secret("abc123").unwrap(), "abc123");
    }

    #[test]
    fn test_malformed_encrypted_value() {
        assert!(decrypt_secret("encrypted:!!!").is_err());
        assert!(decrypt_secret("encrypted:AAAA").is_err());
        assert!(decrypt_secret("no-prefix").is_err());
    }

    #[test]
    fn test_roundtrip_when_machine_id_available() {
        if machine_id().is_err() {
            return;
        }
        let encrypted = encrypt_secret("client-secret").unwrap();
        assert!(is_encrypted(&encrypted));
        assert_eq!(encrypt_secret("client-secret").unwrap(), encrypted);
        assert_eq!(get_secret(&encrypted).unwrap(), "client-secret");
    }
}
