//! Decoding of `encrypted:<base64>` secret values.
//!
//! Values are ECIES ciphertexts (secp256k1) in the dotenvx layout. Candidate
//! private keys come from `DOTENV_PRIVATE_KEY*` variables as hex strings.

use crate::error::ConfigError;
use crate::secret::ENCRYPTED_PREFIX;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Decrypt `text` if it carries the [`ENCRYPTED_PREFIX`].
///
/// Returns `Ok(None)` for values that are not encrypted. Keys that fail to
/// decode or decrypt are skipped; the first success wins.
pub fn decrypt_secret(
    path: &str,
    text: &str,
    private_keys: &[String],
) -> Result<Option<String>, ConfigError> {
    let Some(encoded) = text.strip_prefix(ENCRYPTED_PREFIX) else {
        return Ok(None);
    };
    let failed = || ConfigError::SecretDecryptionFailed {
        path: path.to_string(),
    };
    let ciphertext = STANDARD.decode(encoded.trim()).map_err(|_| failed())?;

    for (index, key) in private_keys.iter().enumerate() {
        let Ok(secret_key) = hex::decode(key) else {
            tracing::debug!(path, candidate = index, "skipping private key that is not hex");
            continue;
        };
        match ecies::decrypt(&secret_key, &ciphertext) {
            Ok(plain) => match String::from_utf8(plain) {
                Ok(value) => return Ok(Some(value)),
                Err(_) => tracing::debug!(path, candidate = index, "decrypted secret is not UTF-8"),
            },
            Err(_) => tracing::debug!(path, candidate = index, "private key did not decrypt secret"),
        }
    }
    Err(failed())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encrypt_with_new_key(message: &str) -> (String, String) {
        let (secret_key, public_key) = ecies::utils::generate_keypair();
        let ciphertext =
            ecies::encrypt(&public_key.serialize(), message.as_bytes()).expect("encrypts");
        (
            hex::encode(secret_key.serialize()),
            format!("{ENCRYPTED_PREFIX}{}", STANDARD.encode(ciphertext)),
        )
    }

    #[test]
    fn plain_values_pass_through() {
        assert_eq!(decrypt_secret("auth.jwt_secret", "value", &[]), Ok(None));
    }

    #[test]
    fn first_working_key_wins() {
        let (key, value) = encrypt_with_new_key("s3cret");
        let (other_key, _) = encrypt_with_new_key("unused");
        let keys = vec!["not-hex".to_string(), other_key, key];
        assert_eq!(
            decrypt_secret("auth.jwt_secret", &value, &keys),
            Ok(Some("s3cret".to_string()))
        );
    }

    #[test]
    fn no_working_key_names_the_path() {
        let (_, value) = encrypt_with_new_key("s3cret");
        let (other_key, _) = encrypt_with_new_key("unused");
        assert_eq!(
            decrypt_secret("auth.email.smtp.pass", &value, &[other_key]),
            Err(ConfigError::SecretDecryptionFailed {
                path: "auth.email.smtp.pass".to_string()
            })
        );
    }
}
