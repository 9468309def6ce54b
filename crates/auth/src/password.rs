//! Password hashing, verification and the account password policy.
//!
//! Hashes use Argon2id and are stored in PHC-like form:
//! `$argon2id$v=19$m=<memory>,t=<time>,p=<lanes>$<salt_b64>$<hash_b64>`.

use argon2::{Algorithm, Argon2, Params, Version};
use base64::prelude::*;
use rand::{rng, RngCore};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Minimum accepted password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum accepted password length in characters.
pub const MAX_PASSWORD_LENGTH: usize = 256;

/// Frequently used passwords rejected outright. Compared case-insensitively.
const COMMON_PASSWORDS: &[&str] = &[
    "123456", "12345678", "123456789", "1234567890", "password", "password1", "password123", "passw0rd",
    "qwerty", "qwerty123", "qwertyuiop", "abc123", "abcd1234", "111111", "000000", "iloveyou", "admin",
    "admin123", "welcome", "welcome1", "letmein", "monkey", "dragon", "football", "baseball", "master",
    "sunshine", "princess", "trustno1", "superman", "starwars", "whatever", "1q2w3e4r", "zaq12wsx",
    "changeme", "secret", "login", "access", "shadow", "michael",
];

/// Errors that can occur during password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Hashing failed: {0}")]
    HashingFailed(String),

    #[error("Verification failed: password does not match")]
    VerificationFailed,

    #[error("Invalid hash format")]
    InvalidHashFormat,

    #[error("Base64 decoding failed: {0}")]
    DecodingFailed(#[from] base64::DecodeError),
}

/// Configuration for Argon2id password hashing.
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    /// Memory cost in KiB (default: 15 MiB = 15360 KiB)
    pub memory_cost: u32,
    /// Number of iterations (default: 3)
    pub time_cost:   u32,
    /// Number of lanes (default: 2)
    pub parallelism: u32,
    /// Length of the generated hash in bytes
    pub hash_length: u32,
    /// Length of the salt in bytes
    pub salt_length: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_cost: 15360,
            time_cost:   3,
            parallelism: 2,
            hash_length: 32,
            salt_length: 16,
        }
    }
}

fn hasher(memory_cost: u32, time_cost: u32, parallelism: u32, output_len: usize) -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(memory_cost, time_cost, parallelism, Some(output_len))
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password using Argon2id.
///
/// # Arguments
///
/// * `password` - The password to hash
/// * `config` - Optional configuration for Argon2id parameters
///
/// # Example
///
/// ```
/// use auth::password::hash_password;
/// use secrecy::SecretString;
///
/// let password = SecretString::from("correct horse battery staple".to_string());
/// let hash = hash_password(&password, None).unwrap();
/// ```
pub fn hash_password(password: &SecretString, config: Option<PasswordConfig>) -> Result<SecretString, PasswordError> {
    let config = config.unwrap_or_default();

    let mut salt = vec![0u8; config.salt_length as usize];
    rng().fill_bytes(&mut salt);

    let mut output = vec![0u8; config.hash_length as usize];
    hasher(
        config.memory_cost,
        config.time_cost,
        config.parallelism,
        output.len(),
    )?
    .hash_password_into(password.expose_secret().as_bytes(), &salt, &mut output)
    .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(SecretString::from(format!(
        "$argon2id$v=19$m={},t={},p={}${}${}",
        config.memory_cost,
        config.time_cost,
        config.parallelism,
        BASE64_STANDARD.encode(&salt),
        BASE64_STANDARD.encode(&output)
    )))
}

/// Cost parameters parsed from the `m=..,t=..,p=..` segment of a stored hash.
fn parse_params(segment: &str) -> Result<(u32, u32, u32), PasswordError> {
    let mut memory = None;
    let mut time = None;
    let mut lanes = None;

    for pair in segment.split(',') {
        let (key, value) = pair.split_once('=').ok_or(PasswordError::InvalidHashFormat)?;
        let value = value.parse::<u32>().map_err(|_| PasswordError::InvalidHashFormat)?;
        match key {
            "m" => memory = Some(value),
            "t" => time = Some(value),
            "p" => lanes = Some(value),
            _ => return Err(PasswordError::InvalidHashFormat),
        }
    }

    match (memory, time, lanes) {
        (Some(m), Some(t), Some(p)) => Ok((m, t, p)),
        _ => Err(PasswordError::InvalidHashFormat),
    }
}

/// Verifies a password against a stored hash in constant time.
///
/// # Example
///
/// ```
/// use auth::password::{hash_password, verify_password};
/// use secrecy::{ExposeSecret, SecretString};
///
/// let password = SecretString::from("correct horse battery staple".to_string());
/// let hash = hash_password(&password, None).unwrap();
///
/// assert!(verify_password(&password, hash.expose_secret()).is_ok());
/// ```
pub fn verify_password(password: &SecretString, expected_hash: &str) -> Result<(), PasswordError> {
    // ["", "argon2id", "v=19", "m=..,t=..,p=..", salt, hash]
    let parts: Vec<&str> = expected_hash.split('$').collect();
    let [empty, algorithm, version, params, salt_b64, hash_b64] = parts.as_slice()
    else {
        return Err(PasswordError::InvalidHashFormat);
    };
    if !empty.is_empty() || *algorithm != "argon2id" || *version != "v=19" {
        return Err(PasswordError::InvalidHashFormat);
    }

    let (memory_cost, time_cost, parallelism) = parse_params(params)?;
    let salt = BASE64_STANDARD.decode(salt_b64)?;
    let stored_hash = BASE64_STANDARD.decode(hash_b64)?;

    let mut computed_hash = vec![0u8; stored_hash.len()];
    hasher(memory_cost, time_cost, parallelism, stored_hash.len())?
        .hash_password_into(
            password.expose_secret().as_bytes(),
            &salt,
            &mut computed_hash,
        )
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    if computed_hash.as_slice().ct_eq(&stored_hash).into() {
        Ok(())
    }
    else {
        Err(PasswordError::VerificationFailed)
    }
}

/// Account attributes a password must not resemble.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordContext<'a> {
    pub username:   Option<&'a str>,
    pub email:      Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name:  Option<&'a str>,
}

/// Errors for password validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordValidationError {
    #[error("This password is too short. It must contain at least 8 characters.")]
    TooShort,

    #[error("This password is too long. It must contain at most 256 characters.")]
    TooLong,

    #[error("This password is too common.")]
    TooCommon,

    #[error("This password is entirely numeric.")]
    EntirelyNumeric,

    #[error("The password is too similar to the {0}.")]
    TooSimilar(&'static str),
}

/// Whether `password` is close enough to an account attribute to be guessable.
///
/// The attribute is split on non-alphanumeric characters (so `jane.doe@corp.io`
/// yields `jane`, `doe`, `corp`, `io`); any part of four or more characters
/// contained in the password, or the whole password contained in the
/// attribute, counts as similar.
fn is_similar(password: &str, attribute: &str) -> bool {
    let attribute = attribute.to_lowercase();
    if attribute.is_empty() {
        return false;
    }
    if attribute.contains(password) {
        return true;
    }

    attribute
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| part.chars().count() >= 4)
        .any(|part| password.contains(part))
}

/// Checks a candidate password against the account password policy.
///
/// # Arguments
///
/// * `password` - The candidate password
/// * `context` - Account attributes the password must not resemble
///
/// # Returns
///
/// Every violated rule, so the client can show them all at once.
pub fn validate_password(password: &str, context: &PasswordContext<'_>) -> Result<(), Vec<PasswordValidationError>> {
    let mut errors = Vec::new();
    let length = password.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        errors.push(PasswordValidationError::TooShort);
    }
    if length > MAX_PASSWORD_LENGTH {
        errors.push(PasswordValidationError::TooLong);
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        errors.push(PasswordValidationError::TooCommon);
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.push(PasswordValidationError::EntirelyNumeric);
    }

    let attributes = [
        ("username", context.username),
        ("email address", context.email),
        ("first name", context.first_name),
        ("last name", context.last_name),
    ];
    if let Some((name, _)) = attributes
        .into_iter()
        .find(|(_, value)| value.is_some_and(|value| is_similar(&lowered, value)))
    {
        errors.push(PasswordValidationError::TooSimilar(name));
    }

    if errors.is_empty() {
        Ok(())
    }
    else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> Option<PasswordConfig> {
        Some(PasswordConfig {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
            ..PasswordConfig::default()
        })
    }

    #[test]
    fn test_hash_and_verify() {
        let password = SecretString::from("Blue-Harbor-42".to_string());
        let hash = hash_password(&password, fast()).unwrap();
        assert!(hash.expose_secret().starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
        assert!(verify_password(&password, hash.expose_secret()).is_ok());
    }

    #[test]
    fn test_wrong_password_fails() {
        let hash = hash_password(&SecretString::from("Blue-Harbor-42".to_string()), fast()).unwrap();
        let result = verify_password(
            &SecretString::from("Red-Harbor-42".to_string()),
            hash.expose_secret(),
        );
        assert!(matches!(result, Err(PasswordError::VerificationFailed)));
    }

    #[test]
    fn test_malformed_hash_is_rejected() {
        let password = SecretString::from("whatever".to_string());
        assert!(matches!(
            verify_password(&password, "plain-text"),
            Err(PasswordError::InvalidHashFormat)
        ));
        assert!(matches!(
            verify_password(&password, "$argon2i$v=19$m=1,t=1,p=1$AAAA$AAAA"),
            Err(PasswordError::InvalidHashFormat)
        ));
        assert!(matches!(
            verify_password(&password, "$argon2id$v=19$m=1,t=1$AAAA$AAAA"),
            Err(PasswordError::InvalidHashFormat)
        ));
    }

    #[test]
    fn test_policy_accepts_reasonable_password() {
        assert!(validate_password("Blue-Harbor-42", &PasswordContext::default()).is_ok());
    }

    #[test]
    fn test_policy_rejects_short_and_numeric() {
        let errors = validate_password("1234", &PasswordContext::default()).unwrap_err();
        assert!(errors.contains(&PasswordValidationError::TooShort));
        assert!(errors.contains(&PasswordValidationError::EntirelyNumeric));
    }

    #[test]
    fn test_policy_rejects_common() {
        let errors = validate_password("Password123", &PasswordContext::default()).unwrap_err();
        assert_eq!(errors, vec![PasswordValidationError::TooCommon]);
    }

    #[test]
    fn test_policy_rejects_similar_to_username() {
        let context = PasswordContext {
            username: Some("harborview"),
            email: Some("jane.doe@example.com"),
            ..PasswordContext::default()
        };
        let errors = validate_password("HarborView-2024", &context).unwrap_err();
        assert_eq!(errors, vec![PasswordValidationError::TooSimilar("username")]);

        assert!(validate_password("Blue-Lagoon-77", &context).is_ok());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PasswordValidationError::TooShort.to_string(),
            "This password is too short. It must contain at least 8 characters."
        );
        assert_eq!(
            PasswordValidationError::TooSimilar("email address").to_string(),
            "The password is too similar to the email address."
        );
    }
}
