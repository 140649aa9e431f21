//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MANAVAULT_API_URL` - Project URL of the hosted database (e.g., <https://xyz.supabase.co>)
//! - `MANAVAULT_ANON_KEY` - Public API key sent as `apikey` on every request
//!
//! ## Optional
//! - `MANAVAULT_ACCESS_TOKEN` - Signed-in user's bearer token (default: the anon key)
//! - `MANAVAULT_FUNCTION_PATH` - Path of the REST function (default: /functions/v1/api)
//! - `MANAVAULT_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `MANAVAULT_IMPORT_CHUNK_SIZE` - Rows per import chunk (default: 50)
//! - `MANAVAULT_IMPORT_CHUNK_DELAY_MS` - Pause between import chunks (default: 500)
//! - `MANAVAULT_CARD_CACHE_CAPACITY` - Max cached cards (default: unbounded)

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::cache::CachePolicy;
use crate::import::ImportSettings;

const DEFAULT_FUNCTION_PATH: &str = "/functions/v1/api";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Client configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Project URL; the REST function and RPC endpoints hang off it.
    pub api_url: Url,
    /// Public API key.
    pub anon_key: SecretString,
    /// Bearer token of the signed-in user, if any.
    pub access_token: Option<SecretString>,
    /// Path of the REST function below `api_url`.
    pub function_path: String,
    /// Per-request timeout.
    pub http_timeout: Duration,
    /// Bulk import chunking and pacing.
    pub import: ImportSettings,
    /// Card detail cache eviction.
    pub card_cache: CachePolicy,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("api_url", &self.api_url.as_str())
            .field("anon_key", &"[REDACTED]")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("function_path", &self.function_path)
            .field("http_timeout", &self.http_timeout)
            .field("import", &self.import)
            .field("card_cache", &self.card_cache)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key-value source.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let api_url = env.parsed::<Url>("MANAVAULT_API_URL")?;
        let anon_key = env.validated_secret("MANAVAULT_ANON_KEY")?;
        let access_token = env
            .optional("MANAVAULT_ACCESS_TOKEN")
            .map(|token| {
                validate_secret_strength(&token, "MANAVAULT_ACCESS_TOKEN")?;
                Ok::<_, ConfigError>(SecretString::from(token))
            })
            .transpose()?;

        let function_path = normalize_path(
            &env.optional("MANAVAULT_FUNCTION_PATH")
                .unwrap_or_else(|| DEFAULT_FUNCTION_PATH.to_string()),
        );
        let http_timeout = Duration::from_secs(
            env.parsed_or("MANAVAULT_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
        );

        let defaults = ImportSettings::default();
        let import = ImportSettings {
            chunk_size: env.parsed_or::<NonZeroUsize>(
                "MANAVAULT_IMPORT_CHUNK_SIZE",
                defaults.chunk_size,
            )?,
            chunk_delay: env
                .optional("MANAVAULT_IMPORT_CHUNK_DELAY_MS")
                .map(|v| parse_value::<u64>("MANAVAULT_IMPORT_CHUNK_DELAY_MS", &v))
                .transpose()?
                .map_or(defaults.chunk_delay, Duration::from_millis),
        };

        let card_cache = env
            .optional("MANAVAULT_CARD_CACHE_CAPACITY")
            .map(|v| parse_value::<u64>("MANAVAULT_CARD_CACHE_CAPACITY", &v))
            .transpose()?
            .map_or(CachePolicy::Unbounded, |capacity| CachePolicy::Bounded {
                capacity,
            });

        Ok(Self {
            api_url,
            anon_key,
            access_token,
            function_path,
            http_timeout,
            import,
            card_cache,
        })
    }

    /// Token sent as `Authorization: Bearer`: the user's token when signed
    /// in, otherwise the anon key.
    #[must_use]
    pub fn bearer_token(&self) -> &SecretString {
        self.access_token.as_ref().unwrap_or(&self.anon_key)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Environment lookup with typed accessors.
struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable; empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get and parse a required variable.
    fn parsed<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        parse_value(key, &self.required(key)?)
    }

    /// Get and parse a variable with a default value.
    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key)
            .map_or(Ok(default), |v| parse_value(key, &v))
    }

    /// Load and validate a required secret.
    fn validated_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let value = self.required(key)?;
        validate_secret_strength(&value, key)?;
        Ok(SecretString::from(value))
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Ensure a single leading slash and no trailing slash.
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    // API keys and JWTs are long random strings
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the project dashboard."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    const ANON_KEY: &str = "eyJhbGciOiJIUzI1NiJ9.aB3xY9mK2nL5pQ7rT0uW4zC6.Zq8Vd1Fh";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("MANAVAULT_API_URL", "https://xyz.supabase.co"),
            ("MANAVAULT_ANON_KEY", ANON_KEY),
        ]))
        .unwrap();

        assert_eq!(config.function_path, "/functions/v1/api");
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.import, ImportSettings::default());
        assert_eq!(config.card_cache, CachePolicy::Unbounded);
        assert_eq!(config.bearer_token().expose_secret(), ANON_KEY);
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("MANAVAULT_API_URL", "http://127.0.0.1:54321"),
            ("MANAVAULT_ANON_KEY", ANON_KEY),
            ("MANAVAULT_ACCESS_TOKEN", "eyJ0eXAi.Qm9iIEJ1eWVy.k3Jd8sL2pW"),
            ("MANAVAULT_FUNCTION_PATH", "functions/v1/api/"),
            ("MANAVAULT_IMPORT_CHUNK_SIZE", "25"),
            ("MANAVAULT_IMPORT_CHUNK_DELAY_MS", "1000"),
            ("MANAVAULT_CARD_CACHE_CAPACITY", "200"),
        ]))
        .unwrap();

        assert_eq!(config.function_path, "/functions/v1/api");
        assert_eq!(config.import.chunk_size.get(), 25);
        assert_eq!(config.import.chunk_delay, Duration::from_secs(1));
        assert_eq!(config.card_cache, CachePolicy::Bounded { capacity: 200 });
        assert!(config.bearer_token().expose_secret().starts_with("eyJ0eXAi"));
    }

    #[test]
    fn test_missing_required() {
        let err = StorefrontConfig::from_lookup(lookup(&[("MANAVAULT_ANON_KEY", ANON_KEY)]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(k) if k == "MANAVAULT_API_URL"));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let err = StorefrontConfig::from_lookup(lookup(&[
            ("MANAVAULT_API_URL", "https://xyz.supabase.co"),
            ("MANAVAULT_ANON_KEY", ANON_KEY),
            ("MANAVAULT_IMPORT_CHUNK_SIZE", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_placeholder_key_rejected() {
        let err = StorefrontConfig::from_lookup(lookup(&[
            ("MANAVAULT_API_URL", "https://xyz.supabase.co"),
            ("MANAVAULT_ANON_KEY", "your-anon-key"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_low_entropy_rejected() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("MANAVAULT_API_URL", "https://xyz.supabase.co"),
            ("MANAVAULT_ANON_KEY", ANON_KEY),
        ]))
        .unwrap();

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("xyz.supabase.co"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(ANON_KEY));
    }
}
