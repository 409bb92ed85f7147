//! Runtime secret resolution.
//!
//! # Contract
//! - Config YAML stores only **env var NAMES** (e.g. `"ALPACA_API_KEY_PAPER"`).
//! - The names come from `TimerConfig::alpaca_keys_env`; this module never
//!   re-reads the config JSON.
//! - Callers invoke [`resolve_calendar_secrets`] once at startup and pass the
//!   result into constructors; no `std::env::var` calls elsewhere.
//! - `Debug` redacts values.
//! - Error messages name the env var, never the value.
//!
//! # Source-aware enforcement
//! | Source  | Required                          |
//! |---------|-----------------------------------|
//! | alpaca  | alpaca api_key, alpaca api_secret |
//! | rules   | nothing                           |

use anyhow::{bail, Result};

use crate::settings::{AlpacaKeysEnv, CalendarSourceKind};

#[derive(Clone, Default)]
pub struct ResolvedSecrets {
    /// `None` if the named env var was absent or blank.
    pub alpaca_api_key: Option<String>,
    pub alpaca_api_secret: Option<String>,
}

impl std::fmt::Debug for ResolvedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecrets")
            .field(
                "alpaca_api_key",
                &self.alpaca_api_key.as_ref().map(|_| "<REDACTED>"),
            )
            .field(
                "alpaca_api_secret",
                &self.alpaca_api_secret.as_ref().map(|_| "<REDACTED>"),
            )
            .finish()
    }
}

impl ResolvedSecrets {
    /// Both halves, or `None`.
    pub fn alpaca_pair(&self) -> Option<(String, String)> {
        match (&self.alpaca_api_key, &self.alpaca_api_secret) {
            (Some(k), Some(s)) => Some((k.clone(), s.clone())),
            _ => None,
        }
    }
}

fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Resolve the secrets the selected calendar source needs.
///
/// # Errors
/// `SECRETS_MISSING` naming the first required env var that is unset or
/// blank.
pub fn resolve_calendar_secrets(
    keys_env: &AlpacaKeysEnv,
    source: CalendarSourceKind,
) -> Result<ResolvedSecrets> {
    let key_var = &keys_env.api_key;
    let secret_var = &keys_env.api_secret;

    match source {
        CalendarSourceKind::Rules => Ok(ResolvedSecrets::default()),
        CalendarSourceKind::Alpaca => {
            let alpaca_api_key = resolve_env(key_var);
            if alpaca_api_key.is_none() {
                bail!(
                    "SECRETS_MISSING source=alpaca: required env var '{}' \
                     (alpaca api_key) is not set or empty",
                    key_var,
                );
            }
            let alpaca_api_secret = resolve_env(secret_var);
            if alpaca_api_secret.is_none() {
                bail!(
                    "SECRETS_MISSING source=alpaca: required env var '{}' \
                     (alpaca api_secret) is not set or empty",
                    secret_var,
                );
            }
            Ok(ResolvedSecrets {
                alpaca_api_key,
                alpaca_api_secret,
            })
        }
    }
}
