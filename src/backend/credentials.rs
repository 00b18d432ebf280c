//! Backend selection and credential loading.
//!
//! Credentials only ever come from the environment. Two spellings of the
//! variable names exist in deployed environments (the short camelCase
//! names of the hosting dashboard and prefixed upper-case names); a
//! deployment picks one via [`KeyStyle`].

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use super::traits::DocumentBackend;
use crate::{HausaufgabenError, Result};

/// Which document store to read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Supabase,
    Firestore,
}

impl BackendKind {
    /// Human-readable store name, used as the `source` of served data.
    pub fn display_name(self) -> &'static str {
        match self {
            BackendKind::Supabase => "Supabase",
            BackendKind::Firestore => "Firebase Firestore",
        }
    }
}

/// Spelling of the credential environment variables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStyle {
    /// `supabaseUrl`, `apiKey`, `projectId`, …
    #[default]
    Short,
    /// `SUPABASE_URL`, `FIREBASE_API_KEY`, …
    Prefixed,
}

/// Environment variable names for each credential, per backend and style.
struct KeyNames {
    /// Project URL (supabase) or project id (firestore).
    project: &'static str,
    access_key: &'static str,
    auth_domain: Option<&'static str>,
}

fn key_names(kind: BackendKind, style: KeyStyle) -> KeyNames {
    match (kind, style) {
        (BackendKind::Supabase, KeyStyle::Short) => KeyNames {
            project: "supabaseUrl",
            access_key: "supabaseKey",
            auth_domain: None,
        },
        (BackendKind::Supabase, KeyStyle::Prefixed) => KeyNames {
            project: "SUPABASE_URL",
            access_key: "SUPABASE_KEY",
            auth_domain: None,
        },
        (BackendKind::Firestore, KeyStyle::Short) => KeyNames {
            project: "projectId",
            access_key: "apiKey",
            auth_domain: Some("authDomain"),
        },
        (BackendKind::Firestore, KeyStyle::Prefixed) => KeyNames {
            project: "FIREBASE_PROJECT_ID",
            access_key: "FIREBASE_API_KEY",
            auth_domain: Some("FIREBASE_AUTH_DOMAIN"),
        },
    }
}

/// Credentials for the configured backend.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Supabase {
        url: String,
        api_key: String,
    },
    Firestore {
        project_id: String,
        api_key: String,
        /// Required at startup like the other keys so a half-configured
        /// deployment fails fast. The REST reads authenticate with
        /// `api_key` alone and never send it.
        auth_domain: String,
    },
}

// Keys stay out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Supabase { url, .. } => f
                .debug_struct("Supabase")
                .field("url", url)
                .field("api_key", &"<redacted>")
                .finish(),
            Credentials::Firestore {
                project_id,
                auth_domain,
                ..
            } => f
                .debug_struct("Firestore")
                .field("project_id", project_id)
                .field("api_key", &"<redacted>")
                .field("auth_domain", auth_domain)
                .finish(),
        }
    }
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env(kind: BackendKind, style: KeyStyle) -> Result<Self> {
        Self::from_lookup(kind, style, |key| std::env::var(key).ok())
    }

    /// Read credentials through `lookup`.
    ///
    /// Every missing (or empty) value is collected so the caller can report
    /// all of them at once in a [`HausaufgabenError::MissingConfiguration`].
    pub fn from_lookup<F>(kind: BackendKind, style: KeyStyle, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let names = key_names(kind, style);
        let mut missing = Vec::new();
        let mut require = |key: &'static str| match lookup(key).filter(|v| !v.trim().is_empty())
        {
            Some(value) => value,
            None => {
                missing.push(key.to_string());
                String::new()
            }
        };

        let project = require(names.project);
        let access_key = require(names.access_key);
        let auth_domain = names.auth_domain.map(&mut require);

        if !missing.is_empty() {
            return Err(HausaufgabenError::MissingConfiguration(missing));
        }

        Ok(match kind {
            BackendKind::Supabase => Credentials::Supabase {
                url: project,
                api_key: access_key,
            },
            BackendKind::Firestore => Credentials::Firestore {
                project_id: project,
                api_key: access_key,
                auth_domain: auth_domain.unwrap_or_default(),
            },
        })
    }

    /// Backend these credentials belong to.
    pub fn kind(&self) -> BackendKind {
        match self {
            Credentials::Supabase { .. } => BackendKind::Supabase,
            Credentials::Firestore { .. } => BackendKind::Firestore,
        }
    }
}

/// Build the backend client for `credentials`.
///
/// `timeout` bounds each backend request; `None` leaves requests unbounded.
pub fn connect(
    credentials: &Credentials,
    timeout: Option<Duration>,
) -> Result<Arc<dyn DocumentBackend>> {
    match credentials {
        #[cfg(feature = "supabase")]
        Credentials::Supabase { url, api_key } => Ok(Arc::new(
            super::SupabaseClient::with_timeout(url.clone(), api_key.clone(), timeout)?,
        )),
        #[cfg(feature = "firestore")]
        Credentials::Firestore {
            project_id,
            api_key,
            ..
        } => Ok(Arc::new(super::FirestoreClient::with_base_url(
            project_id.clone(),
            api_key.clone(),
            super::firestore::DEFAULT_BASE_URL,
            timeout,
        )?)),
        #[allow(unreachable_patterns)]
        other => Err(HausaufgabenError::Configuration(format!(
            "backend '{}' is not compiled in",
            other.kind().display_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn supabase_short_keys() {
        let creds = Credentials::from_lookup(
            BackendKind::Supabase,
            KeyStyle::Short,
            env(&[("supabaseUrl", "https://xyz.supabase.co"), ("supabaseKey", "anon")]),
        )
        .unwrap();
        assert_eq!(
            creds,
            Credentials::Supabase {
                url: "https://xyz.supabase.co".into(),
                api_key: "anon".into()
            }
        );
    }

    #[test]
    fn firestore_prefixed_keys() {
        let creds = Credentials::from_lookup(
            BackendKind::Firestore,
            KeyStyle::Prefixed,
            env(&[
                ("FIREBASE_PROJECT_ID", "schule"),
                ("FIREBASE_API_KEY", "AIza"),
                ("FIREBASE_AUTH_DOMAIN", "schule.firebaseapp.com"),
            ]),
        )
        .unwrap();
        assert_eq!(creds.kind(), BackendKind::Firestore);
    }

    #[test]
    fn firestore_without_auth_domain_fails() {
        let err = Credentials::from_lookup(
            BackendKind::Firestore,
            KeyStyle::Short,
            env(&[("projectId", "schule"), ("apiKey", "AIza"), ("authDomain", "  ")]),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "missing configuration values: authDomain");
    }

    #[test]
    fn missing_keys_are_all_reported() {
        let err = Credentials::from_lookup(
            BackendKind::Firestore,
            KeyStyle::Short,
            env(&[("projectId", "schule")]),
        )
        .unwrap_err();
        match err {
            HausaufgabenError::MissingConfiguration(keys) => {
                assert_eq!(keys, vec!["apiKey".to_string(), "authDomain".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let err = Credentials::from_lookup(
            BackendKind::Supabase,
            KeyStyle::Short,
            env(&[("supabaseUrl", "https://xyz.supabase.co"), ("supabaseKey", "  ")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("supabaseKey"));
    }

    #[test]
    fn style_mismatch_reports_expected_names() {
        // Prefixed names set, short style configured
        let err = Credentials::from_lookup(
            BackendKind::Supabase,
            KeyStyle::Short,
            env(&[("SUPABASE_URL", "u"), ("SUPABASE_KEY", "k")]),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing configuration values: supabaseUrl, supabaseKey"
        );
    }

    #[test]
    fn debug_redacts_key() {
        let creds = Credentials::Supabase {
            url: "https://xyz.supabase.co".into(),
            api_key: "super-secret".into(),
        };
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("xyz.supabase.co"));
    }
}
