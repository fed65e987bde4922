//! Loading external preset packs
//!
//! A pack is read once, hash-checked and signature-checked against those exact
//! bytes, and only then parsed. Every entry is validated before any preset from
//! the pack is returned.

use crate::error::{Error, Result};
use crate::product::{env_value, ProductConfig};
use crate::registry::presets::{parse_preset_entry, PresetTrust, StarterPreset};
use crate::trust::{self, SignatureOptions};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// How an external pack should be checked before it is trusted
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Expected hex SHA-256 of the pack (case-insensitive)
    pub expected_sha256: Option<String>,
    pub signature: Option<SignatureOptions>,
}

/// Location of an external pack plus how to check it
#[derive(Debug, Clone)]
pub struct PresetSource {
    pub path: PathBuf,
    pub options: LoadOptions,
}

impl PresetSource {
    /// Pack configured through the product's environment variables, if any
    pub fn from_env<C: ProductConfig>(config: &C) -> Option<Self> {
        let path = env_value(config.preset_file_env())?;
        let expected_sha256 = env_value(config.preset_sha256_env());
        Some(Self {
            path: PathBuf::from(path),
            options: LoadOptions {
                expected_sha256,
                signature: None,
            },
        })
    }

    pub fn load(&self) -> Result<Vec<StarterPreset>> {
        load_external_presets(&self.path, &self.options)
    }
}

/// Read, verify and validate an external preset pack.
///
/// The JSON may be an array of objects carrying `id`, or an object keyed by id.
pub fn load_external_presets(path: &Path, options: &LoadOptions) -> Result<Vec<StarterPreset>> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;

    let digest = match &options.expected_sha256 {
        Some(expected) if !expected.trim().is_empty() => {
            trust::verify_sha256(path, &bytes, expected)?
        }
        _ => trust::sha256_hex(&bytes),
    };

    let verified = match &options.signature {
        Some(signature) => signature.verify(path, &bytes)?,
        None => trust::SignatureProvider::None.verify(path, &bytes, None, None)?,
    };

    let source = path.display().to_string();
    let document: Value = serde_json::from_slice(&bytes)
        .map_err(|e| Error::preset(&source, format!("invalid JSON: {}", e)))?;

    let entries = match document {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(mut map) => match map.remove("id") {
                    Some(Value::String(id)) => Ok((id, map)),
                    _ => Err(Error::preset(
                        format!("#{}", index),
                        "entry is missing a string 'id'",
                    )),
                },
                _ => Err(Error::preset(
                    format!("#{}", index),
                    "entry must be a JSON object",
                )),
            })
            .collect::<Result<Vec<_>>>()?,
        Value::Object(map) => map
            .into_iter()
            .map(|(id, item)| match item {
                Value::Object(entry) => Ok((id, entry)),
                _ => Err(Error::preset(id, "entry must be a JSON object")),
            })
            .collect::<Result<Vec<_>>>()?,
        _ => {
            return Err(Error::preset(
                source,
                "expected a JSON array of presets or an object keyed by preset id",
            ))
        }
    };

    let trust = PresetTrust {
        source,
        sha256: digest,
        signature_provider: verified.provider.to_string(),
        verified: verified.verified,
    };

    let mut presets = Vec::with_capacity(entries.len());
    for (id, entry) in entries {
        let mut preset = parse_preset_entry(&id, entry)?;
        preset.trust = Some(trust.clone());
        presets.push(preset);
    }

    tracing::info!(
        path = %path.display(),
        count = presets.len(),
        provider = verified.provider,
        verified = verified.verified,
        "loaded external presets"
    );

    Ok(presets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const ENTRY: &str = r#"{
        "category": "frontend",
        "maturity": "stable",
        "description": "Svelte kit",
        "framework": "svelte",
        "packageManager": "pnpm",
        "ui": ["tailwind", "daisyui"],
        "theme": "neon_noir",
        "ciTemplates": [],
        "researchNotes": "Runes mode"
    }"#;

    fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_load_array_form() {
        let dir = TempDir::new().unwrap();
        let body = format!(
            "[{}]",
            ENTRY.replacen('{', r#"{"id": "svelte-lab","#, 1)
        );
        let path = write(&dir, "pack.json", &body);
        let presets = load_external_presets(&path, &LoadOptions::default()).unwrap();
        assert_eq!(presets.len(), 1);
        assert_eq!(presets[0].id, "svelte-lab");
        let trust = presets[0].trust.as_ref().unwrap();
        assert!(!trust.verified);
        assert_eq!(trust.signature_provider, "none");
        assert_eq!(trust.sha256, trust::sha256_hex(body.as_bytes()));
    }

    #[test]
    fn test_load_object_form() {
        let dir = TempDir::new().unwrap();
        let body = format!(r#"{{"svelte-lab": {}, "svelte-two": {}}}"#, ENTRY, ENTRY);
        let path = write(&dir, "pack.json", &body);
        let presets = load_external_presets(&path, &LoadOptions::default()).unwrap();
        let ids: Vec<_> = presets.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["svelte-lab", "svelte-two"]);
    }

    #[test]
    fn test_expected_sha256_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let body = format!(r#"{{"svelte-lab": {}}}"#, ENTRY);
        let path = write(&dir, "pack.json", &body);
        let options = LoadOptions {
            expected_sha256: Some(trust::sha256_hex(body.as_bytes()).to_uppercase()),
            signature: None,
        };
        assert!(load_external_presets(&path, &options).is_ok());
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let dir = TempDir::new().unwrap();
        for (name, body, expected) in [
            ("scalar.json", "42", "expected a JSON array"),
            ("broken.json", "{", "invalid JSON"),
            ("noid.json", "[{\"category\": \"x\"}]", "#0"),
            ("nonobj.json", "{\"x1\": 3}", "x1"),
        ] {
            let path = write(&dir, name, body);
            let err = load_external_presets(&path, &LoadOptions::default()).unwrap_err();
            assert_eq!(err.kind(), "PresetValidationError", "{}", name);
            assert!(err.to_string().contains(expected), "{}: {}", name, err);
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_external_presets(Path::new("/nonexistent/pack.json"), &LoadOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), "IoError");
    }
}
