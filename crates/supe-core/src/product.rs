//! Product configuration trait for CLI binaries
//!
//! The binary implements this trait to name itself and the environment
//! variables that supply defaults for preset-pack and policy flags.

use crate::registry::external::{LoadOptions, PresetSource};
use crate::trust::SignatureOptions;
use std::path::PathBuf;

/// Configuration trait for CLI products built on the engine
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, env vars)
    fn name(&self) -> &'static str;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// Environment variable holding a default external preset pack path
    fn preset_file_env(&self) -> &'static str;

    /// Environment variable holding the expected SHA-256 of that pack
    fn preset_sha256_env(&self) -> &'static str;

    /// Environment variable holding a default policy file path
    fn policy_file_env(&self) -> &'static str;

    /// Environment variable read by the log filter
    fn log_env(&self) -> &'static str;

    /// Default policy file, if the environment names one
    fn default_policy_file(&self) -> Option<PathBuf> {
        env_value(self.policy_file_env()).map(PathBuf::from)
    }
}

pub(crate) fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Preset pack settings as given on the command line; unset fields fall back
/// to the product's environment variables.
#[derive(Debug, Clone, Default)]
pub struct PresetPackSettings {
    pub file: Option<PathBuf>,
    pub sha256: Option<String>,
    pub signature: Option<SignatureOptions>,
}

impl PresetPackSettings {
    /// Fill unset fields from the environment. Flags always win.
    pub fn with_env_defaults<C: ProductConfig>(mut self, config: &C) -> Self {
        if let Some(from_env) = PresetSource::from_env(config) {
            if self.file.is_none() {
                self.file = Some(from_env.path);
                // The env digest only describes the env file
                if self.sha256.is_none() {
                    self.sha256 = from_env.options.expected_sha256;
                }
            }
        }
        self
    }

    /// Pack to load, if any
    pub fn source(&self) -> Option<PresetSource> {
        let path = self.file.clone()?;
        Some(PresetSource {
            path,
            options: LoadOptions {
                expected_sha256: self.sha256.clone(),
                signature: self.signature.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct TestConfig;

    impl ProductConfig for TestConfig {
        fn name(&self) -> &'static str {
            "supe-test"
        }
        fn cli_description(&self) -> &'static str {
            "test"
        }
        fn preset_file_env(&self) -> &'static str {
            "SUPE_TEST_PRODUCT_PRESET_FILE"
        }
        fn preset_sha256_env(&self) -> &'static str {
            "SUPE_TEST_PRODUCT_PRESET_SHA256"
        }
        fn policy_file_env(&self) -> &'static str {
            "SUPE_TEST_PRODUCT_POLICY_FILE"
        }
        fn log_env(&self) -> &'static str {
            "SUPE_TEST_PRODUCT_LOG"
        }
    }

    // Single test so the env mutations cannot race each other
    #[test]
    fn test_env_defaults_and_flag_precedence() {
        std::env::remove_var("SUPE_TEST_PRODUCT_PRESET_FILE");
        assert!(PresetPackSettings::default()
            .with_env_defaults(&TestConfig)
            .source()
            .is_none());

        std::env::set_var("SUPE_TEST_PRODUCT_PRESET_FILE", "env-pack.json");
        std::env::set_var("SUPE_TEST_PRODUCT_PRESET_SHA256", "abc");
        let from_env = PresetPackSettings::default()
            .with_env_defaults(&TestConfig)
            .source()
            .unwrap();
        assert_eq!(from_env.path, PathBuf::from("env-pack.json"));
        assert_eq!(from_env.options.expected_sha256.as_deref(), Some("abc"));

        let flags = PresetPackSettings {
            file: Some(PathBuf::from("flag-pack.json")),
            ..Default::default()
        }
        .with_env_defaults(&TestConfig)
        .source()
        .unwrap();
        assert_eq!(flags.path, PathBuf::from("flag-pack.json"));
        assert!(flags.options.expected_sha256.is_none());

        std::env::set_var("SUPE_TEST_PRODUCT_POLICY_FILE", " policy.json ");
        assert_eq!(
            TestConfig.default_policy_file(),
            Some(PathBuf::from("policy.json"))
        );

        std::env::remove_var("SUPE_TEST_PRODUCT_PRESET_FILE");
        std::env::remove_var("SUPE_TEST_PRODUCT_PRESET_SHA256");
        std::env::remove_var("SUPE_TEST_PRODUCT_POLICY_FILE");
    }
}
