//! Signature verification providers for external preset packs
//!
//! Providers are selected by name and all expose the same `verify` capability.
//! Every provider checks the exact bytes the loader read. Tool-backed providers
//! (`minisign`, `cosign-blob`) are pointed at a private copy of those bytes, run
//! under a timeout, and report a missing binary separately from a rejected
//! signature.

use crate::error::{Error, Result};
use crate::trust::hasher;
use base64::Engine as _;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use serde::Serialize;
use sha2::Sha256;
use std::ffi::OsStr;
use std::fmt;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

/// How long `minisign` / `cosign` may run before verification fails
pub const TOOL_TIMEOUT: Duration = Duration::from_secs(60);

const TOOL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How tool-backed providers locate and bound their verifier
#[derive(Debug, Clone)]
struct ToolRun<'a> {
    binary: Option<&'a Path>,
    timeout: Duration,
}

impl Default for ToolRun<'_> {
    fn default() -> Self {
        Self {
            binary: None,
            timeout: TOOL_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureProvider {
    #[default]
    None,
    Sha256File,
    RsaPem,
    Minisign,
    CosignBlob,
}

impl SignatureProvider {
    pub const ALL: [SignatureProvider; 5] = [
        SignatureProvider::None,
        SignatureProvider::Sha256File,
        SignatureProvider::RsaPem,
        SignatureProvider::Minisign,
        SignatureProvider::CosignBlob,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SignatureProvider::None => "none",
            SignatureProvider::Sha256File => "sha256-file",
            SignatureProvider::RsaPem => "rsa-pem",
            SignatureProvider::Minisign => "minisign",
            SignatureProvider::CosignBlob => "cosign-blob",
        }
    }

    fn needs_public_key(&self) -> bool {
        matches!(
            self,
            SignatureProvider::RsaPem | SignatureProvider::Minisign | SignatureProvider::CosignBlob
        )
    }

    /// Verify `contents` (read from `file`) against a detached signature.
    ///
    /// Missing signature or key paths fail with a configuration error before
    /// anything is checked.
    pub fn verify(
        &self,
        file: &Path,
        contents: &[u8],
        signature: Option<&Path>,
        public_key: Option<&Path>,
    ) -> Result<VerifiedInfo> {
        self.verify_with(file, contents, signature, public_key, &ToolRun::default())
    }

    fn verify_with(
        &self,
        file: &Path,
        contents: &[u8],
        signature: Option<&Path>,
        public_key: Option<&Path>,
        tool_run: &ToolRun<'_>,
    ) -> Result<VerifiedInfo> {
        if *self == SignatureProvider::None {
            return Ok(VerifiedInfo {
                provider: self.name(),
                verified: false,
                detail: "no signature verification requested".to_string(),
            });
        }

        let signature = signature.ok_or_else(|| {
            Error::config(format!(
                "Signature provider '{}' requires a signature file",
                self.name()
            ))
        })?;
        let public_key = match (self.needs_public_key(), public_key) {
            (true, None) => {
                return Err(Error::config(format!(
                    "Signature provider '{}' requires a public key file",
                    self.name()
                )))
            }
            (_, key) => key,
        };

        tracing::debug!(
            provider = self.name(),
            file = %file.display(),
            signature = %signature.display(),
            "verifying preset pack signature"
        );

        let detail = match self {
            SignatureProvider::None => unreachable!("handled above"),
            SignatureProvider::Sha256File => verify_sha256_sidecar(contents, signature)?,
            SignatureProvider::RsaPem => {
                verify_rsa_pem(contents, signature, require(public_key)?)?
            }
            SignatureProvider::Minisign => {
                let key = require(public_key)?;
                let pinned = pin_contents(*self, contents)?;
                run_tool(
                    *self,
                    "minisign",
                    &[
                        OsStr::new("-V"),
                        OsStr::new("-m"),
                        pinned.path().as_os_str(),
                        OsStr::new("-x"),
                        signature.as_os_str(),
                        OsStr::new("-p"),
                        key.as_os_str(),
                    ],
                    tool_run,
                )?
            }
            SignatureProvider::CosignBlob => {
                let key = require(public_key)?;
                let pinned = pin_contents(*self, contents)?;
                run_tool(
                    *self,
                    "cosign",
                    &[
                        OsStr::new("verify-blob"),
                        OsStr::new("--key"),
                        key.as_os_str(),
                        OsStr::new("--signature"),
                        signature.as_os_str(),
                        pinned.path().as_os_str(),
                    ],
                    tool_run,
                )?
            }
        };

        Ok(VerifiedInfo {
            provider: self.name(),
            verified: true,
            detail,
        })
    }
}

fn require(key: Option<&Path>) -> Result<&Path> {
    key.ok_or_else(|| Error::config("Public key file is required"))
}

impl fmt::Display for SignatureProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignatureProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SignatureProvider::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::config(format!(
                    "Unknown signature provider '{}' (expected one of: {})",
                    s,
                    SignatureProvider::ALL.map(|p| p.name()).join(", ")
                ))
            })
    }
}

/// Outcome of a successful verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedInfo {
    pub provider: &'static str,
    pub verified: bool,
    pub detail: String,
}

/// Provider choice plus the detached files it needs
#[derive(Debug, Clone, Default)]
pub struct SignatureOptions {
    pub provider: SignatureProvider,
    pub signature: Option<PathBuf>,
    pub public_key: Option<PathBuf>,
    /// Verifier binary to run instead of looking `minisign`/`cosign` up on PATH
    pub tool_path: Option<PathBuf>,
    /// Overrides [`TOOL_TIMEOUT`]
    pub tool_timeout: Option<Duration>,
}

impl SignatureOptions {
    pub fn new(provider: SignatureProvider) -> Self {
        Self {
            provider,
            ..Default::default()
        }
    }

    pub fn with_signature(mut self, path: impl Into<PathBuf>) -> Self {
        self.signature = Some(path.into());
        self
    }

    pub fn with_public_key(mut self, path: impl Into<PathBuf>) -> Self {
        self.public_key = Some(path.into());
        self
    }

    pub fn with_tool_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tool_path = Some(path.into());
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }

    pub fn verify(&self, file: &Path, contents: &[u8]) -> Result<VerifiedInfo> {
        let tool_run = ToolRun {
            binary: self.tool_path.as_deref(),
            timeout: self.tool_timeout.unwrap_or(TOOL_TIMEOUT),
        };
        self.provider.verify_with(
            file,
            contents,
            self.signature.as_deref(),
            self.public_key.as_deref(),
            &tool_run,
        )
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| Error::io(path, e))
}

fn verify_sha256_sidecar(contents: &[u8], sidecar: &Path) -> Result<String> {
    let text = String::from_utf8_lossy(&read(sidecar)?).into_owned();
    let expected = text.split_whitespace().next().ok_or_else(|| {
        Error::SignatureVerification {
            provider: SignatureProvider::Sha256File.name(),
            detail: format!("{} does not contain a digest", sidecar.display()),
        }
    })?;

    let actual = hasher::sha256_hex(contents);
    if !hasher::digests_match(expected, &actual) {
        return Err(Error::SignatureVerification {
            provider: SignatureProvider::Sha256File.name(),
            detail: format!("expected sha256 {}, got {}", expected.to_lowercase(), actual),
        });
    }
    Ok(format!("sha256 {} matches sidecar", actual))
}

fn parse_public_key(pem: &str) -> Option<RsaPublicKey> {
    RsaPublicKey::from_public_key_pem(pem)
        .ok()
        .or_else(|| RsaPublicKey::from_pkcs1_pem(pem).ok())
}

/// Raw signature bytes, or base64 text when the raw length doesn't fit the key
fn decode_signature(raw: Vec<u8>, key_size: usize) -> Vec<u8> {
    if raw.len() == key_size {
        return raw;
    }
    let text: String = String::from_utf8_lossy(&raw)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    match base64::engine::general_purpose::STANDARD.decode(text) {
        Ok(decoded) if decoded.len() == key_size => decoded,
        _ => raw,
    }
}

fn verify_rsa_pem(contents: &[u8], signature: &Path, public_key: &Path) -> Result<String> {
    let provider = SignatureProvider::RsaPem.name();
    let pem = String::from_utf8_lossy(&read(public_key)?).into_owned();
    let key = parse_public_key(&pem).ok_or_else(|| {
        Error::config(format!(
            "{} is not a PEM-encoded RSA public key",
            public_key.display()
        ))
    })?;

    let bytes = decode_signature(read(signature)?, key.size());
    let signature = Signature::try_from(bytes.as_slice()).map_err(|e| {
        Error::SignatureVerification {
            provider,
            detail: format!("malformed signature: {}", e),
        }
    })?;

    VerifyingKey::<Sha256>::new(key)
        .verify(contents, &signature)
        .map_err(|_| Error::SignatureVerification {
            provider,
            detail: "RSA/SHA-256 signature does not match the preset file".to_string(),
        })?;

    Ok("RSA/SHA-256 signature valid".to_string())
}

/// Copy of the verified bytes for an external verifier, so the tool cannot see
/// a file swapped in after the loader read it.
fn pin_contents(provider: SignatureProvider, contents: &[u8]) -> Result<tempfile::NamedTempFile> {
    let failed = |e: std::io::Error| Error::SignatureVerification {
        provider: provider.name(),
        detail: format!("failed to stage preset bytes for verification: {}", e),
    };
    let mut pinned = tempfile::NamedTempFile::new().map_err(failed)?;
    pinned.write_all(contents).map_err(failed)?;
    pinned.flush().map_err(failed)?;
    Ok(pinned)
}

fn run_tool(
    provider: SignatureProvider,
    tool: &'static str,
    args: &[&OsStr],
    tool_run: &ToolRun<'_>,
) -> Result<String> {
    let missing = || Error::SignatureToolMissing {
        provider: provider.name(),
        tool,
    };
    let rejected = |detail: String| Error::SignatureVerification {
        provider: provider.name(),
        detail,
    };
    let binary = match tool_run.binary {
        Some(path) => which::which(path).map_err(|_| missing())?,
        None => which::which(tool).map_err(|_| missing())?,
    };

    let mut child = Command::new(&binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                missing()
            } else {
                rejected(format!("failed to run {}: {}", tool, e))
            }
        })?;

    let stderr_reader = child.stderr.take().map(|mut stderr| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf);
            buf
        })
    });
    let collect_stderr = |reader: Option<thread::JoinHandle<Vec<u8>>>| {
        reader
            .and_then(|r| r.join().ok())
            .map(|buf| String::from_utf8_lossy(&buf).trim().to_string())
            .unwrap_or_default()
    };

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if start.elapsed() >= tool_run.timeout => {
                let _ = child.kill();
                let _ = child.wait();
                let _ = collect_stderr(stderr_reader);
                tracing::warn!(tool, timeout_secs = tool_run.timeout.as_secs_f64(), "verifier timed out");
                return Err(rejected(format!(
                    "{} timed out after {} seconds",
                    tool,
                    tool_run.timeout.as_secs_f64()
                )));
            }
            Ok(None) => thread::sleep(TOOL_POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                return Err(rejected(format!("failed to wait for {}: {}", tool, e)));
            }
        }
    };

    let stderr = collect_stderr(stderr_reader);
    if !status.success() {
        return Err(rejected(format!(
            "{} exited with {}: {}",
            tool,
            status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string()),
            stderr
        )));
    }

    Ok(format!("{} verified the signature", tool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;
    use rsa::pkcs1v15::SigningKey;
    use rsa::pkcs8::{EncodePublicKey, LineEnding};
    use rsa::signature::{SignatureEncoding, Signer};
    use rsa::RsaPrivateKey;
    use std::fs;
    use tempfile::TempDir;

    const PACK: &[u8] = br#"[{"id":"x"}]"#;

    fn keypair() -> (RsaPrivateKey, String) {
        let private = RsaPrivateKey::new(&mut OsRng, 1024).expect("keygen");
        let pem = private
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .expect("pem");
        (private, pem)
    }

    fn sign(private: &RsaPrivateKey, data: &[u8]) -> Vec<u8> {
        SigningKey::<Sha256>::new(private.clone()).sign(data).to_vec()
    }

    #[test]
    fn test_provider_names_round_trip() {
        for provider in SignatureProvider::ALL {
            assert_eq!(provider.name().parse::<SignatureProvider>().unwrap(), provider);
        }
        assert_eq!(
            "gpg".parse::<SignatureProvider>().unwrap_err().kind(),
            "ConfigurationError"
        );
    }

    #[test]
    fn test_none_reports_unverified() {
        let info = SignatureProvider::None
            .verify(Path::new("p.json"), PACK, None, None)
            .unwrap();
        assert!(!info.verified);
    }

    #[test]
    fn test_missing_paths_are_configuration_errors() {
        for provider in &SignatureProvider::ALL[1..] {
            let err = provider
                .verify(Path::new("p.json"), PACK, None, Some(Path::new("k.pem")))
                .unwrap_err();
            assert_eq!(err.kind(), "ConfigurationError", "{}", provider);
        }
        for provider in [
            SignatureProvider::RsaPem,
            SignatureProvider::Minisign,
            SignatureProvider::CosignBlob,
        ] {
            let err = provider
                .verify(Path::new("p.json"), PACK, Some(Path::new("p.sig")), None)
                .unwrap_err();
            assert_eq!(err.kind(), "ConfigurationError", "{}", provider);
        }
    }

    #[test]
    fn test_sha256_sidecar() {
        let dir = TempDir::new().unwrap();
        let sidecar = dir.path().join("pack.json.sha256");
        fs::write(
            &sidecar,
            format!("{}  pack.json\n", hasher::sha256_hex(PACK).to_uppercase()),
        )
        .unwrap();

        let info = SignatureProvider::Sha256File
            .verify(Path::new("pack.json"), PACK, Some(&sidecar), None)
            .unwrap();
        assert!(info.verified);

        let err = SignatureProvider::Sha256File
            .verify(Path::new("pack.json"), b"tampered", Some(&sidecar), None)
            .unwrap_err();
        assert_eq!(err.kind(), "SignatureVerificationError");
    }

    #[test]
    fn test_rsa_signature_matches_only_its_key() {
        let dir = TempDir::new().unwrap();
        let (private, pem) = keypair();
        let (_, other_pem) = keypair();

        let sig = dir.path().join("pack.sig");
        let key = dir.path().join("key.pem");
        let other = dir.path().join("other.pem");
        fs::write(&sig, sign(&private, PACK)).unwrap();
        fs::write(&key, pem).unwrap();
        fs::write(&other, other_pem).unwrap();

        let opts = SignatureOptions::new(SignatureProvider::RsaPem)
            .with_signature(&sig)
            .with_public_key(&key);
        assert!(opts.verify(Path::new("pack.json"), PACK).unwrap().verified);

        let err = opts.verify(Path::new("pack.json"), b"[]").unwrap_err();
        assert_eq!(err.kind(), "SignatureVerificationError");

        let wrong_key = SignatureOptions::new(SignatureProvider::RsaPem)
            .with_signature(&sig)
            .with_public_key(&other);
        let err = wrong_key.verify(Path::new("pack.json"), PACK).unwrap_err();
        assert_eq!(err.kind(), "SignatureVerificationError");
    }

    #[test]
    fn test_rsa_accepts_base64_signature() {
        let dir = TempDir::new().unwrap();
        let (private, pem) = keypair();
        let sig = dir.path().join("pack.sig.b64");
        let key = dir.path().join("key.pem");
        let encoded = base64::engine::general_purpose::STANDARD.encode(sign(&private, PACK));
        fs::write(&sig, format!("{}\n", encoded)).unwrap();
        fs::write(&key, pem).unwrap();

        let info = SignatureProvider::RsaPem
            .verify(Path::new("pack.json"), PACK, Some(&sig), Some(&key))
            .unwrap();
        assert!(info.verified);
    }

    #[test]
    fn test_rsa_rejects_garbage_key() {
        let dir = TempDir::new().unwrap();
        let sig = dir.path().join("pack.sig");
        let key = dir.path().join("key.pem");
        fs::write(&sig, [0u8; 128]).unwrap();
        fs::write(&key, "not a key").unwrap();
        let err = SignatureProvider::RsaPem
            .verify(Path::new("pack.json"), PACK, Some(&sig), Some(&key))
            .unwrap_err();
        assert_eq!(err.kind(), "ConfigurationError");
    }

    #[test]
    fn test_missing_tool_is_distinct() {
        let err = run_tool(
            SignatureProvider::Minisign,
            "supe-definitely-not-installed-tool",
            &[],
            &ToolRun::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "SignatureToolMissingError");
    }

    /// Stand-in `minisign` running `body`; the message file arrives as `$3`
    #[cfg(unix)]
    fn fake_minisign(dir: &TempDir, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.path().join("minisign");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    fn minisign_options(dir: &TempDir, tool: &Path) -> SignatureOptions {
        let sig = dir.path().join("pack.minisig");
        let key = dir.path().join("minisign.pub");
        fs::write(&sig, "sig").unwrap();
        fs::write(&key, "key").unwrap();
        SignatureOptions::new(SignatureProvider::Minisign)
            .with_signature(sig)
            .with_public_key(key)
            .with_tool_path(tool)
    }

    #[cfg(unix)]
    #[test]
    fn test_tool_sees_loaded_bytes_not_swapped_file() {
        let dir = TempDir::new().unwrap();
        let tool = fake_minisign(&dir, r#"grep -q '"id":"x"' "$3""#);
        let options = minisign_options(&dir, &tool);

        // The file on disk was replaced after the loader read PACK
        let on_disk = dir.path().join("pack.json");
        fs::write(&on_disk, br#"[{"id":"swapped"}]"#).unwrap();

        let info = options.verify(&on_disk, PACK).unwrap();
        assert!(info.verified);
        assert_eq!(info.provider, "minisign");

        let err = options.verify(&on_disk, br#"[{"id":"swapped"}]"#).unwrap_err();
        assert_eq!(err.kind(), "SignatureVerificationError");
    }

    #[cfg(unix)]
    #[test]
    fn test_hung_tool_times_out() {
        let dir = TempDir::new().unwrap();
        let tool = fake_minisign(&dir, "exec sleep 30");
        let options =
            minisign_options(&dir, &tool).with_tool_timeout(Duration::from_millis(200));

        let started = Instant::now();
        let err = options.verify(Path::new("pack.json"), PACK).unwrap_err();
        assert_eq!(err.kind(), "SignatureVerificationError");
        assert!(err.to_string().contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
