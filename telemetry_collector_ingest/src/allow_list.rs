//! The scan types a client is allowed to report.
//!
//! Custom scan types may carry confidential names, so clients are expected to report them as
//! [`OTHER_SCAN_TYPE`]. Anything that is neither official nor `other` is rejected.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use thiserror::Error;

/// Placeholder reported in place of any non-official scan type. Always accepted.
pub const OTHER_SCAN_TYPE: &str = "other";

/// Official scan types.
///
/// Deprecated scan types stay in this list so that older installations can still report.
const OFFICIAL_SCAN_TYPES: &[&str] = &[
    "amass",                  // deprecated
    "angularjs-csti-scanner", // deprecated
    "cmseek",                 // deprecated
    "doggo",                  // deprecated
    "ffuf",
    "git-repo-scanner",
    "gitleaks",
    "kube-hunter",
    "kubeaudit", // deprecated
    "ncrack",
    "nikto",
    "nmap",
    "nuclei",
    "screenshooter",
    "semgrep",
    "ssh-audit",
    "ssh-scan", // deprecated
    "sslyze",
    "trivy-filesystem",
    "trivy-image",
    "trivy-repo",
    "trivy-sbom-image",
    "trivy",
    "typo3scan", // deprecated
    "whatweb",   // deprecated
    "wpscan",
    "zap-advanced-scan", // deprecated
    "zap-api-scan",      // deprecated
    "zap-automation-scan",
    "zap-baseline-scan", // deprecated
    "zap-full-scan",     // deprecated
];

static OFFICIAL: LazyLock<Arc<AllowList>> =
    LazyLock::new(|| Arc::new(AllowList::new(OFFICIAL_SCAN_TYPES.iter().copied())));

/// A scan type that is not on the [`AllowList`].
///
/// The rejected value is echoed back to the client as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid ScanType '{identifier}'")]
pub struct InvalidIdentifierError {
    identifier: String,
}

impl InvalidIdentifierError {
    /// The scan type that was rejected
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// Immutable set of accepted scan types.
///
/// Built once at startup and shared by reference afterwards; there is no way to mutate an
/// `AllowList` once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    scan_types: HashSet<String>,
}

impl AllowList {
    /// Create an allow-list from the given scan types. [`OTHER_SCAN_TYPE`] is always included.
    pub fn new<I, S>(scan_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut scan_types: HashSet<String> = scan_types.into_iter().map(Into::into).collect();
        scan_types.insert(OTHER_SCAN_TYPE.to_string());
        Self { scan_types }
    }

    /// The official allow-list, initialized on first use.
    pub fn official() -> Arc<Self> {
        Arc::clone(&OFFICIAL)
    }

    /// The official allow-list extended with scan types supplied at configuration time.
    pub fn official_with<I, S>(additional: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut scan_types = OFFICIAL.scan_types.clone();
        scan_types.extend(
            additional
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty()),
        );
        Self { scan_types }
    }

    pub fn contains(&self, scan_type: &str) -> bool {
        self.scan_types.contains(scan_type)
    }

    /// Number of accepted scan types, including [`OTHER_SCAN_TYPE`].
    pub fn len(&self) -> usize {
        self.scan_types.len()
    }

    /// Never true, [`OTHER_SCAN_TYPE`] is always present.
    pub fn is_empty(&self) -> bool {
        self.scan_types.is_empty()
    }

    /// Check every scan type in order, failing on the first one that is not on the list.
    pub fn validate<S: AsRef<str>>(&self, scan_types: &[S]) -> Result<(), InvalidIdentifierError> {
        match scan_types
            .iter()
            .map(AsRef::as_ref)
            .find(|scan_type| !self.contains(scan_type))
        {
            Some(rejected) => Err(InvalidIdentifierError {
                identifier: rejected.to_string(),
            }),
            None => Ok(()),
        }
    }
}
