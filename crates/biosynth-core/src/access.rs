//! # Document Gate
//!
//! Access-code prompt in front of MSDS and CoA downloads.
//!
//! This is a UI gate, not access control: the code ships with the client
//! configuration and anyone holding the binary can read it. Wrong codes are
//! ordinary input errors with unlimited retries.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum DocumentKind {
    #[serde(rename = "MSDS")]
    Msds,
    #[serde(rename = "CoA")]
    Coa,
}

impl DocumentKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "msds" => Some(DocumentKind::Msds),
            "coa" => Some(DocumentKind::Coa),
            _ => None,
        }
    }

    /// Notification text once the download is unlocked.
    pub fn download_message(&self) -> String {
        format!("{self} Download Started")
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Msds => f.write_str("MSDS"),
            DocumentKind::Coa => f.write_str("CoA"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Invalid access code")]
    InvalidCode,
}

/// Compares entered codes against the configured one.
///
/// With no configured code every attempt is refused.
#[derive(Debug, Clone, Default)]
pub struct DocumentGate {
    access_code: Option<String>,
}

impl DocumentGate {
    pub fn new(access_code: Option<String>) -> Self {
        DocumentGate {
            access_code: access_code.filter(|code| !code.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.access_code.is_some()
    }

    /// Exact comparison; no trimming or case folding.
    pub fn verify(&self, kind: DocumentKind, entered: &str) -> Result<DocumentKind, AccessError> {
        match &self.access_code {
            Some(code) if code == entered => Ok(kind),
            _ => Err(AccessError::InvalidCode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify() {
        let gate = DocumentGate::new(Some("Lab-2024!".to_string()));
        assert_eq!(gate.verify(DocumentKind::Coa, "Lab-2024!"), Ok(DocumentKind::Coa));
        assert_eq!(
            gate.verify(DocumentKind::Coa, "lab-2024!"),
            Err(AccessError::InvalidCode)
        );
        // retries are unlimited
        for _ in 0..10 {
            assert!(gate.verify(DocumentKind::Msds, "guess").is_err());
        }
        assert!(gate.verify(DocumentKind::Msds, "Lab-2024!").is_ok());
    }

    #[test]
    fn test_unconfigured_gate_refuses() {
        let gate = DocumentGate::new(Some(String::new()));
        assert!(!gate.is_configured());
        assert_eq!(gate.verify(DocumentKind::Msds, ""), Err(AccessError::InvalidCode));
    }

    #[test]
    fn test_messages() {
        assert_eq!(DocumentKind::Msds.download_message(), "MSDS Download Started");
        assert_eq!(AccessError::InvalidCode.to_string(), "Invalid access code");
        assert_eq!(DocumentKind::parse("COA"), Some(DocumentKind::Coa));
    }
}
