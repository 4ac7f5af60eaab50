use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{CheckpointError, ConfigError};

/// Where the sortable middle part of a checkpoint id comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StampSource {
    /// The training epoch counter.
    Epoch,
    /// Wall-clock milliseconds since the Unix epoch.
    UnixMillis,
}

impl StampSource {
    /// Digits needed to keep lexical order equal to numeric order.
    pub fn default_width(self) -> usize {
        match self {
            StampSource::Epoch => 8,
            StampSource::UnixMillis => 13,
        }
    }
}

/// Checkpoint ids of the form `prefix + zero-padded stamp + suffix`.
///
/// Padding every stamp to the same width makes ascending lexical order match
/// ascending stamp order, which is what retention relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingScheme {
    prefix: String,
    suffix: String,
    width: usize,
}

impl Default for NamingScheme {
    fn default() -> Self {
        NamingScheme::new("check_", ".ckpt", StampSource::Epoch.default_width())
    }
}

impl NamingScheme {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>, width: usize) -> Self {
        NamingScheme {
            prefix: prefix.into(),
            suffix: suffix.into(),
            width,
        }
    }

    /// Parse a `prefix*suffix` pattern. Exactly one `*` is allowed.
    pub fn from_pattern(pattern: &str, width: usize) -> Result<Self, ConfigError> {
        let mut parts = pattern.split('*');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(prefix), Some(suffix), None) => Ok(NamingScheme::new(prefix, suffix, width)),
            _ => Err(ConfigError::InvalidPattern(pattern.to_string())),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn pattern(&self) -> String {
        format!("{}*{}", self.prefix, self.suffix)
    }

    /// Render the id for `stamp`, failing if it does not fit in `width` digits.
    pub fn id_for(&self, stamp: u64) -> Result<String, CheckpointError> {
        let digits = stamp.to_string();
        if digits.len() > self.width {
            return Err(CheckpointError::StampOverflow {
                stamp,
                width: self.width,
            });
        }
        Ok(format!(
            "{}{:0>width$}{}",
            self.prefix,
            digits,
            self.suffix,
            width = self.width
        ))
    }

    /// Plain `prefix*suffix` glob test. The stamp's width and digits are not
    /// checked, so ids written under a different width still match; see
    /// [`NamingScheme::has_canonical_stamp`].
    pub fn matches(&self, name: &str) -> bool {
        name.len() >= self.prefix.len() + self.suffix.len()
            && name.starts_with(&self.prefix)
            && name.ends_with(&self.suffix)
    }

    /// True when the stamp inside `id` is exactly `width` ASCII digits, which
    /// is what keeps lexical order equal to stamp order.
    pub fn has_canonical_stamp(&self, id: &str) -> bool {
        self.stamp_of(id).is_some()
            && id.len() - self.prefix.len() - self.suffix.len() == self.width
    }

    /// The numeric stamp inside `id`, if it follows this scheme.
    pub fn stamp_of(&self, id: &str) -> Option<u64> {
        if !self.matches(id) {
            return None;
        }
        let middle = &id[self.prefix.len()..id.len() - self.suffix.len()];
        if middle.is_empty() || !middle.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        middle.parse().ok()
    }
}

/// Current wall-clock time in milliseconds.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_for_pads_stamp() {
        let scheme = NamingScheme::new("check_", ".ckpt", 4);
        assert_eq!(scheme.id_for(1).unwrap(), "check_0001.ckpt");
        assert_eq!(scheme.id_for(9999).unwrap(), "check_9999.ckpt");
    }

    #[test]
    fn test_id_for_rejects_overflow() {
        let scheme = NamingScheme::new("check_", ".ckpt", 4);
        let err = scheme.id_for(10_000).unwrap_err();
        assert!(matches!(
            err,
            CheckpointError::StampOverflow {
                stamp: 10_000,
                width: 4
            }
        ));
    }

    #[test]
    fn test_lexical_order_matches_stamp_order() {
        let scheme = NamingScheme::default();
        let stamps = [3u64, 200, 10, 1000, 9, 400];
        let mut ids: Vec<String> = stamps.iter().map(|&s| scheme.id_for(s).unwrap()).collect();
        ids.sort();
        let back: Vec<u64> = ids.iter().map(|id| scheme.stamp_of(id).unwrap()).collect();
        assert_eq!(back, vec![3, 9, 10, 200, 400, 1000]);
    }

    #[test]
    fn test_from_pattern() {
        let scheme = NamingScheme::from_pattern("check_*.ckpt", 8).unwrap();
        assert_eq!(scheme.prefix(), "check_");
        assert_eq!(scheme.suffix(), ".ckpt");
        assert_eq!(scheme.pattern(), "check_*.ckpt");

        let bare = NamingScheme::from_pattern("*", 8).unwrap();
        assert!(bare.matches("anything"));
    }

    #[test]
    fn test_from_pattern_rejects_bad_wildcards() {
        for bad in ["check_.ckpt", "check_**.ckpt", "a*b*c"] {
            assert!(
                matches!(
                    NamingScheme::from_pattern(bad, 8),
                    Err(ConfigError::InvalidPattern(_))
                ),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_matches_requires_prefix_and_suffix() {
        let scheme = NamingScheme::new("check_", ".ckpt", 4);
        assert!(scheme.matches("check_0001.ckpt"));
        assert!(scheme.matches("check_.ckpt"));
        assert!(!scheme.matches("check_0001.ckpt.tmp"));
        assert!(!scheme.matches("model_0001.ckpt"));

        // Overlapping prefix and suffix must not match a too-short name.
        let overlapping = NamingScheme::new("ab", "ba", 4);
        assert!(!overlapping.matches("aba"));
    }

    #[test]
    fn test_has_canonical_stamp_checks_width() {
        let scheme = NamingScheme::new("check_", ".ckpt", 8);
        assert!(scheme.has_canonical_stamp("check_00001000.ckpt"));
        assert!(!scheme.has_canonical_stamp("check_0999.ckpt"));
        assert!(!scheme.has_canonical_stamp("check_best0000.ckpt"));
        assert!(!scheme.has_canonical_stamp("model_00001000.ckpt"));
    }

    #[test]
    fn test_stamp_of_rejects_non_digits() {
        let scheme = NamingScheme::new("check_", ".ckpt", 4);
        assert_eq!(scheme.stamp_of("check_0042.ckpt"), Some(42));
        assert_eq!(scheme.stamp_of("check_best.ckpt"), None);
        assert_eq!(scheme.stamp_of("check_.ckpt"), None);
    }
}
