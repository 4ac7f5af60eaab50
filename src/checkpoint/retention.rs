use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of most recent checkpoints to keep. Always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct KeepCount(usize);

impl KeepCount {
    pub const fn new(count: usize) -> Self {
        KeepCount(count)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for KeepCount {
    fn default() -> Self {
        KeepCount(3)
    }
}

impl TryFrom<i64> for KeepCount {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .map(KeepCount)
            .map_err(|_| ConfigError::InvalidKeepCount(value))
    }
}

impl From<KeepCount> for i64 {
    fn from(keep: KeepCount) -> Self {
        i64::try_from(keep.0).unwrap_or(i64::MAX)
    }
}

impl std::fmt::Display for KeepCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The leading part of an ascending id list that falls outside the newest `keep`.
pub fn select_for_removal(ids: &[String], keep: KeepCount) -> &[String] {
    &ids[..ids.len().saturating_sub(keep.get())]
}

/// Last id of an ascending list, or `None` when no checkpoint exists.
pub fn latest(ids: &[String]) -> Option<&str> {
    ids.last().map(String::as_str)
}
