use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::model::MetadataValue;

/// Split a record ends up in. Records outside the eligible subset are
/// `Undefined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum SplitLabel {
    #[serde(rename = "train")]
    Train,
    #[serde(rename = "dev")]
    Dev,
    #[serde(rename = "test")]
    Test,
    #[default]
    Undefined,
}

impl SplitLabel {
    /// The three labels a record can be assigned to, in assignment order.
    pub const ASSIGNED: [SplitLabel; 3] = [SplitLabel::Train, SplitLabel::Dev, SplitLabel::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            SplitLabel::Train => "train",
            SplitLabel::Dev => "dev",
            SplitLabel::Test => "test",
            SplitLabel::Undefined => "Undefined",
        }
    }
}

impl fmt::Display for SplitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(SplitLabel::Train),
            "dev" => Ok(SplitLabel::Dev),
            "test" => Ok(SplitLabel::Test),
            "Undefined" => Ok(SplitLabel::Undefined),
            other => Err(format!("unknown split label '{other}'")),
        }
    }
}

impl From<SplitLabel> for MetadataValue {
    fn from(label: SplitLabel) -> Self {
        MetadataValue::String(label.as_str().to_string())
    }
}
