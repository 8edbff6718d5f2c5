use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic color tokens shared by every view. Rendering maps these to concrete styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    Brand,
    Amber,
    Emerald,
    Green,
    Red,
    Neutral,
}

impl ColorToken {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorToken::Brand => "brand",
            ColorToken::Amber => "amber",
            ColorToken::Emerald => "emerald",
            ColorToken::Green => "green",
            ColorToken::Red => "red",
            ColorToken::Neutral => "neutral",
        }
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
