//! Domain tags.
//!
//! A domain tag is a short label chosen by the caller ("math", "mun", ...)
//! that selects which prompt template and which canned fallback text apply.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The known domains, plus a catch-all for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Math,
    Programming,
    Writing,
    Dialogue,
    /// Model United Nations / diplomacy
    Mun,
    /// Any unrecognized tag
    General,
}

impl Domain {
    /// The five tags that have dedicated templates.
    pub const KNOWN: [Domain; 5] = [
        Domain::Math,
        Domain::Programming,
        Domain::Writing,
        Domain::Dialogue,
        Domain::Mun,
    ];

    /// Resolve a caller-supplied tag.
    ///
    /// Matching is exact: `"Math"` or `" math"` resolve to [`Domain::General`].
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "math" => Domain::Math,
            "programming" => Domain::Programming,
            "writing" => Domain::Writing,
            "dialogue" => Domain::Dialogue,
            "mun" => Domain::Mun,
            _ => Domain::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Math => "math",
            Domain::Programming => "programming",
            Domain::Writing => "writing",
            Domain::Dialogue => "dialogue",
            Domain::Mun => "mun",
            Domain::General => "general",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Domain::General)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
