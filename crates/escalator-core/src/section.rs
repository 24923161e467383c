#![forbid(unsafe_code)]

//! Table sections.

use std::fmt;

/// One of the three row containers of a table.
///
/// Header and footer are static: all of their rows are materialized. The body
/// is virtualized and is the only section that can carry spacers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Header,
    Body,
    Footer,
}

impl Section {
    /// All sections in render order.
    pub const ALL: [Section; 3] = [Section::Header, Section::Body, Section::Footer];

    /// Stable lowercase name (used in logs and scripts).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Body => "body",
            Self::Footer => "footer",
        }
    }

    /// Parse a section name as produced by [`Section::as_str`].
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "header" | "head" | "thead" => Some(Self::Header),
            "body" | "tbody" => Some(Self::Body),
            "footer" | "foot" | "tfoot" => Some(Self::Footer),
            _ => None,
        }
    }

    /// Whether every logical row of this section is always materialized.
    #[must_use]
    pub const fn is_static(self) -> bool {
        !matches!(self, Self::Body)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
