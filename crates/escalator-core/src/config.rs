#![forbid(unsafe_code)]

//! Escalator configuration.
//!
//! Geometry and tuning knobs for a table. Values are plain pixels (`f64`).
//! Overscan (how many rows/columns beyond the visible window stay
//! materialized) is a performance parameter, not a correctness contract, so
//! it is exposed here and can be overridden from the environment.

use crate::error::{EscalatorError, Result};
use crate::section::Section;

/// Environment variable overriding [`EscalatorConfig::row_overscan`].
pub const ENV_ROW_OVERSCAN: &str = "ESCALATOR_ROW_OVERSCAN";
/// Environment variable overriding [`EscalatorConfig::column_overscan`].
pub const ENV_COLUMN_OVERSCAN: &str = "ESCALATOR_COLUMN_OVERSCAN";
/// Environment variable overriding the default row height of every section.
pub const ENV_ROW_HEIGHT: &str = "ESCALATOR_ROW_HEIGHT";
/// Environment variable overriding [`EscalatorConfig::char_width`].
pub const ENV_CHAR_WIDTH: &str = "ESCALATOR_CHAR_WIDTH";
/// Environment variable overriding [`EscalatorConfig::cell_padding`].
pub const ENV_CELL_PADDING: &str = "ESCALATOR_CELL_PADDING";

/// Width given to newly inserted columns.
pub const DEFAULT_COLUMN_WIDTH: f64 = 100.0;
/// Default row height of every section.
pub const DEFAULT_ROW_HEIGHT: f64 = 20.0;

/// How the widget height is determined.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum HeightMode {
    /// The height set through `set_size` is used as is.
    #[default]
    Fixed,
    /// The body is sized to show this many rows (fractions allowed); the
    /// widget height follows header/footer/body row height changes.
    Rows(f64),
}

/// Table geometry and tuning parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EscalatorConfig {
    /// Widget width in pixels.
    pub width: f64,
    /// Widget height in pixels (header + body viewport + footer).
    pub height: f64,
    pub header_row_height: f64,
    pub body_row_height: f64,
    pub footer_row_height: f64,
    /// Extra body rows kept materialized above and below the visible rows.
    pub row_overscan: usize,
    /// Extra unfrozen columns kept materialized left and right of the
    /// visible ones.
    pub column_overscan: usize,
    /// Pixel width of one terminal column of text, used for auto widths.
    pub char_width: f64,
    /// Horizontal padding added to measured auto widths.
    pub cell_padding: f64,
    pub height_mode: HeightMode,
}

impl Default for EscalatorConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
            header_row_height: DEFAULT_ROW_HEIGHT,
            body_row_height: DEFAULT_ROW_HEIGHT,
            footer_row_height: DEFAULT_ROW_HEIGHT,
            row_overscan: 2,
            column_overscan: 1,
            char_width: 8.0,
            cell_padding: 16.0,
            height_mode: HeightMode::Fixed,
        }
    }
}

impl EscalatorConfig {
    /// Default configuration with environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Default configuration with overrides from a custom lookup (for tests).
    ///
    /// Unparsable or out-of-domain values are ignored.
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(rows) = env_usize(&get_env, ENV_ROW_OVERSCAN) {
            config.row_overscan = rows;
        }
        if let Some(columns) = env_usize(&get_env, ENV_COLUMN_OVERSCAN) {
            config.column_overscan = columns;
        }
        if let Some(height) = env_px(&get_env, ENV_ROW_HEIGHT).filter(|h| *h > 0.0) {
            config.header_row_height = height;
            config.body_row_height = height;
            config.footer_row_height = height;
        }
        if let Some(width) = env_px(&get_env, ENV_CHAR_WIDTH) {
            config.char_width = width;
        }
        if let Some(padding) = env_px(&get_env, ENV_CELL_PADDING) {
            config.cell_padding = padding;
        }
        config
    }

    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_row_height(mut self, section: Section, height: f64) -> Self {
        match section {
            Section::Header => self.header_row_height = height,
            Section::Body => self.body_row_height = height,
            Section::Footer => self.footer_row_height = height,
        }
        self
    }

    #[must_use]
    pub fn with_row_overscan(mut self, rows: usize) -> Self {
        self.row_overscan = rows;
        self
    }

    #[must_use]
    pub fn with_column_overscan(mut self, columns: usize) -> Self {
        self.column_overscan = columns;
        self
    }

    #[must_use]
    pub fn with_text_metrics(mut self, char_width: f64, cell_padding: f64) -> Self {
        self.char_width = char_width;
        self.cell_padding = cell_padding;
        self
    }

    #[must_use]
    pub fn with_height_mode(mut self, mode: HeightMode) -> Self {
        self.height_mode = mode;
        self
    }

    /// Row height configured for `section`.
    #[must_use]
    pub fn row_height(&self, section: Section) -> f64 {
        match section {
            Section::Header => self.header_row_height,
            Section::Body => self.body_row_height,
            Section::Footer => self.footer_row_height,
        }
    }

    /// Check every field against its domain.
    pub fn validate(&self) -> Result<()> {
        check_non_negative("width", self.width)?;
        check_non_negative("height", self.height)?;
        for section in Section::ALL {
            check_positive("row height", self.row_height(section))?;
        }
        check_non_negative("char width", self.char_width)?;
        check_non_negative("cell padding", self.cell_padding)?;
        if let HeightMode::Rows(rows) = self.height_mode {
            check_positive("height by rows", rows)?;
        }
        Ok(())
    }
}

/// `Ok` if `value` is finite and `>= 0`.
pub fn check_non_negative(what: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EscalatorError::InvalidDimension { what, value })
    }
}

/// `Ok` if `value` is finite and `> 0`.
pub fn check_positive(what: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EscalatorError::InvalidDimension { what, value })
    }
}

fn env_usize<F>(get_env: &F, key: &str) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    get_env(key).and_then(|value| value.trim().parse().ok())
}

fn env_px<F>(get_env: &F, key: &str) -> Option<f64>
where
    F: Fn(&str) -> Option<String>,
{
    get_env(key)
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|px| px.is_finite() && *px >= 0.0)
}
