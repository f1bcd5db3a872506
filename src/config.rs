//! Configuration for the conversion service and the slide layout.
//!
//! [`ServiceConfig`] holds everything the HTTP service needs (bind address,
//! storage directories, limits) and embeds a [`LayoutConfig`] for the PPTX
//! converter. Both are built through validating builders; the binary maps its
//! flags and `PDF2PPTX_*` environment variables onto [`ServiceConfigBuilder`].
//!
//! Lengths in [`LayoutConfig`] are EMU (English Metric Units): 914 400 per
//! inch, 12 700 per point.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// EMU per typographic point.
pub const EMU_PER_POINT: u64 = 12_700;

/// Convert points to EMU.
pub const fn pt(points: u64) -> u64 {
    points * EMU_PER_POINT
}

// ── Layout ───────────────────────────────────────────────────────────────

/// Geometry of the generated slides.
///
/// The defaults reproduce a 10 × 7.5 inch (4:3) deck with 40 pt margins and
/// 60 pt text boxes spaced 20 pt apart, at most eight per slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub slide_width: u64,
    pub slide_height: u64,
    /// Top margin; also reserved at the bottom of the slide.
    pub margin_top: u64,
    /// Left margin; also reserved at the right of the slide.
    pub margin_left: u64,
    pub box_height: u64,
    /// Vertical gap between consecutive boxes.
    pub box_spacing: u64,
    pub max_boxes_per_slide: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            slide_width: 9_144_000,
            slide_height: 6_858_000,
            margin_top: pt(40),
            margin_left: pt(40),
            box_height: pt(60),
            box_spacing: pt(20),
            max_boxes_per_slide: 8,
        }
    }
}

impl LayoutConfig {
    /// Reject geometries where a slide cannot hold a single box.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_boxes_per_slide == 0 {
            return Err(ConfigError::Invalid(
                "max_boxes_per_slide must be ≥ 1".into(),
            ));
        }
        if self.box_height == 0 {
            return Err(ConfigError::Invalid("box_height must be > 0".into()));
        }
        if self.margin_left.saturating_mul(2) >= self.slide_width {
            return Err(ConfigError::Invalid(format!(
                "horizontal margins ({} EMU each) leave no room on a {} EMU wide slide",
                self.margin_left, self.slide_width
            )));
        }
        if self.margin_top + self.box_height > self.slide_height.saturating_sub(self.margin_top) {
            return Err(ConfigError::Invalid(format!(
                "a {} EMU box does not fit between {} EMU margins on a {} EMU tall slide",
                self.box_height, self.margin_top, self.slide_height
            )));
        }
        Ok(())
    }

    /// Width of every text box.
    pub fn box_width(&self) -> u64 {
        self.slide_width - 2 * self.margin_left
    }
}

// ── Service ──────────────────────────────────────────────────────────────

/// Runtime configuration of the conversion service.
///
/// # Example
/// ```rust
/// use pdf2pptx::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .port(8080)
///     .upload_dir("/var/lib/pdf2pptx/uploads")
///     .output_dir("/var/lib/pdf2pptx/converted")
///     .build()
///     .unwrap();
/// assert_eq!(config.port, 8080);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Bind address. Default: `0.0.0.0`.
    pub host: String,
    /// Bind port. Default: `8000`.
    pub port: u16,
    /// Where raw uploads are stored as `<id>.pdf`. Default: `./uploads`.
    pub upload_dir: PathBuf,
    /// Where artifacts are written as `<id>.pptx`. Default: `./converted`.
    pub output_dir: PathBuf,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
    /// Per-request timeout in seconds. Default: 30.
    pub request_timeout_secs: u64,
    /// Largest accepted request body. Default: 50 MiB.
    pub max_upload_bytes: usize,
    /// Pause between `Processing` and the start of conversion. Default: 0.
    pub settle_delay_ms: u64,
    pub layout: LayoutConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            upload_dir: PathBuf::from("./uploads"),
            output_dir: PathBuf::from("./converted"),
            cors_origins: vec!["http://localhost:3000".into()],
            request_timeout_secs: 30,
            max_upload_bytes: 50 * 1024 * 1024,
            settle_delay_ms: 0,
            layout: LayoutConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.upload_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn cors_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.cors_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn settle_delay_ms(mut self, ms: u64) -> Self {
        self.config.settle_delay_ms = ms;
        self
    }

    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.config.layout = layout;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, ConfigError> {
        let c = &self.config;
        if c.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be ≥ 1".into(),
            ));
        }
        if c.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid("max_upload_bytes must be > 0".into()));
        }
        if c.upload_dir == c.output_dir {
            return Err(ConfigError::Invalid(format!(
                "upload_dir and output_dir must differ (both '{}')",
                c.upload_dir.display()
            )));
        }
        c.layout.validate()?;
        Ok(self.config)
    }
}
