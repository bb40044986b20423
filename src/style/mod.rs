//! Style Resolution
//!
//! Normalizes a sparse, partially specified style record into a complete
//! `StyleConfig`. Resolution is total:
//! - unset fields take the resolver's defaults
//! - size is clamped into 128..=512 px, margin into 0..=10 modules
//! - colors are normalized to lower-case `#rrggbb`; unparseable colors
//!   fall back to the default
//! - cosmetic fields (dot / corner style, gradient, pattern, logo) are
//!   passed through and never affect the encoded bit matrix

mod color;

pub use color::normalize_hex_color;

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::qr::{EncodeOptions, ErrorCorrectionLevel};

/// Accepted symbol width in pixels
pub const SIZE_RANGE: RangeInclusive<u32> = 128..=512;
/// Accepted quiet zone in modules
pub const MARGIN_RANGE: RangeInclusive<u32> = 0..=10;

pub const DEFAULT_FOREGROUND: &str = "#000000";
pub const DEFAULT_BACKGROUND: &str = "#ffffff";
pub const DEFAULT_SIZE: u32 = 256;
pub const DEFAULT_MARGIN: u32 = 4;

// =============================================================================
// Cosmetic Options
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DotStyle {
    #[default]
    Square,
    Rounded,
    Dots,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CornerStyle {
    #[default]
    Square,
    Rounded,
    ExtraRounded,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GradientType {
    #[default]
    None,
    Linear,
    Radial,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pattern {
    #[default]
    Default,
    Dots,
    Squares,
    Rounded,
}

/// Image drawn over the center of the symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoOverlay {
    pub url: String,
    /// Percent of the symbol width
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

// =============================================================================
// Style Records
// =============================================================================

/// Complete, validated style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleConfig {
    pub foreground_color: String,
    pub background_color: String,
    pub size: u32,
    pub margin: u32,
    pub error_correction_level: ErrorCorrectionLevel,
    pub dot_style: DotStyle,
    pub corner_style: CornerStyle,
    pub gradient_type: GradientType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient_color: Option<String>,
    pub pattern: Pattern,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<LogoOverlay>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            foreground_color: DEFAULT_FOREGROUND.to_string(),
            background_color: DEFAULT_BACKGROUND.to_string(),
            size: DEFAULT_SIZE,
            margin: DEFAULT_MARGIN,
            error_correction_level: ErrorCorrectionLevel::M,
            dot_style: DotStyle::Square,
            corner_style: CornerStyle::Square,
            gradient_type: GradientType::None,
            gradient_color: None,
            pattern: Pattern::Default,
            corner_radius: None,
            logo: None,
        }
    }
}

impl StyleConfig {
    /// Options for the external encoder; cosmetic fields are not part of them
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            width: self.size,
            margin: self.margin,
            dark_color: self.foreground_color.clone(),
            light_color: self.background_color.clone(),
            error_correction_level: self.error_correction_level,
        }
    }
}

/// Sparse style as sent by a UI; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_correction_level: Option<ErrorCorrectionLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dot_style: Option<DotStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_style: Option<CornerStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient_type: Option<GradientType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_size: Option<u32>,
}

// =============================================================================
// Resolver
// =============================================================================

/// Fills a `PartialStyle` from an explicit default configuration
#[derive(Debug, Clone, Default)]
pub struct StyleResolver {
    defaults: StyleConfig,
}

impl StyleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver with a caller-supplied base; the base itself is normalized
    pub fn with_defaults(defaults: StyleConfig) -> Self {
        let normalized = StyleResolver::new().overlay(&StyleConfig::default(), &defaults.into());
        Self {
            defaults: normalized,
        }
    }

    pub fn defaults(&self) -> &StyleConfig {
        &self.defaults
    }

    pub fn resolve(&self, partial: &PartialStyle) -> StyleConfig {
        self.overlay(&self.defaults, partial)
    }

    fn overlay(&self, base: &StyleConfig, partial: &PartialStyle) -> StyleConfig {
        let size = clamp_logged("size", partial.size.unwrap_or(base.size), &SIZE_RANGE);
        let margin = clamp_logged("margin", partial.margin.unwrap_or(base.margin), &MARGIN_RANGE);

        // An empty url clears the logo; a bare size resizes the inherited one
        let logo = match (&partial.logo_url, partial.logo_size) {
            (Some(url), logo_size) if !url.is_empty() => Some(LogoOverlay {
                url: url.clone(),
                size: logo_size,
            }),
            (Some(_), _) => None,
            (None, Some(logo_size)) => base.logo.clone().map(|logo| LogoOverlay {
                size: Some(logo_size),
                ..logo
            }),
            (None, None) => base.logo.clone(),
        };

        StyleConfig {
            foreground_color: resolve_color(
                "foreground_color",
                partial.foreground_color.as_deref(),
                &base.foreground_color,
                DEFAULT_FOREGROUND,
            ),
            background_color: resolve_color(
                "background_color",
                partial.background_color.as_deref(),
                &base.background_color,
                DEFAULT_BACKGROUND,
            ),
            size,
            margin,
            error_correction_level: partial
                .error_correction_level
                .unwrap_or(base.error_correction_level),
            dot_style: partial.dot_style.unwrap_or(base.dot_style),
            corner_style: partial.corner_style.unwrap_or(base.corner_style),
            gradient_type: partial.gradient_type.unwrap_or(base.gradient_type),
            gradient_color: partial
                .gradient_color
                .clone()
                .or_else(|| base.gradient_color.clone()),
            pattern: partial.pattern.unwrap_or(base.pattern),
            corner_radius: partial.corner_radius.or(base.corner_radius),
            logo,
        }
    }
}

impl From<StyleConfig> for PartialStyle {
    fn from(style: StyleConfig) -> Self {
        let (logo_url, logo_size) = match style.logo {
            Some(logo) => (Some(logo.url), logo.size),
            None => (None, None),
        };

        Self {
            foreground_color: Some(style.foreground_color),
            background_color: Some(style.background_color),
            size: Some(style.size),
            margin: Some(style.margin),
            error_correction_level: Some(style.error_correction_level),
            dot_style: Some(style.dot_style),
            corner_style: Some(style.corner_style),
            gradient_type: Some(style.gradient_type),
            gradient_color: style.gradient_color,
            pattern: Some(style.pattern),
            corner_radius: style.corner_radius,
            logo_url,
            logo_size,
        }
    }
}

/// Resolve with the documented defaults
pub fn resolve_style(partial: &PartialStyle) -> StyleConfig {
    StyleResolver::new().resolve(partial)
}

fn clamp_logged(field: &'static str, value: u32, range: &RangeInclusive<u32>) -> u32 {
    let clamped = value.clamp(*range.start(), *range.end());
    if clamped != value {
        crate::log_debug!(
            "style",
            "Clamped out-of-range value",
            field = field,
            requested = value,
            used = clamped
        );
    }
    clamped
}

fn resolve_color(
    field: &'static str,
    requested: Option<&str>,
    base: &str,
    fallback: &str,
) -> String {
    let Some(raw) = requested else {
        return normalize_hex_color(base).unwrap_or_else(|| fallback.to_string());
    };

    match normalize_hex_color(raw) {
        Some(color) => color,
        None => {
            crate::log_debug!(
                "style",
                "Ignoring unparseable color",
                field = field,
                requested = raw
            );
            normalize_hex_color(base).unwrap_or_else(|| fallback.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_empty_gives_defaults() {
        let style = resolve_style(&PartialStyle::default());
        assert_eq!(style, StyleConfig::default());
        assert_eq!(style.foreground_color, "#000000");
        assert_eq!(style.background_color, "#ffffff");
        assert_eq!(style.size, 256);
        assert_eq!(style.margin, 4);
        assert_eq!(style.error_correction_level, ErrorCorrectionLevel::M);
        assert_eq!(style.dot_style, DotStyle::Square);
        assert_eq!(style.gradient_type, GradientType::None);
        assert!(style.logo.is_none());
    }

    #[test]
    fn test_resolve_preserves_given_size() {
        let style = resolve_style(&PartialStyle {
            size: Some(300),
            ..Default::default()
        });
        assert_eq!(style.size, 300);
        assert_eq!(
            StyleConfig {
                size: 256,
                ..style
            },
            StyleConfig::default()
        );
    }

    #[test]
    fn test_resolve_clamps_bounds() {
        let style = resolve_style(&PartialStyle {
            size: Some(4096),
            margin: Some(50),
            ..Default::default()
        });
        assert_eq!(style.size, 512);
        assert_eq!(style.margin, 10);

        let style = resolve_style(&PartialStyle {
            size: Some(0),
            ..Default::default()
        });
        assert_eq!(style.size, 128);
    }

    #[test]
    fn test_resolve_colors() {
        let style = resolve_style(&PartialStyle {
            foreground_color: Some("#1A2B3C".into()),
            background_color: Some("fff".into()),
            ..Default::default()
        });
        assert_eq!(style.foreground_color, "#1a2b3c");
        assert_eq!(style.background_color, "#ffffff");

        let style = resolve_style(&PartialStyle {
            foreground_color: Some("rebeccapurple".into()),
            ..Default::default()
        });
        assert_eq!(style.foreground_color, "#000000");
    }

    #[test]
    fn test_cosmetics_pass_through() {
        let style = resolve_style(&PartialStyle {
            dot_style: Some(DotStyle::Dots),
            corner_style: Some(CornerStyle::ExtraRounded),
            gradient_type: Some(GradientType::Radial),
            gradient_color: Some("#ff0000".into()),
            logo_url: Some("https://example.com/logo.png".into()),
            logo_size: Some(20),
            ..Default::default()
        });
        assert_eq!(style.dot_style, DotStyle::Dots);
        assert_eq!(style.corner_style, CornerStyle::ExtraRounded);
        assert_eq!(style.gradient_color.as_deref(), Some("#ff0000"));
        assert_eq!(
            style.logo,
            Some(LogoOverlay {
                url: "https://example.com/logo.png".into(),
                size: Some(20)
            })
        );
        assert_eq!(style.encode_options(), StyleConfig::default().encode_options());
    }

    fn resolver_with_logo() -> StyleResolver {
        StyleResolver::with_defaults(StyleConfig {
            logo: Some(LogoOverlay {
                url: "x.png".into(),
                size: Some(10),
            }),
            ..Default::default()
        })
    }

    #[test]
    fn test_empty_logo_url_clears_logo() {
        let resolver = resolver_with_logo();
        assert!(resolver.defaults().logo.is_some());

        let style = resolver.resolve(&PartialStyle {
            logo_url: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(style.logo, None);

        let inherited = resolver.resolve(&PartialStyle::default());
        assert_eq!(inherited.logo, resolver.defaults().logo);
    }

    #[test]
    fn test_logo_size_alone_resizes_inherited_logo() {
        let resolver = resolver_with_logo();
        let style = resolver.resolve(&PartialStyle {
            logo_size: Some(30),
            ..Default::default()
        });
        assert_eq!(
            style.logo,
            Some(LogoOverlay {
                url: "x.png".into(),
                size: Some(30)
            })
        );

        let no_logo = resolve_style(&PartialStyle {
            logo_size: Some(30),
            ..Default::default()
        });
        assert_eq!(no_logo.logo, None);
    }

    #[test]
    fn test_custom_defaults() {
        let resolver = StyleResolver::with_defaults(StyleConfig {
            foreground_color: "#00F".into(),
            size: 9999,
            ..Default::default()
        });
        assert_eq!(resolver.defaults().foreground_color, "#0000ff");
        assert_eq!(resolver.defaults().size, 512);

        let style = resolver.resolve(&PartialStyle {
            margin: Some(0),
            ..Default::default()
        });
        assert_eq!(style.foreground_color, "#0000ff");
        assert_eq!(style.margin, 0);
    }

    #[test]
    fn test_partial_from_ui_json() {
        let partial: PartialStyle = serde_json::from_str(
            r##"{"foregroundColor":"#123456","size":320,"errorCorrectionLevel":"H","cornerStyle":"extra-rounded"}"##,
        )
        .unwrap();
        let style = resolve_style(&partial);
        assert_eq!(style.foreground_color, "#123456");
        assert_eq!(style.size, 320);
        assert_eq!(style.error_correction_level, ErrorCorrectionLevel::H);
        assert_eq!(style.corner_style, CornerStyle::ExtraRounded);
    }

    #[test]
    fn test_encode_options_mapping() {
        let options = resolve_style(&PartialStyle {
            size: Some(400),
            margin: Some(2),
            ..Default::default()
        })
        .encode_options();
        assert_eq!(options.width, 400);
        assert_eq!(options.margin, 2);
        assert_eq!(options.dark_color, "#000000");
        assert_eq!(options.light_color, "#ffffff");
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let partial = PartialStyle {
            size: Some(300),
            ..Default::default()
        };
        assert_eq!(resolve_style(&partial), resolve_style(&partial));
    }
}
