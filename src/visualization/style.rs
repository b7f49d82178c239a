// file: src/visualization/style.rs
// description: node sizing, edge styling and color palettes for the network maps
// reference: seaborn "hls" palette, matplotlib tab10

use crate::error::{PipelineError, Result};
use std::fmt;
use std::str::FromStr;

pub const TAB10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const STRONG_EDGE: f64 = 0.3;
const EDGE_POWER: f64 = 2.5;

/// How keyword node sizes are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingMode {
    Frequency,
    CoOccurrence,
    Uniform,
}

impl FromStr for SizingMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "frequency" => Ok(SizingMode::Frequency),
            "co-occurrence" | "co_occurrence" | "cooccurrence" => Ok(SizingMode::CoOccurrence),
            "uniform" => Ok(SizingMode::Uniform),
            other => Err(PipelineError::Validation(format!(
                "Unsupported sizing mode: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for SizingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SizingMode::Frequency => "frequency",
            SizingMode::CoOccurrence => "co-occurrence",
            SizingMode::Uniform => "uniform",
        };
        write!(f, "{}", name)
    }
}

/// Marker area in three frequency bands.
pub fn bucket_size(freq: usize, scale: f64) -> f64 {
    let base = if freq < 3 {
        50.0
    } else if freq < 15 {
        200.0
    } else {
        900.0
    };
    (base * scale).trunc()
}

pub fn font_size_from_node_size(size: f64) -> f64 {
    (size / 60.0).trunc().clamp(6.0, 16.0)
}

/// Log-scaled marker diameter for co-occurrence sizing.
pub fn log_marker_size(value: f64) -> f64 {
    ((value + 1.0).ln() * 10.0).clamp(0.5, 60.0)
}

/// Radius in pixels for a marker area.
pub fn radius_from_area(area: f64) -> f64 {
    area.max(0.0).sqrt() / 2.0
}

fn edge_scale(weight: f64, strong_scale: f64, weak_scale: f64) -> f64 {
    if weight >= STRONG_EDGE {
        strong_scale
    } else {
        weak_scale
    }
}

/// Line width for a normalised edge weight, never below 0.5.
pub fn compute_thickness(weight: f64, strong_scale: f64, weak_scale: f64) -> f64 {
    let scaled = 0.5 + weight.powf(EDGE_POWER) * 10.0;
    (scaled * edge_scale(weight, strong_scale, weak_scale)).max(0.5)
}

/// Stroke opacity for a normalised edge weight, capped at 1.
pub fn compute_opacity(weight: f64, strong_scale: f64, weak_scale: f64) -> f64 {
    let scaled = 0.1 + weight.powf(EDGE_POWER) * 2.0;
    (scaled * edge_scale(weight, strong_scale, weak_scale)).min(1.0)
}

fn hls_channel(m1: f64, m2: f64, hue: f64) -> f64 {
    let hue = hue.rem_euclid(1.0);
    if hue < 1.0 / 6.0 {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < 2.0 / 3.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
    } else {
        m1
    }
}

pub fn hls_to_hex(h: f64, l: f64, s: f64) -> String {
    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let m1 = 2.0 * l - m2;
        (
            hls_channel(m1, m2, h + 1.0 / 3.0),
            hls_channel(m1, m2, h),
            hls_channel(m1, m2, h - 1.0 / 3.0),
        )
    };
    let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02x}{:02x}{:02x}", byte(r), byte(g), byte(b))
}

/// `n` evenly spaced hues at fixed lightness and saturation.
pub fn hls_palette(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let hue = (i as f64 / n as f64 + 0.01).fract();
            hls_to_hex(hue, 0.6, 0.65)
        })
        .collect()
}

pub fn tab10(i: usize) -> &'static str {
    TAB10[i % TAB10.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bucket_size() {
        assert_eq!(bucket_size(1, 1.0), 50.0);
        assert_eq!(bucket_size(3, 1.0), 200.0);
        assert_eq!(bucket_size(15, 1.0), 900.0);
        assert_eq!(bucket_size(2, 0.8), 40.0);
    }

    #[test]
    fn test_font_size_clamped() {
        assert_eq!(font_size_from_node_size(50.0), 6.0);
        assert_eq!(font_size_from_node_size(720.0), 12.0);
        assert_eq!(font_size_from_node_size(5000.0), 16.0);
    }

    #[test]
    fn test_edge_curves() {
        assert_eq!(compute_thickness(0.0, 1.0, 1.0), 0.5);
        assert!((compute_thickness(1.0, 1.0, 1.0) - 10.5).abs() < 1e-9);
        assert_eq!(compute_thickness(1.0, 2.0, 1.0), 21.0);
        assert!((compute_opacity(0.0, 1.0, 1.0) - 0.1).abs() < 1e-9);
        assert_eq!(compute_opacity(1.0, 1.0, 1.0), 1.0);
        // weak edges take the weak scale
        assert!((compute_opacity(0.2, 1.0, 0.5) - compute_opacity(0.2, 1.0, 1.0) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_hls_palette() {
        let palette = hls_palette(3);
        assert_eq!(palette.len(), 3);
        assert_eq!(palette[0], "#db5f57");
        assert_ne!(palette[1], palette[2]);
        assert_eq!(hls_to_hex(0.0, 1.0, 0.0), "#ffffff");
    }

    #[test]
    fn test_sizing_mode_parse() {
        assert_eq!("frequency".parse::<SizingMode>().unwrap(), SizingMode::Frequency);
        assert_eq!("co-occurrence".parse::<SizingMode>().unwrap(), SizingMode::CoOccurrence);
        assert_eq!(SizingMode::CoOccurrence.to_string(), "co-occurrence");
        assert!("area".parse::<SizingMode>().is_err());
        assert_eq!(tab10(11), "#ff7f0e");
    }
}
