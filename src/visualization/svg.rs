// file: src/visualization/svg.rs
// description: minimal SVG document builder for static charts
// reference: https://www.w3.org/TR/SVG11/

use crate::error::{PipelineError, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(&self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextStyle {
    pub size: f64,
    pub anchor: Anchor,
    pub bold: bool,
    pub fill: String,
    /// Rotation in degrees around the anchor point.
    pub rotate: Option<f64>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 12.0,
            anchor: Anchor::Start,
            bold: false,
            fill: "#000000".to_string(),
            rotate: None,
        }
    }
}

impl TextStyle {
    pub fn sized(size: f64) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn rotate(mut self, degrees: f64) -> Self {
        self.rotate = Some(degrees);
        self
    }
}

#[derive(Debug, Clone)]
pub struct SvgCanvas {
    width: f64,
    height: f64,
    body: String,
}

impl SvgCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        let mut canvas = Self {
            width,
            height,
            body: String::new(),
        };
        canvas.rect(0.0, 0.0, width, height, "#ffffff", None);
        canvas
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, stroke: Option<&str>) {
        let _ = write!(
            self.body,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}""#,
            x,
            y,
            w.max(0.0),
            h.max(0.0),
            escape(fill)
        );
        if let Some(stroke) = stroke {
            let _ = write!(self.body, r#" stroke="{}""#, escape(stroke));
        }
        self.body.push_str("/>\n");
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str, stroke: &str, opacity: f64) {
        let _ = writeln!(
            self.body,
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" fill-opacity="{:.3}" stroke="{}" stroke-width="0.5"/>"#,
            cx,
            cy,
            r,
            escape(fill),
            opacity,
            escape(stroke)
        );
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, width: f64) {
        let _ = writeln!(
            self.body,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.2}"/>"#,
            x1,
            y1,
            x2,
            y2,
            escape(stroke),
            width
        );
    }

    /// Quadratic Bézier from `from` to `to` bent through `control`.
    pub fn curve(
        &mut self,
        from: (f64, f64),
        control: (f64, f64),
        to: (f64, f64),
        stroke: &str,
        width: f64,
        opacity: f64,
    ) {
        let _ = writeln!(
            self.body,
            r#"<path d="M {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}" fill="none" stroke="{}" stroke-width="{:.2}" stroke-opacity="{:.3}"/>"#,
            from.0,
            from.1,
            control.0,
            control.1,
            to.0,
            to.1,
            escape(stroke),
            width,
            opacity
        );
    }

    pub fn polygon(&mut self, points: &[(f64, f64)], fill: &str, opacity: f64) {
        if points.is_empty() {
            return;
        }
        let coords = points
            .iter()
            .map(|(x, y)| format!("{:.2},{:.2}", x, y))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(
            self.body,
            r#"<polygon points="{}" fill="{}" fill-opacity="{:.3}" stroke="{}" stroke-opacity="{:.3}"/>"#,
            coords,
            escape(fill),
            opacity,
            escape(fill),
            (opacity * 2.0).min(1.0)
        );
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, style: &TextStyle) {
        let _ = write!(
            self.body,
            r#"<text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="{:.1}" text-anchor="{}" fill="{}""#,
            x,
            y,
            style.size,
            style.anchor.as_str(),
            escape(&style.fill)
        );
        if style.bold {
            self.body.push_str(r#" font-weight="bold""#);
        }
        if let Some(degrees) = style.rotate {
            let _ = write!(self.body, r#" transform="rotate({:.1} {:.2} {:.2})""#, degrees, x, y);
        }
        let _ = writeln!(self.body, ">{}</text>", escape(content));
    }

    pub fn title(&mut self, content: &str) {
        let style = TextStyle::sized(16.0).anchor(Anchor::Middle).bold();
        self.text(self.width / 2.0, 24.0, content, &style);
    }

    pub fn render(&self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = self.width,
            h = self.height,
            body = self.body
        )
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| PipelineError::file_operation(parent, e))?;
        }
        fs::write(path, self.render()).map_err(|e| PipelineError::file_operation(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_escape() {
        assert_eq!(escape("A & B <c> \"d\""), "A &amp; B &lt;c&gt; &quot;d&quot;");
    }

    #[test]
    fn test_render_elements() {
        let mut canvas = SvgCanvas::new(200.0, 100.0);
        canvas.circle(10.0, 20.0, 5.0, "#ff0000", "#000000", 0.9);
        canvas.text(50.0, 50.0, "Risk & Resilience", &TextStyle::sized(9.0).bold());
        canvas.title("Map");

        let svg = canvas.render();
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"200\""));
        assert!(svg.contains(r#"<circle cx="10.00" cy="20.00" r="5.00""#));
        assert!(svg.contains(">Risk &amp; Resilience</text>"));
        assert!(svg.contains(r#"font-weight="bold""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_save_creates_parent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("charts/out.svg");
        SvgCanvas::new(10.0, 10.0).save(&path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("<rect"));
    }
}
