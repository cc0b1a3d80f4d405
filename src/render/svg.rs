//! SVG markup primitives: path data builder, number formatting, elements

use std::fmt;

use super::defaults;
use crate::types::Coord;

/// Format a number with `sig_figs` significant figures, trailing zeros trimmed
/// (C `%g` style).
pub fn fmt_num_precision(value: f64, sig_figs: i32) -> String {
    // anything this small is floating-point noise from trig round trips
    if value.abs() < 1e-9 || !value.is_finite() {
        return "0".to_string();
    }

    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10_f64.powi(sig_figs - 1 - magnitude);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 {
        return "0".to_string();
    }

    let decimals = (sig_figs - 1 - magnitude).max(0) as usize;
    let s = format!("{:.prec$}", rounded, prec = decimals);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s.as_str()
    };
    s.to_string()
}

/// Format with the default precision.
pub fn fmt_num(value: f64) -> String {
    fmt_num_precision(value, defaults::PRECISION)
}

/// A single path command in absolute coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Coord),
    LineTo(Coord),
    QuadTo(Coord, Coord),
    CubicTo(Coord, Coord, Coord),
    ArcTo {
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        to: Coord,
    },
    Close,
}

/// Fluent builder for the `d` attribute of an SVG `<path>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathData {
    commands: Vec<PathCommand>,
}

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn m(mut self, x: f64, y: f64) -> Self {
        self.commands.push(PathCommand::MoveTo(Coord::new(x, y)));
        self
    }

    pub fn l(mut self, x: f64, y: f64) -> Self {
        self.commands.push(PathCommand::LineTo(Coord::new(x, y)));
        self
    }

    pub fn q(mut self, cx: f64, cy: f64, x: f64, y: f64) -> Self {
        self.commands
            .push(PathCommand::QuadTo(Coord::new(cx, cy), Coord::new(x, y)));
        self
    }

    pub fn c(mut self, c1: Coord, c2: Coord, to: Coord) -> Self {
        self.commands.push(PathCommand::CubicTo(c1, c2, to));
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn a(
        mut self,
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    ) -> Self {
        self.commands.push(PathCommand::ArcTo {
            rx,
            ry,
            rotation,
            large_arc,
            sweep,
            to: Coord::new(x, y),
        });
        self
    }

    pub fn z(mut self) -> Self {
        self.commands.push(PathCommand::Close);
        self
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Serialize with an explicit number precision.
    pub fn to_string_with(&self, sig_figs: i32) -> String {
        let n = |v: f64| fmt_num_precision(v, sig_figs);
        let pt = |p: Coord| format!("{},{}", n(p.x), n(p.y));
        let parts: Vec<String> = self
            .commands
            .iter()
            .map(|cmd| match *cmd {
                PathCommand::MoveTo(p) => format!("M{}", pt(p)),
                PathCommand::LineTo(p) => format!("L{}", pt(p)),
                PathCommand::QuadTo(c, p) => format!("Q{} {}", pt(c), pt(p)),
                PathCommand::CubicTo(c1, c2, p) => format!("C{} {} {}", pt(c1), pt(c2), pt(p)),
                PathCommand::ArcTo { rx, ry, rotation, large_arc, sweep, to } => format!(
                    "A{},{} {} {},{} {}",
                    n(rx),
                    n(ry),
                    n(rotation),
                    large_arc as u8,
                    sweep as u8,
                    pt(to)
                ),
                PathCommand::Close => "Z".to_string(),
            })
            .collect();
        parts.join(" ")
    }
}

impl fmt::Display for PathData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(defaults::PRECISION))
    }
}

/// Minimal presentation attributes carried by every drawable.
///
/// Colour and palette handling live outside this crate; these strings are
/// emitted verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectStyle {
    pub stroke: String,
    pub fill: String,
    pub stroke_width: f64,
    /// Dash length; `None` draws a solid stroke.
    pub dashed: Option<f64>,
    pub invisible: bool,
}

impl Default for ObjectStyle {
    fn default() -> Self {
        Self {
            stroke: defaults::STROKE.to_string(),
            fill: "none".to_string(),
            stroke_width: defaults::STROKE_WIDTH,
            dashed: None,
            invisible: false,
        }
    }
}

impl ObjectStyle {
    /// Render the presentation attributes, with a leading space.
    pub fn attrs(&self, sig_figs: i32) -> String {
        let mut out = format!(
            " fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"",
            escape_attr(&self.fill),
            escape_attr(&self.stroke),
            fmt_num_precision(self.stroke_width, sig_figs)
        );
        if let Some(dash) = self.dashed {
            let d = fmt_num_precision(dash, sig_figs);
            out.push_str(&format!(" stroke-dasharray=\"{},{}\"", d, d));
        }
        out
    }
}

/// Escape the characters that would break a double-quoted attribute.
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// `<path d="..."/>`
pub fn path_element(d: &str, style: &ObjectStyle, sig_figs: i32) -> String {
    format!("<path d=\"{}\"{}/>", d, style.attrs(sig_figs))
}

/// `<circle .../>`
pub fn circle_element(center: Coord, r: f64, style: &ObjectStyle, sig_figs: i32) -> String {
    let n = |v: f64| fmt_num_precision(v, sig_figs);
    format!(
        "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"{}/>",
        n(center.x),
        n(center.y),
        n(r),
        style.attrs(sig_figs)
    )
}

/// `<polygon points="..."/>` filled with `fill`
pub fn polygon_element(points: &[Coord], fill: &str, sig_figs: i32) -> String {
    let n = |v: f64| fmt_num_precision(v, sig_figs);
    let pts: Vec<String> = points.iter().map(|p| format!("{},{}", n(p.x), n(p.y))).collect();
    format!("<polygon points=\"{}\" fill=\"{}\"/>", pts.join(" "), escape_attr(fill))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_num_trims_trailing_zeros() {
        assert_eq!(fmt_num(100.0), "100");
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(fmt_num(-12.25), "-12.25");
        assert_eq!(fmt_num(1.0 / 3.0), "0.333333");
        assert_eq!(fmt_num(-0.0), "0");
        assert_eq!(fmt_num(6.123233995736766e-16), "0");
        assert_eq!(fmt_num(0.00125), "0.00125");
    }

    #[test]
    fn fmt_num_rounds_tiny_noise_to_zero_in_context() {
        // cos(pi/2) noise prints as an exponent-free small number
        assert_eq!(fmt_num_precision(6.123233995736766e-16 + 10.0, 6), "10");
    }

    #[test]
    fn path_data_serialization() {
        let d = PathData::new()
            .m(0.0, 0.0)
            .l(100.0, 50.0)
            .q(10.0, 20.0, 30.0, 40.0)
            .c(Coord::new(1.0, 2.0), Coord::new(3.0, 4.0), Coord::new(5.0, 6.0))
            .a(5.0, 5.0, 0.0, false, true, 10.0, 0.0)
            .z();
        assert_eq!(
            d.to_string(),
            "M0,0 L100,50 Q10,20 30,40 C1,2 3,4 5,6 A5,5 0 0,1 10,0 Z"
        );
    }

    #[test]
    fn style_attrs_escape_and_dash() {
        let style = ObjectStyle {
            stroke: "a\"b".to_string(),
            dashed: Some(4.0),
            ..Default::default()
        };
        let attrs = style.attrs(6);
        assert!(attrs.contains("stroke=\"a&quot;b\""));
        assert!(attrs.contains("stroke-dasharray=\"4,4\""));
    }

    #[test]
    fn polygon_markup() {
        let s = polygon_element(&[Coord::new(0.0, 0.0), Coord::new(1.5, 2.0)], "red", 6);
        assert_eq!(s, "<polygon points=\"0,0 1.5,2\" fill=\"red\"/>");
    }
}
