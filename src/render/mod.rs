//! SVG output for scenes
//!
//! This module is organized into submodules:
//! - `defaults`: Default sizes and settings
//! - `svg`: Path-data builder, number formatting, element markup
//! - `bezier`: Cubic-Bezier fitting of arbitrary parametric curves

pub mod bezier;
pub mod defaults;
pub mod svg;

pub use bezier::{SampleRange, fit_cubic_path};
pub use svg::{ObjectStyle, PathCommand, PathData, fmt_num, fmt_num_precision};

use crate::types::BBox;
use svg::escape_attr;

/// Output settings for a render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Significant figures for every emitted number
    pub precision: i32,
    /// Wrap the fragments in an `<svg>` root with a `viewBox`
    pub svg_wrapper: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { precision: defaults::PRECISION, svg_wrapper: true }
    }
}

/// Assemble rendered fragments into the final document.
///
/// Fragments are emitted in the order given; empty fragments (invisible
/// entities and connections) are skipped.
pub fn document<I>(canvas: &BBox, background: Option<&str>, fragments: I, options: &RenderOptions) -> String
where
    I: IntoIterator<Item = String>,
{
    let body: Vec<String> = fragments.into_iter().filter(|f| !f.is_empty()).collect();
    if !options.svg_wrapper {
        return body.join("\n");
    }

    let n = |v: f64| fmt_num_precision(v, options.precision);
    let mut out = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{} {} {} {}\" width=\"{}\" height=\"{}\">\n",
        n(canvas.min.x),
        n(canvas.min.y),
        n(canvas.width()),
        n(canvas.height()),
        n(canvas.width()),
        n(canvas.height()),
    );
    if let Some(bg) = background {
        out.push_str(&format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>\n",
            n(canvas.min.x),
            n(canvas.min.y),
            n(canvas.width()),
            n(canvas.height()),
            escape_attr(bg)
        ));
    }
    for fragment in body {
        out.push_str(&fragment);
        out.push('\n');
    }
    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coord;

    #[test]
    fn bare_fragments_without_wrapper() {
        let canvas = BBox::from_origin_size(Coord::ZERO, 10.0, 10.0);
        let opts = RenderOptions { svg_wrapper: false, ..Default::default() };
        let out = document(&canvas, None, ["<a/>".to_string(), String::new(), "<b/>".to_string()], &opts);
        assert_eq!(out, "<a/>\n<b/>");
    }

    #[test]
    fn wrapper_has_viewbox_and_background() {
        let canvas = BBox::from_origin_size(Coord::ZERO, 200.0, 100.5);
        let out = document(&canvas, Some("white"), Vec::new(), &RenderOptions::default());
        insta::assert_snapshot!(out.trim_end(), @r###"
        <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 200 100.5" width="200" height="100.5">
        <rect x="0" y="0" width="200" height="100.5" fill="white"/>
        </svg>
        "###);
    }
}
