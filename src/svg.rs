// src/svg.rs

//! SVG output for the scatterplot and the file panel.

use crate::color::{to_hex, Color};
use crate::scatter::Scene;
use std::fmt;

/// A [`Scene`] formatted as a standalone SVG document.
pub struct SvgScene<'a>(pub &'a Scene);

impl fmt::Display for SvgScene<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scene = self.0;
        let layout = scene.layout;
        let (pw, ph) = (layout.plot_width(), layout.plot_height());

        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" font-family="sans-serif">"#,
            layout.width, layout.height
        )?;
        writeln!(
            f,
            r#"<g transform="translate({}, {})">"#,
            layout.margin.left, layout.margin.top
        )?;
        writeln!(
            f,
            r#"<text x="{}" y="-10" text-anchor="middle" font-size="20" font-weight="bold">{}</text>"#,
            pw / 2.0,
            escape(scene.title)
        )?;

        writeln!(f, r##"<g class="gridlines" stroke="#ddd">"##)?;
        for y in &scene.gridlines {
            writeln!(f, r#"<line x1="0" x2="{pw}" y1="{y}" y2="{y}"/>"#)?;
        }
        writeln!(f, "</g>")?;

        writeln!(
            f,
            r##"<g class="x-axis" transform="translate(0, {ph})"><line x1="0" x2="{pw}" stroke="#333"/>"##
        )?;
        for tick in &scene.x_ticks {
            writeln!(
                f,
                r#"<text transform="translate({}, 16) rotate(-30)" text-anchor="end" font-size="12">{}</text>"#,
                tick.position,
                escape(&tick.label)
            )?;
        }
        writeln!(f, "</g>")?;

        writeln!(f, r##"<g class="y-axis"><line y1="0" y2="{ph}" stroke="#333"/>"##)?;
        for tick in &scene.y_ticks {
            writeln!(
                f,
                r#"<text x="-8" y="{}" dy="0.32em" text-anchor="end" font-size="10">{}</text>"#,
                tick.position,
                escape(&tick.label)
            )?;
        }
        writeln!(f, "</g>")?;

        if let Some(rect) = &scene.brush {
            writeln!(
                f,
                r##"<rect class="selection" x="{}" y="{}" width="{}" height="{}" fill="#777" fill-opacity="0.3" stroke="#fff"/>"##,
                rect.x0,
                rect.y0,
                rect.x1 - rect.x0,
                rect.y1 - rect.y0
            )?;
        }

        writeln!(f, r#"<g class="dots">"#)?;
        for mark in &scene.marks {
            writeln!(
                f,
                r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" fill-opacity="{}"><title>{}</title></circle>"#,
                mark.x,
                mark.y,
                mark.r,
                to_hex(mark.fill),
                mark.opacity,
                escape(&mark.label)
            )?;
        }
        writeln!(f, "</g>")?;

        if let Some(text) = scene.placeholder {
            writeln!(
                f,
                r##"<text x="{}" y="{}" text-anchor="middle" fill="#888">{}</text>"##,
                pw / 2.0,
                ph / 2.0,
                escape(text)
            )?;
        }

        if let Some(tooltip) = &scene.tooltip {
            let (x, y) = tooltip.position;
            let c = &tooltip.content;
            writeln!(f, r#"<g class="tooltip" transform="translate({x}, {y})">"#)?;
            writeln!(
                f,
                r##"<rect width="240" height="74" rx="6" fill="#fff" fill-opacity="0.9" stroke="#ccc"/>"##
            )?;
            let rows = [
                ("Commit", c.id.as_str()),
                ("Date", c.date.as_str()),
                ("Author", c.author.as_str()),
            ];
            for (i, (label, value)) in rows.iter().enumerate() {
                writeln!(
                    f,
                    r#"<text x="8" y="{}" font-size="11">{}: {}</text>"#,
                    18 + i * 16,
                    label,
                    escape(value)
                )?;
            }
            writeln!(f, r#"<text x="8" y="66" font-size="11">Lines: {}</text>"#, c.lines)?;
            writeln!(f, "</g>")?;
        }

        writeln!(f, "</g>")?;
        write!(f, "</svg>")
    }
}

const UNIT: f64 = 8.0;
const UNITS_PER_ROW: usize = 40;
const LABEL_WIDTH: f64 = 240.0;

/// File composition panel: one labelled row per file, one dot per line.
pub struct SvgFilePanel<'a>(pub &'a [(String, Vec<Color>)]);

impl fmt::Display for SvgFilePanel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<usize> = self
            .0
            .iter()
            .map(|(_, units)| units.len().div_ceil(UNITS_PER_ROW).max(1))
            .collect();
        let height = rows.iter().sum::<usize>() as f64 * UNIT + self.0.len() as f64 * UNIT + UNIT;
        let width = LABEL_WIDTH + UNITS_PER_ROW as f64 * UNIT;

        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" font-family="monospace">"#
        )?;
        if self.0.is_empty() {
            writeln!(
                f,
                r#"<text x="8" y="16" font-size="12">{}</text>"#,
                crate::views::NO_FILES
            )?;
        }

        let mut top = UNIT;
        for ((name, units), row_count) in self.0.iter().zip(&rows) {
            writeln!(
                f,
                r#"<text x="0" y="{}" font-size="11">{} ({} lines)</text>"#,
                top + UNIT - 1.0,
                escape(name),
                units.len()
            )?;
            for (i, color) in units.iter().enumerate() {
                let cx = LABEL_WIDTH + (i % UNITS_PER_ROW) as f64 * UNIT + UNIT / 2.0;
                let cy = top + (i / UNITS_PER_ROW) as f64 * UNIT + UNIT / 2.0;
                writeln!(
                    f,
                    r#"<circle cx="{cx}" cy="{cy}" r="{}" fill="{}"/>"#,
                    UNIT / 2.0 - 1.0,
                    to_hex(*color)
                )?;
            }
            top += *row_count as f64 * UNIT + UNIT;
        }
        write!(f, "</svg>")
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::Selection;
    use crate::config::{LayoutConfig, TransitionConfig};
    use crate::scatter::Scatterplot;
    use palette::Srgb;
    use std::time::Instant;

    #[test]
    fn empty_plot_has_placeholder_and_axes() {
        let plot = Scatterplot::new(LayoutConfig::default(), TransitionConfig::default());
        let scene = plot.scene(Instant::now(), &Selection::Empty);
        let svg = SvgScene(&scene).to_string();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("No commit data available"));
        assert!(svg.contains(">12:00<"));
        assert!(!svg.contains("<circle"));
    }

    #[test]
    fn file_panel_has_one_dot_per_line() {
        let red = Srgb::new(255, 0, 0);
        let panel = vec![
            ("src/<main>.js".to_string(), vec![red; 3]),
            ("style.css".to_string(), vec![red]),
        ];
        let svg = SvgFilePanel(&panel).to_string();
        assert_eq!(svg.matches("<circle").count(), 4);
        assert!(svg.contains("src/&lt;main&gt;.js (3 lines)"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"a<b>&"c""#), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
