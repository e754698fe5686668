use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Chart, Dataset, GraphType, Widget};

use crate::engine::measurement::{self, normal_curve, normal_pdf};
use crate::ui::theme::Theme;

const Z_RANGE: f64 = 4.0;
const SAMPLE_STEP: f64 = 0.1;
// Worked example on an IQ-style scale.
const EXAMPLE_MEAN: f64 = 100.0;
const EXAMPLE_SD: f64 = 15.0;

/// Standard normal curve with a vertical marker at `z`.
pub struct NormalCurveChart<'a> {
    pub z: f64,
    pub theme: &'a Theme,
}

impl<'a> NormalCurveChart<'a> {
    pub fn new(z: f64, theme: &'a Theme) -> Self {
        Self { z, theme }
    }
}

impl Widget for NormalCurveChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let curve = normal_curve(-Z_RANGE, Z_RANGE, SAMPLE_STEP);
        let marker = [(self.z, 0.0), (self.z, normal_pdf(self.z))];
        let peak = normal_pdf(0.0) * 1.1;

        let datasets = vec![
            Dataset::default()
                .name("N(0, 1)")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(colors.accent()))
                .data(&curve),
            Dataset::default()
                .name(format!("z = {:+.1}", self.z))
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(colors.warning()))
                .data(&marker),
        ];

        let x_labels: Vec<Span> = [-3, -2, -1, 0, 1, 2, 3]
            .iter()
            .map(|sd| Span::raw(format!("{sd}σ")))
            .collect();

        let chart = Chart::new(datasets)
            .block(
                Block::bordered()
                    .title(" Normal Distribution ")
                    .border_style(Style::default().fg(colors.border())),
            )
            .x_axis(
                Axis::default()
                    .title("z")
                    .style(Style::default().fg(colors.text_muted()))
                    .bounds([-Z_RANGE, Z_RANGE])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title("density")
                    .style(Style::default().fg(colors.text_muted()))
                    .bounds([0.0, peak])
                    .labels(vec![Span::raw("0"), Span::raw(format!("{:.2}", peak))]),
            );

        chart.render(area, buf);
    }
}

/// Formulas and the empirical rule, with the current marker's T-score.
pub fn legend_lines(z: f64, theme: &Theme) -> Vec<Line<'static>> {
    let colors = &theme.colors;
    let heading = Style::default()
        .fg(colors.accent())
        .add_modifier(Modifier::BOLD);
    let body = Style::default().fg(colors.fg());
    let muted = Style::default().fg(colors.text_muted());

    let mut lines = vec![
        Line::from(Span::styled("Formulas", heading)),
        Line::from(Span::styled("  z = (X − μ) / σ", body)),
        Line::from(Span::styled(
            format!(
                "  T = {:.0} + {:.0}z",
                measurement::T_MEAN,
                measurement::T_SD
            ),
            body,
        )),
        Line::from(""),
        Line::from(Span::styled("Current marker", heading)),
        Line::from(Span::styled(
            format!("  z = {:+.1}   T = {:.0}", z, measurement::t_score(z)),
            Style::default().fg(colors.warning()),
        )),
        Line::from(""),
        Line::from(Span::styled("Worked example (μ = 100, σ = 15)", heading)),
    ];
    let raw = EXAMPLE_MEAN + z * EXAMPLE_SD;
    if let Some(example_z) = measurement::z_score(raw, EXAMPLE_MEAN, EXAMPLE_SD) {
        lines.push(Line::from(Span::styled(
            format!("  X = {raw:.1}  →  z = ({raw:.1} − 100) / 15 = {example_z:+.2}"),
            body,
        )));
        lines.push(Line::from(Span::styled(
            format!("  T = {:.1}", measurement::t_score(example_z)),
            body,
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Empirical rule", heading)));
    for k in 1..=3u8 {
        if let Some(share) = measurement::empirical_share(k) {
            lines.push(Line::from(Span::styled(
                format!("  μ ± {k}σ  →  {:.2}%", share * 100.0),
                body,
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  [←/→] move the marker by half a standard deviation",
        muted,
    )));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legend_shows_marker_t_score() {
        let lines: Vec<String> = legend_lines(1.5, &Theme::default())
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert!(lines.iter().any(|l| l.contains("z = +1.5   T = 65")));
        assert!(lines.iter().any(|l| l.contains("68.27%")));
        assert!(lines.iter().any(|l| l.contains("99.73%")));
    }

    #[test]
    fn worked_example_converts_raw_score_back_to_marker() {
        let lines: Vec<String> = legend_lines(-1.0, &Theme::default())
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert!(lines.iter().any(|l| l.contains("X = 85.0  →  z = (85.0 − 100) / 15 = -1.00")));
        assert!(lines.iter().any(|l| l.contains("T = 40.0")));
    }

    #[test]
    fn chart_renders_into_small_area() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        NormalCurveChart::new(-2.0, &theme).render(area, &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), "┌");
    }
}
