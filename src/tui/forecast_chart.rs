//! Forecast price-path chart for the TUI.
//!
//! Drawn with Plotters through `plotters-ratatui-backend` rather than
//! Ratatui's built-in `Chart`: Plotters handles axes and tick labels for us,
//! and the same chart description could later target a PNG/SVG backend for
//! report output.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// The widget is intentionally data-driven: all series and bounds are computed
/// outside the render call. This keeps `render()` focused on drawing.
pub struct ForecastChart<'a> {
    /// Line series through the predicted prices, x = months ahead.
    pub line: &'a [(f64, f64)],
    /// The requested month's prediction, highlighted separately.
    pub anchor: &'a [(f64, f64)],
    /// X bounds (months ahead of the requested month).
    pub x_bounds: [f64; 2],
    /// Y bounds (USD per barrel).
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
}

impl<'a> Widget for ForecastChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters cannot lay out a chart in a handful of cells; show a hint
        // instead of failing the draw.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        // `widget_fn` keeps the backend's internal types out of this module;
        // the closure only sees a Plotters drawing area.
        let widget = widget_fn(move |root| {
            // Label areas are sized in terminal cells, so keep them tight.
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Axes + tick labels, mesh lines disabled to reduce clutter in
            // low-resolution terminal rendering.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:+.0}"))
                .y_label_formatter(&|v| format!("{v:.1}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let line_color = RGBColor(0, 255, 255); // cyan
            let anchor_color = RGBColor(0, 255, 0); // green

            chart.draw_series(LineSeries::new(self.line.iter().copied(), &line_color))?;
            chart.draw_series(
                self.line
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), WHITE)),
            )?;

            // The anchor is a colored `Pixel`, not a `Circle`: the terminal
            // backend misinterprets circle radii (pixel radius read as
            // normalized canvas units) and blows them up to screen size.
            chart.draw_series(
                self.anchor
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), anchor_color)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
