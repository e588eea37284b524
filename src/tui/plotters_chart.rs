//! Plotters-powered price history chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

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
/// All series and bounds are computed outside the render call, keeping
/// `render()` focused on drawing.
pub struct PriceChart<'a> {
    /// Daily observed prices, x in elapsed days.
    pub history: &'a [(f64, f64)],
    /// Fitted trend line across the x range.
    pub trend: &'a [(f64, f64)],
    /// Predicted point, if a prediction is active.
    pub prediction: Option<(f64, f64)>,
    /// X bounds (elapsed days).
    pub x_bounds: [f64; 2],
    /// Y bounds (price).
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: String,
    /// Formatting of tick labels.
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for PriceChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
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

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are noise at terminal resolution; axes + labels only.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(&self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let history_color = WHITE;
            let trend_color = RGBColor(0, 255, 255); // cyan
            let prediction_color = RGBColor(0, 255, 0); // green

            chart.draw_series(LineSeries::new(self.history.iter().copied(), &history_color))?;
            chart.draw_series(LineSeries::new(self.trend.iter().copied(), &trend_color))?;

            // `Circle` radii are mis-scaled by the ratatui backend; a pixel reads
            // cleanly as a dot.
            if let Some(p) = self.prediction {
                chart.draw_series(std::iter::once(Pixel::new(p, prediction_color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
