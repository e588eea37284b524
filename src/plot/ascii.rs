//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for snapshot tests)
//!
//! Plot elements:
//! - observed daily prices: `o`
//! - fitted trend: `-` line
//! - optional predicted point: `P`

use crate::domain::{Material, Prediction, Series};
use crate::models::ModelSet;

/// Render one material's history with its fitted trend.
///
/// When a prediction is supplied the x-axis is stretched to include it and the
/// trend line is extended to meet it.
pub fn render_material_plot(
    series: &Series,
    models: &ModelSet,
    material: Material,
    prediction: Option<&Prediction>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let observed = series.regression_pairs(material);
    let last_x = observed.last().map(|p| p.0).unwrap_or(0.0);
    let pred_point = prediction.map(|p| (p.elapsed_days as f64, p.prices.get(material)));

    let x_min = 0.0;
    let mut x_max = pred_point.map(|(x, _)| x.max(last_x)).unwrap_or(last_x);
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }

    let trend = models.get(material);
    let curve = sample_trend(|x| trend.value_at(x), x_min, x_max, width);

    let (y_min, y_max) = y_range(&observed, &curve, pred_point).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curve first (so points can overlay).
    draw_curve(&mut grid, &curve, x_min, x_max, y_min, y_max);

    for &(x, y) in &observed {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    if let Some((x, y)) = pred_point {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'P';
    }

    let end_date = series
        .date_at(x_max as i64)
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} | {} .. {} | price=[{y_min:.2}, {y_max:.2}]\n",
        material.display_name(),
        series.start(),
        end_date,
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn sample_trend(f: impl Fn(f64) -> f64, x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let x = x_min + u * (x_max - x_min);
            (x, f(x))
        })
        .collect()
}

fn y_range(observed: &[(f64, f64)], curve: &[(f64, f64)], extra: Option<(f64, f64)>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &(_, y) in observed.iter().chain(curve).chain(extra.iter()) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::config::GeneratorConfig;
    use crate::data::generate_series_with_rng;

    fn fixture() -> (Series, ModelSet) {
        let config = GeneratorConfig {
            days: 60,
            ..GeneratorConfig::default()
        };
        let series = generate_series_with_rng(&config, &mut StdRng::seed_from_u64(21)).unwrap();
        let models = ModelSet::fit(&series).unwrap();
        (series, models)
    }

    #[test]
    fn plot_has_requested_dimensions() {
        let (series, models) = fixture();
        let txt = render_material_plot(&series, &models, Material::Sand, None, 40, 12);
        let lines: Vec<&str> = txt.lines().collect();

        assert_eq!(lines.len(), 13);
        assert!(lines[0].starts_with("Plot: Sand | 2019-01-01 .. 2019-03-01"));
        assert!(lines[1..].iter().all(|l| l.chars().count() == 40));
        assert!(txt.contains('o'));
        assert!(!txt.contains('P'));
    }

    #[test]
    fn prediction_is_drawn_at_right_edge() {
        let (series, models) = fixture();
        let prediction = models.predict(NaiveDate::from_ymd_opt(2019, 6, 1).unwrap()).unwrap();
        let txt = render_material_plot(&series, &models, Material::Cement, Some(&prediction), 30, 10);

        let p_row = txt.lines().skip(1).find(|l| l.contains('P')).expect("P marker");
        assert_eq!(p_row.chars().last(), Some('P'));
        assert!(txt.lines().next().unwrap().contains("2019-06-01"));
    }

    #[test]
    fn tiny_sizes_are_clamped() {
        let (series, models) = fixture();
        let txt = render_material_plot(&series, &models, Material::Brick, None, 1, 1);
        assert_eq!(txt.lines().count(), 6);
    }
}
