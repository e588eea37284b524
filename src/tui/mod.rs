//! Ratatui-based terminal UI.
//!
//! The TUI lets the user pick a material, enter a target date, and see the
//! predicted prices next to the material's history and fitted trend.

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::pipeline::PriceContext;
use crate::domain::{Material, Prediction};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::PriceChart;

/// Start the TUI over an already-built context.
pub fn run(ctx: PriceContext) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(ctx);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    ctx: PriceContext,
    material: Material,
    date_input: String,
    editing_date: bool,
    prediction: Option<Prediction>,
    status: String,
}

impl App {
    fn new(ctx: PriceContext) -> Self {
        Self {
            ctx,
            material: Material::Cement,
            date_input: String::new(),
            editing_date: false,
            prediction: None,
            status: "Press Enter to type a target date.".to_string(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_date {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left | KeyCode::Up => {
                self.material = self.material.prev();
                self.status = format!("material: {}", self.material.display_name());
            }
            KeyCode::Right | KeyCode::Down => {
                self.material = self.material.next();
                self.status = format!("material: {}", self.material.display_name());
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                self.editing_date = true;
                self.status = "Editing date (YYYY-MM-DD). Enter to predict, Esc to cancel.".to_string();
            }
            KeyCode::Char('c') => {
                self.prediction = None;
                self.date_input.clear();
                self.status = "Prediction cleared.".to_string();
            }
            _ => {}
        }

        false
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_date = false;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_date = false;
                self.apply_date_input();
            }
            KeyCode::Backspace => {
                self.date_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || matches!(c, '-' | '/' | ' ' | ':' | 'T') {
                    self.date_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn apply_date_input(&mut self) {
        match self.ctx.predict_str(&self.date_input) {
            Ok(p) => {
                self.status = if p.within_history {
                    format!("{} is inside the historical window; showing the fitted trend.", p.date)
                } else {
                    format!("Predicted {} ({} days after series start).", p.date, p.elapsed_days)
                };
                self.prediction = Some(p);
            }
            Err(err) => {
                self.prediction = None;
                self.status = err.to_string();
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let series = self.ctx.series();
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("mtrend", Style::default().fg(Color::Cyan)),
            Span::raw(" · construction material price trends"),
        ]));

        let seed = self
            .ctx
            .seed()
            .map(|s| format!(" | seed: {s}"))
            .unwrap_or_default();
        lines.push(Line::from(Span::styled(
            format!(
                "history: {} .. {} ({} days){seed} | material: {}",
                series.start(),
                series.end(),
                series.len(),
                self.material.display_name(),
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(34)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_prediction(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = format!("{} price history", self.material.display_name());
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let data = chart_series(&self.ctx, self.material, self.prediction.as_ref());

        let (chart_rect, insets) = chart_layout(inner);
        let widget = PriceChart {
            history: &data.history,
            trend: &data.trend,
            prediction: data.prediction,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            x_label: "days since start",
            y_label: "price".to_string(),
            fmt_x: fmt_axis_days,
            fmt_y: fmt_axis_price,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(
                frame,
                inner,
                chart_rect,
                insets,
                self.ctx.series().start(),
                data.x_bounds,
                data.y_bounds,
            );
        }
    }

    fn draw_prediction(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let date_label = if self.date_input.trim().is_empty() {
            "-".to_string()
        } else {
            self.date_input.trim().to_string()
        };

        let mut items = Vec::new();
        items.push(ListItem::new(format!("Date: {date_label}")));
        match &self.prediction {
            Some(p) => {
                for (m, price) in p.prices.iter() {
                    let style = if m == self.material {
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    items.push(ListItem::new(format!("{:<7} {:>14.2}", m.display_name(), price)).style(style));
                }
            }
            None => items.push(ListItem::new("No prediction yet.").style(Style::default().fg(Color::Gray))),
        }

        let list = List::new(items).block(Block::default().title("Prediction").borders(Borders::ALL));
        frame.render_widget(list, area);

        if self.editing_date {
            let hint = Paragraph::new("Editing date…")
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ material  Enter edit date  c clear  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Chart-ready series for one material.
#[derive(Debug, Clone)]
struct ChartData {
    history: Vec<(f64, f64)>,
    trend: Vec<(f64, f64)>,
    prediction: Option<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_series(ctx: &PriceContext, material: Material, prediction: Option<&Prediction>) -> ChartData {
    let history = ctx.series().regression_pairs(material);
    let prediction = prediction.map(|p| (p.elapsed_days as f64, p.prices.get(material)));

    let last_x = history.last().map(|p| p.0).unwrap_or(0.0);
    let mut x1 = prediction.map(|(x, _)| x.max(last_x)).unwrap_or(last_x);
    if !x1.is_finite() || x1 <= 0.0 {
        x1 = 1.0;
    }
    let x_bounds = [0.0, x1];

    let model = ctx.models().get(material);
    let trend = vec![(0.0, model.value_at(0.0)), (x1, model.value_at(x1))];

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in history.iter().chain(&trend).chain(prediction.iter()) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    let y_bounds = [y_min - pad, y_max + pad];

    ChartData {
        history,
        trend,
        prediction,
        x_bounds,
        y_bounds,
    }
}

fn fmt_axis_days(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_price(v: f64) -> String {
    format!("{v:.1}")
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    epoch: NaiveDate,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 4usize;
    let style = Style::default().fg(Color::Gray);

    // X ticks are labelled with calendar dates.
    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let label = epoch
            .checked_add_signed(chrono::Duration::days(x_val.round() as i64))
            .map(|d| d.to_string())
            .unwrap_or_default();
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label_len = label.len() as u16;
        let start = x
            .saturating_sub(label_len / 2)
            .min((inner.x + inner.width).saturating_sub(label_len));
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{:.0}", y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("date")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("price")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
