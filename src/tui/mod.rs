//! Ratatui-based terminal UI.
//!
//! The TUI loads a trained model artifact and provides a settings panel for
//! choosing a forecast month and an assumed world production level, then
//! renders the point prediction and the five-month forward outlook.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::cli::TuiArgs;
use crate::domain::{
    Month, Season, SERVE_MONTH_MAX, SERVE_MONTH_MIN, SERVE_PRODUCTION_MAX, SERVE_PRODUCTION_MIN,
    SERVE_PRODUCTION_STEP,
};
use crate::error::AppError;
use crate::serve::{PredictService, PredictionView};

mod forecast_chart;

use forecast_chart::ForecastChart;

/// Start the TUI.
pub fn run(args: TuiArgs) -> Result<(), AppError> {
    let service = PredictService::load(&args.artifact)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::Terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(service);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::Terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::Terminal(format!(
                "Failed to enter alternate screen: {e}"
            )));
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Forecast,
    About,
}

struct App {
    service: PredictService,
    screen: Screen,
    month: Month,
    production: f64,
    selected_field: usize,
    editing_production: bool,
    production_input: String,
    status: String,
    view: Option<PredictionView>,
}

impl App {
    fn new(service: PredictService) -> Self {
        let production = service
            .artifact()
            .mean_production
            .clamp(SERVE_PRODUCTION_MIN, SERVE_PRODUCTION_MAX);
        let mut app = Self {
            service,
            screen: Screen::Forecast,
            month: SERVE_MONTH_MIN,
            production,
            selected_field: 0,
            editing_production: false,
            production_input: String::new(),
            status: String::new(),
            view: None,
        };
        app.refresh();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::Terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::Terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::Terminal(format!("Event read error: {e}")))? {
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

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_production {
            self.handle_production_edit(code);
            return false;
        }

        if code == KeyCode::Tab {
            self.screen = match self.screen {
                Screen::Forecast => Screen::About,
                Screen::About => Screen::Forecast,
            };
            return false;
        }

        if self.screen == Screen::About {
            return matches!(code, KeyCode::Char('q') | KeyCode::Esc);
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field < 1 {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => {
                if self.selected_field == 1 {
                    self.editing_production = true;
                    self.production_input = format!("{:.0}", self.production);
                    self.status =
                        "Editing production (TBPD). Enter to apply, Esc to cancel.".to_string();
                }
            }
            _ => {}
        }

        false
    }

    fn handle_production_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_production = false;
                self.status = "Production edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_production = false;
                self.apply_production_input();
            }
            KeyCode::Backspace => {
                self.production_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '.' {
                    self.production_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn adjust_field(&mut self, delta: i32) {
        match self.selected_field {
            0 => {
                let next = if delta >= 0 {
                    self.month.succ()
                } else {
                    self.month.pred()
                };
                if next >= SERVE_MONTH_MIN && next <= SERVE_MONTH_MAX {
                    self.month = next;
                    self.refresh();
                } else {
                    self.status =
                        format!("Month must stay within {SERVE_MONTH_MIN}..{SERVE_MONTH_MAX}.");
                }
            }
            1 => {
                let next = (self.production + delta as f64 * SERVE_PRODUCTION_STEP)
                    .clamp(SERVE_PRODUCTION_MIN, SERVE_PRODUCTION_MAX);
                self.production = next;
                self.refresh();
            }
            _ => {}
        }
    }

    fn apply_production_input(&mut self) {
        let trimmed = self.production_input.trim();
        let value = match trimmed.parse::<f64>() {
            Ok(v) => v,
            Err(e) => {
                self.status = format!("Invalid production '{trimmed}': {e}");
                return;
            }
        };
        if !(SERVE_PRODUCTION_MIN..=SERVE_PRODUCTION_MAX).contains(&value) {
            self.status = format!(
                "Production must be within {SERVE_PRODUCTION_MIN:.0}..{SERVE_PRODUCTION_MAX:.0} TBPD."
            );
            return;
        }
        self.production = value;
        self.refresh();
    }

    fn refresh(&mut self) {
        match self.service.forecast_from(self.month, self.production) {
            Ok(view) => {
                self.status = format!(
                    "{}: {:.2} USD/bbl at {:.0} TBPD",
                    view.point.month, view.point.price, view.point.production,
                );
                self.view = Some(view);
            }
            Err(err) => {
                self.status = err.to_string();
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let artifact = self.service.artifact();

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("brentcast", Style::default().fg(Color::Cyan)),
            Span::raw(" — Brent price forecast"),
        ]));

        lines.push(Line::from(Span::styled(
            format!(
                "month: {} ({}) | production: {:.0} TBPD | trained on {}..{} | trees: {}",
                self.month,
                Season::for_month(self.month).display_name(),
                self.production,
                artifact.window.start,
                artifact.window.end,
                artifact.params.trees,
            ),
            Style::default().fg(Color::Gray),
        )));

        lines.push(Line::from(Span::styled(
            format!(
                "held-out: r2={:.3} | mae={:.2} | rmse={:.2} (n={}+{})",
                artifact.metrics.r2,
                artifact.metrics.mae,
                artifact.metrics.rmse,
                artifact.metrics.n_train,
                artifact.metrics.n_test,
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        if self.screen == Screen::About {
            self.draw_about(frame, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(7)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_about(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines: Vec<Line> = about_text()
            .iter()
            .map(|&s| Line::from(s))
            .collect();
        let p = Paragraph::new(Text::from(lines))
            .wrap(ratatui::widgets::Wrap { trim: false })
            .block(Block::default().title("About").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Forward outlook").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(view) = &self.view else {
            let msg = Paragraph::new("No prediction yet.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let (line, anchor, x_bounds, y_bounds) = chart_series(view);

        let widget = ForecastChart {
            line: &line,
            anchor: &anchor,
            x_bounds,
            y_bounds,
            x_label: "months ahead",
            y_label: "USD/bbl",
        };
        frame.render_widget(widget, inner);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let production_label = if self.editing_production {
            format!("{}_", self.production_input)
        } else {
            format!("{:.0}", self.production)
        };

        let mut items = Vec::new();
        items.push(ListItem::new(format!("Month: {}", self.month)));
        items.push(ListItem::new(format!("Production (TBPD): {production_label}")));
        items.push(ListItem::new(format!(
            "Season: {}",
            Season::for_month(self.month).display_name()
        )));

        let list = List::new(items)
            .block(Block::default().title("Inputs").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing_production {
            let hint = Paragraph::new("Editing production…")
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
        let help = match self.screen {
            Screen::Forecast => "↑/↓ select  ←/→ adjust  Enter edit production  Tab about  q quit",
            Screen::About => "Tab back to forecast  q quit",
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Static copy for the About screen.
fn about_text() -> &'static [&'static str] {
    &[
        "Problem",
        "",
        "Estimate the monthly Brent crude oil price (USD per barrel) to support",
        "decisions that depend on oil price swings. Price history alone is a weak",
        "predictor, so the model also uses world crude production as a supply",
        "signal and the season of the year as a proxy for demand (e.g. northern-",
        "hemisphere winters raise consumption).",
        "",
        "Model",
        "",
        "A seeded random-forest regressor trained on a trailing three-year window",
        "of monthly observations. Inputs: world production (thousand barrels per",
        "day) and one-hot season indicators. The last fifth of the window is held",
        "out chronologically for R2/MAE/RMSE reporting. Forecasts hold production",
        "constant at the window mean.",
        "",
        "Data sources",
        "",
        "- World crude production: EIA (U.S. Energy Information Administration),",
        "  https://www.eia.gov",
        "- Brent FOB spot price: IPEADATA, series EIA366_PBRENT366,",
        "  http://www.ipeadata.gov.br",
    ]
}

/// Build chart series for Plotters: the requested month at x=0, forward
/// months at x=1..=5.
fn chart_series(view: &PredictionView) -> (Vec<(f64, f64)>, Vec<(f64, f64)>, [f64; 2], [f64; 2]) {
    let mut line = Vec::with_capacity(1 + view.forward.len());
    line.push((0.0, view.point.price));
    for (i, p) in view.forward.iter().enumerate() {
        line.push((i as f64 + 1.0, p.price));
    }

    let anchor = vec![(0.0, view.point.price)];
    let x_bounds = [0.0, (line.len() - 1).max(1) as f64];

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in &line {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_max = y_min + 1.0;
        if !y_min.is_finite() {
            y_min = 0.0;
            y_max = 1.0;
        }
    }
    let pad = ((y_max - y_min).abs() * 0.10).max(0.5);
    let y_bounds = [y_min - pad, y_max + pad];

    (line, anchor, x_bounds, y_bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        FeatureVector, ForestParams, Metrics, Prediction, TrainWindow, FEATURE_COLUMNS,
        SEASON_RULE,
    };
    use crate::forest::Forest;
    use crate::io::ModelArtifact;

    fn service() -> PredictService {
        let mut rows = Vec::new();
        let mut targets = Vec::new();
        let mut month: Month = "2022-01".parse().unwrap();
        for i in 0..36 {
            let production = 100_000.0 + i as f64 * 700.0;
            rows.push(FeatureVector::new(production, Season::for_month(month)).row());
            targets.push(58.0 + production / 12_000.0);
            month = month.succ();
        }
        let forest =
            Forest::fit(&rows, &targets, ForestParams { trees: 5, ..ForestParams::default() })
                .unwrap();

        PredictService::from_artifact(ModelArtifact {
            tool: "brentcast".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            feature_columns: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            season_rule: SEASON_RULE.to_string(),
            window: TrainWindow {
                start: "2022-01".parse().unwrap(),
                end: "2024-12".parse().unwrap(),
            },
            mean_production: 112_000.0,
            params: ForestParams::default(),
            metrics: Metrics { r2: 0.9, mae: 1.0, rmse: 1.5, n_train: 29, n_test: 7 },
            forest,
        })
    }

    fn pred(month: &str, price: f64) -> Prediction {
        let month: Month = month.parse().unwrap();
        Prediction {
            month,
            season: Season::for_month(month),
            production: 120_000.0,
            price,
        }
    }

    #[test]
    fn chart_series_spans_point_and_forward_months() {
        let view = PredictionView {
            point: pred("2025-03", 80.0),
            forward: vec![
                pred("2025-04", 81.0),
                pred("2025-05", 82.0),
                pred("2025-06", 79.0),
                pred("2025-07", 78.0),
                pred("2025-08", 80.5),
            ],
        };

        let (line, anchor, x_bounds, y_bounds) = chart_series(&view);
        assert_eq!(line.len(), 6);
        assert_eq!(anchor, vec![(0.0, 80.0)]);
        assert_eq!(x_bounds, [0.0, 5.0]);
        assert!(y_bounds[0] < 78.0 && y_bounds[1] > 82.0);
    }

    #[test]
    fn tab_toggles_between_forecast_and_about() {
        let mut app = App::new(service());
        assert_eq!(app.screen, Screen::Forecast);

        assert!(!app.handle_key(KeyCode::Tab));
        assert_eq!(app.screen, Screen::About);

        // Field navigation is inert on the About screen.
        let field = app.selected_field;
        assert!(!app.handle_key(KeyCode::Down));
        assert_eq!(app.selected_field, field);

        assert!(!app.handle_key(KeyCode::Tab));
        assert_eq!(app.screen, Screen::Forecast);
    }

    #[test]
    fn quit_works_from_both_screens() {
        let mut app = App::new(service());
        assert!(app.handle_key(KeyCode::Char('q')));

        let mut app = App::new(service());
        app.handle_key(KeyCode::Tab);
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn about_text_names_the_data_sources_and_model() {
        let text = about_text().join("\n");
        assert!(text.contains("EIA"));
        assert!(text.contains("IPEADATA"));
        assert!(text.contains("EIA366_PBRENT366"));
        assert!(text.contains("random-forest"));
        assert!(text.contains("Brent"));
    }

    #[test]
    fn chart_series_degenerate_prices_still_produce_valid_bounds() {
        let view = PredictionView {
            point: pred("2025-03", 75.0),
            forward: vec![pred("2025-04", 75.0)],
        };
        let (_, _, _, y_bounds) = chart_series(&view);
        assert!(y_bounds[1] > y_bounds[0]);
    }
}
