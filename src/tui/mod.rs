//! Ratatui-based terminal UI.
//!
//! The TUI provides an input panel for the five work-session values and
//! renders the four predicted outcomes as cards.

use std::io;
use std::time::Duration;

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
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::app::pipeline::{self, Session};
use crate::domain::{EstimatorConfig, Feature, FeatureVector, Prediction, Target};
use crate::error::AppError;
use crate::models::FittedModel;
use crate::report::{format_target_value, target_label};

/// Start the TUI.
pub fn run(config: EstimatorConfig) -> Result<(), AppError> {
    // Train before touching the terminal so load errors print normally.
    let session = pipeline::prepare_session(config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(session);
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
    session: Session,
    inputs: FeatureVector,
    selected_field: usize,
    editing: bool,
    edit_buffer: String,
    prediction: Option<Prediction>,
    /// Inputs changed since the last prediction.
    stale: bool,
    status: String,
}

impl App {
    fn new(session: Session) -> Self {
        let inputs = session.ranges.defaults();
        let status = fit_status(&session.model(), "Model trained.");
        let mut app = Self {
            session,
            inputs,
            selected_field: 0,
            editing: false,
            edit_buffer: String::new(),
            prediction: None,
            stale: false,
            status,
        };
        app.predict();
        app
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
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
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

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing {
            self.handle_value_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field + 1 < Feature::ALL.len() {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => self.predict(),
            KeyCode::Char('e') => {
                self.editing = true;
                self.edit_buffer.clear();
                self.status = format!(
                    "Editing {}. Enter to apply, Esc to cancel.",
                    self.selected().display_name()
                );
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.reload(),
            KeyCode::Char('d') | KeyCode::Char('D') => {
                self.inputs = self.session.ranges.defaults();
                self.stale = true;
                self.status = "Inputs reset to dataset defaults.".to_string();
            }
            _ => {}
        }

        false
    }

    fn handle_value_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = false;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = false;
                self.apply_edit_buffer();
            }
            KeyCode::Backspace => {
                self.edit_buffer.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '.' {
                    self.edit_buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn selected(&self) -> Feature {
        Feature::ALL[self.selected_field]
    }

    fn adjust_field(&mut self, steps: i32) {
        let feature = self.selected();
        self.inputs = self.session.ranges.step(self.inputs, feature, steps);
        self.stale = true;
        self.status = format!(
            "{}: {}",
            feature.display_name(),
            fmt_input(self.inputs.get(feature))
        );
    }

    fn apply_edit_buffer(&mut self) {
        let feature = self.selected();
        let text = self.edit_buffer.trim();
        let value = match text.parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                self.status = format!("Invalid value '{text}' for {}.", feature.display_name());
                return;
            }
        };
        let mut next = self.inputs;
        next.set(feature, value);
        self.inputs = self.session.ranges.constrain(next);
        self.stale = true;
        let applied = self.inputs.get(feature);
        self.status = if applied == value {
            format!("{}: {}", feature.display_name(), fmt_input(applied))
        } else {
            format!(
                "{}: {} (clamped from {})",
                feature.display_name(),
                fmt_input(applied),
                fmt_input(value)
            )
        };
    }

    fn predict(&mut self) {
        let model = self.session.model();
        match model.predict_features(&self.inputs) {
            Ok(p) => {
                self.prediction = Some(p);
                self.stale = false;
            }
            Err(err) => {
                self.status = format!("Prediction failed: {err}");
            }
        }
    }

    fn reload(&mut self) {
        match self.session.reload() {
            Ok(model) => {
                self.inputs = self.session.ranges.constrain(self.inputs);
                self.status = fit_status(
                    &model,
                    &format!("Reloaded {} rows and retrained.", self.session.dataset.len()),
                );
                self.predict();
            }
            Err(err) => {
                self.status = format!("Reload failed (keeping current model): {err}");
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
        let model = self.session.model();
        let diag = model.diagnostics();
        let source = self
            .session
            .dataset
            .source()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());

        let lines = vec![
            Line::from(vec![
                Span::styled("devest", Style::default().fg(Color::Cyan)),
                Span::raw(" - developer outcome estimator"),
            ]),
            Line::from(Span::styled(
                format!("dataset: {source} | rows: {} | rank: {}", diag.n_rows, diag.rank),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(area);

        self.draw_inputs(frame, chunks[0]);
        self.draw_results(frame, chunks[1]);
    }

    fn draw_inputs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = Feature::ALL
            .iter()
            .map(|&feature| {
                let range = self.session.ranges.effective(feature, &self.inputs);
                ListItem::new(format!(
                    "{:<16} {:>7}   [{} - {}]",
                    feature.display_name(),
                    fmt_input(self.inputs.get(feature)),
                    fmt_input(range.min),
                    fmt_input(range.max)
                ))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Work session").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing {
            let hint = Paragraph::new(format!("New value: {}_", self.edit_buffer))
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

    fn draw_results(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = if self.stale {
            "Predicted outcomes (inputs changed, Enter to update)"
        } else {
            "Predicted outcomes"
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
            .split(inner);
        let value_style = if self.stale {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        };

        for (i, target) in Target::ALL.iter().enumerate() {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
                .split(rows[i / 2]);

            let column = target.column();
            let value = self
                .prediction
                .as_ref()
                .and_then(|p| p.get(column))
                .map(|v| format_target_value(column, v))
                .unwrap_or_else(|| "-".to_string());

            let card = Paragraph::new(Line::from(Span::styled(value, value_style)))
                .alignment(Alignment::Center)
                .block(Block::default().title(target_label(column)).borders(Borders::ALL));
            frame.render_widget(card, cols[i % 2]);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  e type value  Enter predict  r reload  d defaults  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Status text for a freshly trained model; degenerate-fit warnings take precedence.
fn fit_status(model: &FittedModel, ok: &str) -> String {
    let warnings = &model.diagnostics().warnings;
    if warnings.is_empty() {
        return ok.to_string();
    }
    let joined: Vec<String> = warnings.iter().map(|w| w.to_string()).collect();
    format!("Warning: {}", joined.join("; "))
}

fn fmt_input(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{InputRanges, SyntheticConfig, generate_dataset};
    use crate::fit::train;
    use crate::models::ModelHandle;

    fn app_with_file() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let ds = generate_dataset(&SyntheticConfig { rows: 60, seed: 5, noise_scale: 1.0 }).unwrap();
        crate::io::write_dataset_csv(&path, &ds).unwrap();

        let config = EstimatorConfig { data_path: path, data_path_explicit: true };
        let dataset = pipeline::load_dataset(&config).unwrap();
        let ranges = InputRanges::from_dataset(&dataset).unwrap();
        let handle: &'static ModelHandle = Box::leak(Box::new(ModelHandle::new(train(&dataset).unwrap())));
        let session = Session { config, dataset, ranges, handle };
        (App::new(session), dir)
    }

    #[test]
    fn starts_with_defaults_and_a_prediction() {
        let (app, _dir) = app_with_file();
        assert_eq!(app.inputs, app.session.ranges.defaults());
        assert_eq!(app.prediction.as_ref().map(Prediction::len), Some(4));
        assert!(!app.stale);
    }

    #[test]
    fn adjusting_keeps_ai_usage_within_coding() {
        let (mut app, _dir) = app_with_file();
        // Hours coding is the first field; push it to its minimum.
        for _ in 0..200 {
            app.handle_key(KeyCode::Left);
        }
        assert!(app.inputs.ai_usage_hours <= app.inputs.hours_coding);
        assert!(app.stale);
        app.handle_key(KeyCode::Enter);
        assert!(!app.stale);
    }

    #[test]
    fn typed_values_are_clamped() {
        let (mut app, _dir) = app_with_file();
        app.selected_field = Feature::StressLevel.index();
        app.handle_key(KeyCode::Char('e'));
        for c in "500".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Enter);
        assert!(!app.editing);
        assert_eq!(app.inputs.stress_level, 100.0);
        assert!(app.status.contains("clamped"));
    }

    #[test]
    fn reload_swaps_model_and_failed_reload_keeps_it() {
        let (mut app, dir) = app_with_file();
        let before = app.session.model();

        app.handle_key(KeyCode::Char('r'));
        let after = app.session.model();
        assert!(!std::sync::Arc::ptr_eq(&before, &after));

        std::fs::write(dir.path().join("data.csv"), "Hours_Coding\n1\n").unwrap();
        app.handle_key(KeyCode::Char('R'));
        assert!(app.status.starts_with("Reload failed"));
        assert!(std::sync::Arc::ptr_eq(&after, &app.session.model()));
    }

    #[test]
    fn quit_keys() {
        let (mut app, _dir) = app_with_file();
        assert!(!app.handle_key(KeyCode::Down));
        assert!(app.handle_key(KeyCode::Char('q')));
    }
}
