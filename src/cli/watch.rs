//! Watch command implementation - Interactive TUI viewer.

#![allow(clippy::needless_pass_by_value)]

use super::{load_catalog, load_config, CliError};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use isocity::game::{BuildingCategory, StatusFlag};
use isocity::replay::{tile_symbol, ReplayEngine, Script};
use isocity::{Catalog, Coord, SimulationState, Tile};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::stdout;
use std::path::Path;
use std::time::{Duration, Instant};

/// Execute the watch command.
///
/// # Errors
///
/// Returns an error if a file cannot be loaded or the TUI fails.
pub(crate) fn execute(
    script_path: &Path,
    days: u32,
    config: Option<&Path>,
    catalog: Option<&Path>,
    speed: u64,
) -> Result<(), CliError> {
    let script = Script::load(script_path).map_err(|e| {
        CliError::new(format!("Failed to load script {}: {e}", script_path.display()))
    })?;
    let config = load_config(config)?;
    let catalog = load_catalog(catalog)?;

    let engine = ReplayEngine::new(script, config, catalog, days)?;

    run_tui(engine, speed)
}

/// App state for the TUI.
struct App {
    engine: ReplayEngine,
    paused: bool,
    speed_ms: u64,
    last_step: Instant,
}

impl App {
    fn new(engine: ReplayEngine, speed_ms: u64) -> Self {
        Self {
            engine,
            paused: true, // Start paused
            speed_ms,
            last_step: Instant::now(),
        }
    }

    fn step_forward(&mut self) {
        if !self.engine.is_finished() {
            let _ = self.engine.step_forward();
            self.last_step = Instant::now();
        }
    }

    fn step_backward(&mut self) {
        let _ = self.engine.step_backward();
        self.last_step = Instant::now();
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    fn increase_speed(&mut self) {
        self.speed_ms = self.speed_ms.saturating_sub(100).max(50);
    }

    fn decrease_speed(&mut self) {
        self.speed_ms = (self.speed_ms + 100).min(2000);
    }

    fn should_auto_step(&self) -> bool {
        !self.paused
            && !self.engine.is_finished()
            && self.last_step.elapsed() >= Duration::from_millis(self.speed_ms)
    }
}

fn run_tui(engine: ReplayEngine, speed: u64) -> Result<(), CliError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| CliError::new(e.to_string()))?;

    let mut app = App::new(engine, speed);

    loop {
        terminal
            .draw(|f| ui(f, &app))
            .map_err(|e| CliError::new(e.to_string()))?;

        if app.should_auto_step() {
            app.step_forward();
        }

        // Handle input with timeout
        if event::poll(Duration::from_millis(50)).map_err(|e| CliError::new(e.to_string()))?
            && let Event::Key(key) = event::read().map_err(|e| CliError::new(e.to_string()))?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char(' ') => app.toggle_pause(),
                KeyCode::Right | KeyCode::Char('l') => {
                    app.paused = true;
                    app.step_forward();
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    app.paused = true;
                    app.step_backward();
                }
                KeyCode::Char('+' | '=') => app.increase_speed(),
                KeyCode::Char('-') => app.decrease_speed(),
                KeyCode::Char('r') => {
                    let _ = app.engine.goto_day(0);
                    app.paused = true;
                }
                _ => {}
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0], app);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[1]);

    render_map(f, main_chunks[0], app);
    render_stats(f, main_chunks[1], app);

    render_footer(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let status = if app.engine.is_finished() {
        "FINISHED"
    } else if app.paused {
        "PAUSED"
    } else {
        "RUNNING"
    };

    let name = app.engine.script().name.as_deref().unwrap_or("isocity");
    let title = format!(
        " {name} | Day {}/{} | {status} | Speed: {}ms ",
        app.engine.day(),
        app.engine.max_days(),
        app.speed_ms
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn render_map(f: &mut Frame, area: Rect, app: &App) {
    let state = app.engine.state();
    let grid = state.grid();

    // Two columns per tile, clipped to the panel
    let visible_width = (area.width.saturating_sub(2) / 2).min(grid.width());
    let visible_height = area.height.saturating_sub(2).min(grid.height());

    let mut lines: Vec<Line> = Vec::new();
    for y in 0..visible_height {
        let mut spans = Vec::new();
        for x in 0..visible_width {
            if let Ok(tile) = grid.get(Coord::new(x, y)) {
                let color = tile_color(tile, state.catalog());
                spans.push(Span::styled(
                    format!("{} ", tile_symbol(tile)),
                    Style::default().fg(color),
                ));
            } else {
                spans.push(Span::raw("  "));
            }
        }
        lines.push(Line::from(spans));
    }

    let map_widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Map "));

    f.render_widget(map_widget, area);
}

fn tile_color(tile: &Tile, catalog: &Catalog) -> Color {
    let Some(building) = &tile.building else {
        return Color::DarkGray;
    };
    let Ok(definition) = catalog.definition(&building.kind) else {
        return Color::Red;
    };
    if !tile.connected && !definition.is_road() {
        return Color::Gray;
    }
    match definition.category {
        BuildingCategory::Residential => Color::Green,
        BuildingCategory::Commercial => Color::Blue,
        BuildingCategory::Industrial => Color::Yellow,
        BuildingCategory::Infrastructure => Color::White,
        BuildingCategory::Environment => Color::Cyan,
        BuildingCategory::Social => Color::LightGreen,
        BuildingCategory::Governance => Color::Magenta,
    }
}

fn render_stats(f: &mut Frame, area: Rect, app: &App) {
    let state = app.engine.state();
    let totals = state.totals();
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let power_style = if totals.has_power_deficit() {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("City", bold)),
        Line::from(format!("  Credits: {}", state.credits())),
        Line::from(format!("  Income: +{}/day", totals.daily_income)),
        Line::from(format!(
            "  Pop: {}/{}",
            totals.population, totals.max_population
        )),
        Line::from(format!("  Jobs: {}", totals.job_capacity)),
        Line::from(Span::styled(
            format!("  Power: {}/{}", totals.power, totals.max_power),
            power_style,
        )),
        Line::from(format!("  Pollution: {}", totals.pollution)),
        Line::from(format!("  Stability: {:.1}", state.stability())),
        Line::from(""),
    ];

    lines.extend(render_alerts(state));
    lines.extend(render_recent(app));

    let stats_widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Stats "))
        .wrap(Wrap { trim: false });

    f.render_widget(stats_widget, area);
}

fn render_alerts(state: &SimulationState) -> Vec<Line<'static>> {
    let flagged = isocity::game::flagged_buildings(state);
    let count = |flag: StatusFlag| {
        flagged
            .iter()
            .filter(|(_, flags)| flags.contains(&flag))
            .count()
    };

    let mut lines = vec![Line::from(Span::styled(
        "Alerts",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for flag in [StatusFlag::NoRoadAccess, StatusFlag::MissingPower] {
        let n = count(flag);
        if n > 0 {
            lines.push(Line::from(Span::styled(
                format!("  {flag}: {n}"),
                Style::default().fg(Color::Yellow),
            )));
        }
    }
    lines.push(Line::from(format!(
        "  upgradable: {}",
        count(StatusFlag::Upgradable)
    )));
    lines.push(Line::from(""));
    lines
}

fn render_recent(app: &App) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        "Recent intents",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for event in app.engine.events().iter().rev().take(5) {
        let (mark, color) = if event.accepted() {
            ("✓", Color::Green)
        } else {
            ("✗", Color::Red)
        };
        lines.push(Line::from(Span::styled(
            format!("  {mark} d{} {}", event.day, event.intent),
            Style::default().fg(color),
        )));
    }
    lines
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let controls = if app.engine.is_finished() {
        " [q] Quit  [r] Restart  [←/→] Step "
    } else {
        " [q] Quit  [Space] Pause  [←/→] Step  [+/-] Speed  [r] Restart "
    };

    let footer = Paragraph::new(controls)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}
