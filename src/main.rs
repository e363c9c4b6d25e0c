use std::fs;
use std::io;
use std::sync::{Mutex, mpsc};
use std::time::{Duration, Instant};

use chrono::{DateTime, Datelike, Duration as ChronoDuration, NaiveDate, Utc};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use tracing::info;
use tracing_subscriber::EnvFilter;

use liga_terminal::config::{AppConfig, app_cache_dir};
use liga_terminal::demo::DEMO_COMPETITION;
use liga_terminal::model::{Match, Venue};
use liga_terminal::persist;
use liga_terminal::provider::spawn_provider;
use liga_terminal::relegation::{RelegationReport, RelegationStatus};
use liga_terminal::season::games_remaining;
use liga_terminal::state::{
    AppState, Delta, MENU_ITEMS, Pending, ProviderCommand, View, apply_delta, menu_label,
};
use liga_terminal::tier::Tier;

const LOG_FILE: &str = "liga_terminal.log";

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(state: AppState, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state,
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Enter => {
                if let Some(cmd) = self.state.activate() {
                    self.send(cmd);
                }
            }
            KeyCode::Char('b') | KeyCode::Esc => self.state.back(),
            KeyCode::Char('m') => self.state.go_to_menu(),
            KeyCode::Char('t') => self.state.choose_another_team(),
            KeyCode::Char('r') => {
                if let Some(cmd) = self.state.refresh() {
                    self.state.push_log("[INFO] Refresh requested");
                    self.send(cmd);
                }
            }
            KeyCode::Char('e') => {
                let cmd = self.state.request_export();
                self.send(cmd);
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn send(&mut self, cmd: ProviderCommand) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Data provider unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            apply_delta(
                &mut self.state,
                Delta::Failed {
                    message: "data provider stopped".to_string(),
                },
            );
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging();

    let config = AppConfig::from_env();
    let competition = if config.is_demo() {
        DEMO_COMPETITION
    } else {
        config.competition.as_str()
    };
    let mut state = AppState::new(competition, config.season);
    state.demo = config.is_demo();
    persist::load_into_state(&mut state);
    info!(competition, demo = state.demo, "starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(config, tx, cmd_rx);

    let mut app = App::new(state, Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

/// The terminal belongs to the UI, so tracing goes to a file in the cache dir.
fn init_logging() {
    let Some(dir) = app_cache_dir() else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))
    else {
        return;
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("liga_terminal=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }
        if app.state.snapshot_dirty {
            persist::save_from_state(&app.state);
            app.state.snapshot_dirty = false;
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(header_text(&app.state))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let state = &app.state;
    match &state.view {
        View::Menu => render_menu(frame, chunks[1], state),
        View::SelectTeam => render_select_team(frame, chunks[1], state),
        View::NextMatch { team_id } => render_next_match(frame, chunks[1], state, *team_id),
        View::Standings => render_standings(frame, chunks[1], state),
        View::Relegation { team_id: Some(id) } => {
            render_relegation_team(frame, chunks[1], state, *id)
        }
        View::Relegation { team_id: None } => render_relegation_table(frame, chunks[1], state),
        View::Loading { pending } => render_loading(frame, chunks[1], *pending),
        View::Error { message } => render_error(frame, chunks[1], message),
    }

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if state.help_overlay {
        render_help_overlay(frame, area);
    }
}

fn header_text(state: &AppState) -> String {
    let demo = if state.demo { " | DEMO" } else { "" };
    format!(
        "LIGA TERMINAL | {} | {}{demo}",
        state.competition,
        view_title(&state.view)
    )
}

fn view_title(view: &View) -> &'static str {
    match view {
        View::Menu => "Menu",
        View::SelectTeam => "Choose a team",
        View::NextMatch { .. } => "Next match",
        View::Standings => "League table",
        View::Relegation { .. } => "Relegation watch",
        View::Loading { .. } => "Loading",
        View::Error { .. } => "Error",
    }
}

fn footer_text(state: &AppState) -> String {
    match state.view {
        View::Menu => "j/k/↑/↓ Move | Enter Open | e Export | ? Help | q Quit".to_string(),
        View::SelectTeam => {
            "j/k/↑/↓ Move | Enter Next match | r Refresh | b Back | m Menu | q Quit".to_string()
        }
        View::NextMatch { .. } => {
            "t Another team | r Refresh | b Back | m Menu | q Quit".to_string()
        }
        View::Standings | View::Relegation { team_id: None } => {
            "j/k/↑/↓ Move | Enter Report | r Refresh | e Export | b Back | m Menu | q Quit"
                .to_string()
        }
        View::Relegation { team_id: Some(_) } => {
            "r Refresh | b Back | m Menu | q Quit".to_string()
        }
        View::Loading { .. } => "b Cancel | q Quit".to_string(),
        View::Error { .. } => "b Back | m Menu | q Quit".to_string(),
    }
}

fn render_menu(frame: &mut Frame, area: Rect, state: &AppState) {
    let lines: Vec<Line> = MENU_ITEMS
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let selected = idx == state.selected;
            let prefix = if selected { "> " } else { "  " };
            let style = if selected {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Line::styled(format!("{prefix}{}", menu_label(*item)), style)
        })
        .collect();
    let menu = Paragraph::new(lines).block(Block::default().title("Menu").borders(Borders::ALL));
    frame.render_widget(menu, area);
}

fn render_select_team(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Teams").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if state.teams.is_empty() {
        let empty = Paragraph::new("No teams for this competition")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let visible = inner.height as usize;
    let (start, end) = visible_range(state.selected, state.teams.len(), visible);
    let lines: Vec<Line> = (start..end)
        .map(|idx| {
            let team = &state.teams[idx];
            let selected = idx == state.selected;
            let prefix = if selected { "> " } else { "  " };
            let style = if selected {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default()
            };
            let tla = team.tla.as_deref().unwrap_or("---");
            Line::styled(format!("{prefix}{tla:<4} {}", team.display_name()), style)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_next_match(frame: &mut Frame, area: Rect, state: &AppState, team_id: u32) {
    let team_name = state
        .selected_team
        .as_ref()
        .or_else(|| state.team(team_id))
        .map(|t| t.display_name().to_string())
        .unwrap_or_else(|| team_id.to_string());
    let block = Block::default()
        .title(format!("Next match: {team_name}"))
        .borders(Borders::ALL);

    let text = match state.next_match_at(Utc::now()) {
        Some(m) => next_match_lines(m, team_id),
        None => vec![Line::from(format!(
            "No scheduled {} matches for {team_name}.",
            state.competition
        ))],
    };
    let card = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(card, area);
}

fn next_match_lines(m: &Match, team_id: u32) -> Vec<Line<'static>> {
    let highlight = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let side = |id: u32| if id == team_id { highlight } else { Style::default() };
    let venue = match m.venue_for(team_id) {
        Some(Venue::Home) => "Home",
        Some(Venue::Away) => "Away",
        None => "-",
    };
    let opponent = m
        .opponent_of(team_id)
        .map(|t| t.display_name().to_string())
        .unwrap_or_else(|| "-".to_string());
    let matchday = m
        .matchday
        .map(|md| md.to_string())
        .unwrap_or_else(|| "-".to_string());

    vec![
        Line::from(vec![
            Span::styled(m.home_team.display_name().to_string(), side(m.home_team.id)),
            Span::raw("  vs  "),
            Span::styled(m.away_team.display_name().to_string(), side(m.away_team.id)),
        ]),
        Line::from(""),
        Line::from(format!("Date:     {}", format_kickoff(m.utc_date))),
        Line::from(format!("Opponent: {opponent}")),
        Line::from(format!("Venue:    {venue}")),
        Line::from(format!("Matchday: {matchday}")),
    ]
}

fn render_standings(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("League table").borders(Borders::ALL);
    if state.standings.is_empty() {
        let empty = Paragraph::new("No standings yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let visible = area.height.saturating_sub(3) as usize;
    let (start, end) = visible_range(state.selected, state.standings.len(), visible);
    let rows: Vec<Row> = (start..end)
        .map(|idx| {
            let row = &state.standings[idx];
            let tier = state.tier_of(row);
            let mut style = Style::default().fg(tier_color(tier));
            if idx == state.selected {
                style = style.bg(Color::DarkGray);
            }
            Row::new(vec![
                Cell::from(row.position.to_string()),
                Cell::from(row.team.display_name().to_string()),
                Cell::from(row.played_games.to_string()),
                Cell::from(row.won.to_string()),
                Cell::from(row.draw.to_string()),
                Cell::from(row.lost.to_string()),
                Cell::from(format!("{}:{}", row.goals_for, row.goals_against)),
                Cell::from(format!("{:+}", row.goal_difference)),
                Cell::from(row.points.to_string()),
                Cell::from(tier.label()),
            ])
            .style(style)
        })
        .collect();

    let header = Row::new(vec![
        "#", "Team", "P", "W", "D", "L", "Goals", "GD", "Pts", "",
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));
    let widths = [
        Constraint::Length(3),
        Constraint::Min(14),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(7),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(8),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn render_relegation_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title("Relegation watch")
        .borders(Borders::ALL);
    let reports = match state.relegation_reports() {
        Ok(reports) if !reports.is_empty() => reports,
        Ok(_) => {
            let empty = Paragraph::new("No standings yet")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }
        Err(err) => {
            let msg = Paragraph::new(err.to_string())
                .style(Style::default().fg(Color::Red))
                .block(block);
            frame.render_widget(msg, area);
            return;
        }
    };

    let visible = area.height.saturating_sub(3) as usize;
    let (start, end) = visible_range(state.selected, reports.len(), visible);
    let rows: Vec<Row> = reports[start..end]
        .iter()
        .enumerate()
        .map(|(offset, report)| {
            let mut style = Style::default().fg(status_color(report.status));
            if start + offset == state.selected {
                style = style.bg(Color::DarkGray);
            }
            let escape = report
                .points_to_escape_zone
                .map(|p| format!("{p:+}"))
                .unwrap_or_default();
            Row::new(vec![
                Cell::from(report.subject.position.to_string()),
                Cell::from(report.subject.team.display_name().to_string()),
                Cell::from(report.subject.points.to_string()),
                Cell::from(report.subject_max_points.to_string()),
                Cell::from(report.status.label()),
                Cell::from(report.points_needed_for_safety.to_string()),
                Cell::from(report.wins_needed.to_string()),
                Cell::from(escape),
            ])
            .style(style)
        })
        .collect();

    let header = Row::new(vec![
        "#", "Team", "Pts", "Max", "Status", "Need", "Wins", "Escape",
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));
    let widths = [
        Constraint::Length(3),
        Constraint::Min(14),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(8),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(7),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn render_relegation_team(frame: &mut Frame, area: Rect, state: &AppState, team_id: u32) {
    let block = Block::default()
        .title("Relegation report")
        .borders(Borders::ALL);
    let text = match state.relegation_report(team_id) {
        Ok(report) => relegation_lines(&report, state),
        Err(err) => vec![Line::styled(
            err.to_string(),
            Style::default().fg(Color::Red),
        )],
    };
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn relegation_lines(report: &RelegationReport, state: &AppState) -> Vec<Line<'static>> {
    let subject = &report.subject;
    let cutoff = &report.cutoff;
    let status_style = Style::default()
        .fg(status_color(report.status))
        .add_modifier(Modifier::BOLD);
    let yes_no = |v: bool| if v { "yes" } else { "no" };

    let mut lines = vec![
        Line::from(format!(
            "{} | {}th | {} pts | {}",
            subject.team.display_name(),
            subject.position,
            subject.points,
            tier_text(state.tier_of(subject)),
        )),
        Line::from(vec![
            Span::raw("Status: "),
            Span::styled(report.status.label(), status_style),
        ]),
        Line::from(""),
        Line::from(format!(
            "Games left: {} | Max points: {}",
            games_remaining(subject, &state.season),
            report.subject_max_points
        )),
        Line::from(format!(
            "Cutoff ({}th): {} | {} pts | max {} ({} left)",
            cutoff.position,
            cutoff.team.display_name(),
            cutoff.points,
            report.cutoff_max_points,
            games_remaining(cutoff, &state.season),
        )),
        Line::from(format!(
            "Mathematically safe: {}",
            yes_no(report.is_mathematically_safe)
        )),
        Line::from(format!(
            "Points needed: {} ({} wins)",
            report.points_needed_for_safety, report.wins_needed
        )),
        Line::from(format!(
            "Can still be relegated: {}",
            yes_no(report.can_still_be_relegated)
        )),
    ];
    if let Some(gap) = report.points_to_escape_zone {
        lines.push(Line::from(format!("Points to escape the zone: {gap}")));
    }
    lines
}

fn render_loading(frame: &mut Frame, area: Rect, pending: Pending) {
    let what = match pending {
        Pending::Teams => "teams",
        Pending::Standings | Pending::Relegation => "standings",
        Pending::TeamMatches { .. } => "fixtures",
    };
    let loading = Paragraph::new(format!("Loading {what}..."))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(loading, area);
}

fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let text = vec![
        Line::styled(message.to_string(), Style::default().fg(Color::Red)),
        Line::from(""),
        Line::from("b: back | m: menu"),
    ];
    let err = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Error").borders(Borders::ALL));
    frame.render_widget(err, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::ChampionsLeague => Color::Green,
        Tier::EuropaLeague | Tier::ConferenceLeague => Color::Cyan,
        Tier::RelegationPlayoff => Color::Yellow,
        Tier::Relegation => Color::Red,
        Tier::None => Color::Reset,
    }
}

fn tier_text(tier: Tier) -> &'static str {
    match tier {
        Tier::ChampionsLeague => "Champions League",
        Tier::EuropaLeague => "Europa League",
        Tier::ConferenceLeague => "Conference League",
        Tier::RelegationPlayoff => "Relegation play-off",
        Tier::Relegation => "Relegation",
        Tier::None => "Mid-table",
    }
}

fn status_color(status: RelegationStatus) -> Color {
    match status {
        RelegationStatus::Safe => Color::Green,
        RelegationStatus::Warning => Color::Yellow,
        RelegationStatus::Danger => Color::Red,
    }
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn format_kickoff(utc: DateTime<Utc>) -> String {
    let local = utc + ChronoDuration::hours(lisbon_offset_hours(utc));
    format!("{} (Lisbon)", local.format("%A, %d %B %Y %H:%M"))
}

/// Western European time: UTC+1 from the last Sunday of March to the last Sunday of
/// October, switching at 01:00 UTC.
fn lisbon_offset_hours(utc: DateTime<Utc>) -> i64 {
    let year = utc.year();
    let (Some(start), Some(end)) = (last_sunday_0100(year, 3), last_sunday_0100(year, 10)) else {
        return 0;
    };
    if utc >= start && utc < end { 1 } else { 0 }
}

fn last_sunday_0100(year: i32, month: u32) -> Option<DateTime<Utc>> {
    // March and October both have 31 days.
    let last = NaiveDate::from_ymd_opt(year, month, 31)?;
    let back = last.weekday().num_days_from_sunday() as i64;
    let sunday = last - ChronoDuration::days(back);
    Some(sunday.and_hms_opt(1, 0, 0)?.and_utc())
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Liga Terminal - Help",
        "",
        "Global:",
        "  j/k or ↑/↓   Move",
        "  Enter        Open / select",
        "  b / Esc      Back",
        "  m            Menu",
        "  r            Refresh current view",
        "  e            Export table to xlsx",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Next match:",
        "  t            Choose another team",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
