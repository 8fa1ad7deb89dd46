//! Frame layout: header, body panes, status bar and the alert overlay.

pub mod event_detail;
pub mod event_list;
pub mod landing;

use planner_core::dashboard::View;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{App, Entry, Focus};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  match app.dashboard.view {
    View::Landing => landing::draw(f, rows[1], app),
    View::Dashboard => draw_body(f, rows[1], app),
  }
  draw_status(f, rows[2], app);

  if let Some(msg) = &app.alert {
    draw_alert(f, area, msg);
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let left = Span::styled(
    " planner",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = match app.dashboard.view {
    View::Landing => Span::raw(""),
    View::Dashboard => Span::styled(
      format!("new events in: {} ", app.language()),
      Style::default().fg(Color::Gray),
    ),
  };

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::DarkGray)),
    area,
  );
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
    .split(area);

  event_list::draw(f, cols[0], app);

  if app.dashboard.detail.is_some() || app.detail_error.is_some() {
    event_detail::draw(f, cols[1], app);
  } else {
    draw_empty_detail(f, cols[1]);
  }
}

fn draw_empty_detail(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Event ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new("Select an event and press Enter.").style(Style::default().fg(Color::DarkGray)),
    inner,
  );
}

/// Border colour for a pane, bright when it has keyboard focus.
pub(crate) fn pane_style(app: &App, pane: Focus) -> Style {
  if app.focus == pane && app.entry == Entry::None {
    Style::default().fg(Color::Cyan)
  } else {
    Style::default().fg(Color::DarkGray)
  }
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match (app.dashboard.view, app.entry) {
    (View::Landing, _) => ("SIGN IN", "Enter send/verify  Tab switch field  Esc quit"),
    (View::Dashboard, Entry::Filter) => ("SEARCH", "Type to filter  Esc cancel  Enter done"),
    (View::Dashboard, Entry::NewTitle) => ("NEW", "Type a title  Enter create  Esc cancel"),
    (View::Dashboard, Entry::None) => (
      "NORMAL",
      "jk move  Tab pane  Enter open  n new  t lang  / search  r refresh  e edit  s save  c select  f folder  g concepts  p packs  o sign out  q quit",
    ),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let line = Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray)),
  ]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

// ─── Alert ────────────────────────────────────────────────────────────────────

fn draw_alert(f: &mut Frame, area: Rect, msg: &str) {
  let width = area.width.saturating_sub(4).min(60);
  let height = area.height.min(7);
  let popup = Rect {
    x: area.x + (area.width.saturating_sub(width)) / 2,
    y: area.y + (area.height.saturating_sub(height)) / 2,
    width,
    height,
  };

  let block = Block::default()
    .title(" Alert ")
    .title_bottom(Line::from(" any key to dismiss ").right_aligned())
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow));

  f.render_widget(Clear, popup);
  f.render_widget(
    Paragraph::new(msg.to_string())
      .block(block)
      .wrap(Wrap { trim: true }),
    popup,
  );
}
