//! Left panel: the session box above the event list.

use planner_core::view::Section;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::{
  app::{App, Entry, Focus},
  ui::pane_style,
};

/// Render the session box and the event list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let session_json = app
    .dashboard
    .session
    .as_ref()
    .map(|s| s.to_pretty_json())
    .unwrap_or_default();
  let session_height = session_json.lines().count() as u16 + 2;

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(session_height), Constraint::Min(0)])
    .split(area);

  f.render_widget(
    Paragraph::new(session_json)
      .style(Style::default().fg(Color::Gray))
      .block(
        Block::default()
          .title(" Session ")
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::DarkGray)),
      ),
    rows[0],
  );

  draw_events(f, rows[1], app);
}

fn draw_events(f: &mut Frame, area: Rect, app: &App) {
  let filtered = app.filtered_events();
  let total = app.dashboard.events.rows().len();

  let title = if app.entry == Entry::Filter || !app.filter.is_empty() {
    format!(" Events ({}/{}) ", filtered.len(), total)
  } else {
    format!(" Events ({total}) ")
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(pane_style(app, Focus::Events));
  let mut inner = block.inner(area);
  f.render_widget(block, area);

  // Filter or new-title entry line at the bottom.
  let entry_line = match app.entry {
    Entry::Filter => Some(format!("/{}_", app.filter)),
    Entry::NewTitle => Some(format!("new ({}): {}_", app.language(), app.new_title)),
    Entry::None if !app.filter.is_empty() => Some(format!("/{}", app.filter)),
    Entry::None => None,
  };
  if let Some(text) = entry_line
    && inner.height > 1
  {
    let entry_area = Rect {
      y: inner.y + inner.height - 1,
      height: 1,
      ..inner
    };
    inner.height -= 1;
    f.render_widget(
      Paragraph::new(text).style(Style::default().fg(Color::Yellow)),
      entry_area,
    );
  }

  if let Section::Failed(placeholder) = &app.dashboard.events {
    f.render_widget(
      Paragraph::new(*placeholder).style(Style::default().fg(Color::Red)),
      inner,
    );
    return;
  }

  let items: Vec<ListItem> = filtered
    .iter()
    .map(|row| {
      let mut spans = vec![Span::raw(row.summary())];
      if row.drive_link.is_some() {
        spans.push(Span::styled(" ▸ drive", Style::default().fg(Color::DarkGray)));
      }
      ListItem::new(Line::from(spans))
    })
    .collect();

  let mut state = ListState::default();
  state.select((!filtered.is_empty()).then_some(app.list_cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner,
    &mut state,
  );
}
