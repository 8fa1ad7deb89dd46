//! Right panel: metadata, inputs document, artifacts and concepts of the
//! open event.

use planner_core::view::{EventDetail, InputSource, Section};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::{
  app::{App, Focus},
  ui::pane_style,
};

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the detail pane into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(detail) = &app.dashboard.detail else {
    let block = Block::default()
      .title(" Event ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(
      Paragraph::new(app.detail_error.clone().unwrap_or_default())
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(block),
      area,
    );
    return;
  };

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(5),
      Constraint::Percentage(55),
      Constraint::Min(4),
    ])
    .split(area);

  draw_meta(f, rows[0], detail);
  draw_inputs(f, rows[1], app, detail);

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
    .split(rows[2]);

  let artifacts: Section<Line> = map_section(&detail.artifacts, |a| {
    let mut line = Line::from(a.summary());
    if a.link.is_none() {
      line.push_span(Span::styled(" (no link)", Style::default().fg(Color::DarkGray)));
    }
    line
  });
  draw_section(
    f,
    cols[0],
    app,
    " Artifacts ",
    Focus::Artifacts,
    artifacts,
    app.artifact_cursor,
  );

  let concepts: Section<Line> = map_section(&detail.concepts, |c| {
    let style = if c.selected {
      Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
      Style::default()
    };
    Line::styled(c.summary(), style)
  });
  draw_section(
    f,
    cols[1],
    app,
    " Concepts ",
    Focus::Concepts,
    concepts,
    app.concept_cursor,
  );
}

// ─── Meta ─────────────────────────────────────────────────────────────────────

fn draw_meta(f: &mut Frame, area: Rect, detail: &EventDetail) {
  let label = |s: &'static str| {
    Span::styled(
      format!("{s:<10}"),
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )
  };
  let meta = &detail.meta;
  let lines = vec![
    Line::from(vec![label("language"), Span::raw(meta.language.clone())]),
    Line::from(vec![label("status"), Span::raw(meta.status.clone())]),
    Line::from(vec![
      label("folder"),
      Span::raw(meta.folder_link.clone().unwrap_or_else(|| "—".into())),
    ]),
  ];

  let block = Block::default()
    .title(format!(" {} ", meta.title))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  f.render_widget(Paragraph::new(lines).block(block), area);
}

// ─── Inputs ───────────────────────────────────────────────────────────────────

fn draw_inputs(f: &mut Frame, area: Rect, app: &App, detail: &EventDetail) {
  let source = match detail.input_source {
    InputSource::Stored => "",
    InputSource::Template => " · defaults",
    InputSource::Unreadable => " · stored inputs unreadable, showing defaults",
  };
  let dirty = if app.inputs_dirty { " · modified" } else { "" };

  let mut block = Block::default()
    .title(format!(" Inputs{source}{dirty} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  if !app.inputs_msg.is_empty() {
    let style = if app.inputs_msg.starts_with("Saved") {
      Style::default().fg(Color::Green)
    } else {
      Style::default().fg(Color::Red)
    };
    block = block.title_bottom(Line::styled(format!(" {} ", app.inputs_msg), style));
  }

  f.render_widget(
    Paragraph::new(detail.inputs_text.as_str()).block(block),
    area,
  );
}

// ─── Lists ────────────────────────────────────────────────────────────────────

fn map_section<'a, T>(section: &Section<T>, f: impl Fn(&T) -> Line<'a>) -> Section<Line<'a>> {
  match section {
    Section::Loaded(rows) => Section::Loaded(rows.iter().map(f).collect()),
    Section::Failed(msg) => Section::Failed(*msg),
  }
}

fn draw_section(
  f: &mut Frame,
  area: Rect,
  app: &App,
  title: &str,
  pane: Focus,
  section: Section<Line>,
  cursor: usize,
) {
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(pane_style(app, pane));

  let lines = match section {
    Section::Failed(msg) => {
      f.render_widget(
        Paragraph::new(msg)
          .style(Style::default().fg(Color::Red))
          .block(block),
        area,
      );
      return;
    }
    Section::Loaded(lines) if lines.is_empty() => {
      f.render_widget(
        Paragraph::new("None yet.")
          .style(Style::default().fg(Color::DarkGray))
          .block(block),
        area,
      );
      return;
    }
    Section::Loaded(lines) => lines,
  };

  let mut state = ListState::default();
  if app.focus == pane {
    state.select(Some(cursor));
  }
  f.render_stateful_widget(
    List::new(lines.into_iter().map(ListItem::new))
      .block(block)
      .highlight_style(Style::default().bg(Color::Blue).fg(Color::White)),
    area,
    &mut state,
  );
}
