//! Sign-in form shown while signed out.

use ratatui::{
  Frame,
  layout::{Constraint, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, LandingField};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let [column] = Layout::horizontal([Constraint::Max(64)])
    .flex(Flex::Center)
    .areas(area);
  let [form] = Layout::vertical([Constraint::Length(11)])
    .flex(Flex::Center)
    .areas(column);

  let field = |label: &'static str, value: &str, active: bool| {
    let style = if active {
      Style::default().fg(Color::Yellow)
    } else {
      Style::default()
    };
    let cursor = if active { "_" } else { "" };
    Line::from(vec![
      Span::styled(
        format!("{label:<7}"),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
      ),
      Span::styled(format!("{value}{cursor}"), style),
    ])
  };

  let lines = vec![
    Line::from("Enter your email to receive a sign-in link."),
    Line::from("Then type the code from that email."),
    Line::from(""),
    field("email", &app.email, app.landing_field == LandingField::Email),
    field("code", &app.code, app.landing_field == LandingField::Code),
    Line::from(""),
    Line::styled(app.sign_in_msg.clone(), Style::default().fg(Color::Gray)),
  ];

  let block = Block::default()
    .title(" Sign in ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  f.render_widget(
    Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
    form,
  );
}
