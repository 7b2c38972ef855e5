//! View selector — left panel.

use phonebook_core::view::View;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};
use strum::IntoEnumIterator;

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let active = app.view.query().view;

  let mut lines: Vec<Line> = View::iter()
    .enumerate()
    .map(|(i, view)| {
      let style = if view == active {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
      } else {
        Style::default()
      };
      Line::from(vec![
        Span::styled(format!("{} ", i + 1), Style::default().fg(Color::DarkGray)),
        Span::styled(view.title(), style),
      ])
    })
    .collect();

  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    format!("★ {} favorites", app.favorites.len()),
    Style::default().fg(Color::Yellow),
  )));

  let block = Block::default()
    .title(" Views ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  f.render_widget(Paragraph::new(lines).block(block), area);
}
