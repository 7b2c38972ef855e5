//! Contact detail pane — right panel.

use phonebook_core::contact::{Contact, ContactField};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, Screen};

const FIELDS: [(&str, ContactField); 9] = [
  ("designation", ContactField::Designation),
  ("department", ContactField::Department),
  ("company", ContactField::Company),
  ("extension", ContactField::Extension),
  ("email", ContactField::Email),
  ("mobile", ContactField::Mobile),
  ("landline", ContactField::Landline),
  ("website", ContactField::Website),
  ("comments", ContactField::Comments),
];

/// Render `contact` (the selection, or the cursor row as a preview).
pub fn draw(f: &mut Frame, area: Rect, app: &App, contact: Option<&Contact>) {
  let focused = app.screen == Screen::ContactDetail;
  let title = contact.map_or(" Detail ".to_string(), |c| format!(" {} ", c.display_name()));

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(if focused { Color::Gray } else { Color::DarkGray }));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let Some(contact) = contact else {
    f.render_widget(
      Paragraph::new("Select a contact and press Enter.")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  let lines = detail_lines(contact, app.favorites.contains(&contact.id));
  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

/// Label/value lines for every non-empty field, then the badges.
fn detail_lines(contact: &Contact, favorite: bool) -> Vec<Line<'static>> {
  let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
  let id = (!contact.id.is_empty()).then(|| ("id", contact.id.as_str()));
  let mut lines: Vec<Line<'static>> = id
    .into_iter()
    .chain(FIELDS.iter().map(|&(name, field)| (name, contact.text(field))))
    .filter_map(|(name, value)| {
      (!value.is_empty()).then(|| {
        Line::from(vec![
          Span::styled(format!("{name:<14}"), label),
          Span::raw(value.to_string()),
        ])
      })
    })
    .collect();

  for (name, values) in [("languages", &contact.languages), ("tags", &contact.tags)] {
    if !values.is_empty() {
      lines.push(Line::from(vec![
        Span::styled(format!("{name:<14}"), label),
        Span::raw(values.join(", ")),
      ]));
    }
  }

  let badges: Vec<&str> = [
    (contact.is_ert, "ERT"),
    (contact.is_ifa, "IFA"),
    (contact.is_third_party, "third party"),
    (favorite, "★ favorite"),
  ]
  .into_iter()
  .filter_map(|(on, badge)| on.then_some(badge))
  .collect();
  if !badges.is_empty() {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
      badges.join("  "),
      Style::default().fg(Color::Yellow),
    )));
  }

  lines
}
