//! TUI rendering — orchestrates all panes.

pub mod contact_detail;
pub mod contact_list;
pub mod sidebar;

use chrono::Local;
use phonebook_core::emergency::{EMERGENCY_REGION, EMERGENCY_SERVICES};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, Mode, Screen};

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
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);

  if matches!(app.mode, Mode::TagPicker | Mode::LanguagePicker) {
    draw_picker(f, rows[1], app);
  }
  if app.mode == Mode::EmergencyNumbers {
    draw_emergency(f, rows[1]);
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let query = app.view.query();
  let date = Local::now().format("%Y-%m-%d").to_string();

  let mut title = format!(
    " phonebook · {} · {} results · sort: {}",
    query.view.title(),
    app.view.total_results(),
    query.sort_by,
  );
  if let Some(tag) = &query.tag {
    title.push_str(&format!(" · tag: {tag}"));
  }
  if let Some(language) = &query.language {
    title.push_str(&format!(" · language: {language}"));
  }

  let left = Span::styled(
    title,
    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::DarkGray));

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Length(26),
      Constraint::Percentage(50),
      Constraint::Min(0),
    ])
    .split(area);

  sidebar::draw(f, cols[0], app);
  contact_list::draw(f, cols[1], app);

  let shown = match app.screen {
    Screen::ContactDetail => app.selected_contact(),
    Screen::ContactList => app.cursor_contact(),
  };
  contact_detail::draw(f, cols[2], app, shown);
}

// ─── Picker overlay ───────────────────────────────────────────────────────────

/// A `width` x `height` rectangle centred in `area`, shrunk to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = area.width.min(width);
  let height = area.height.min(height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}

fn draw_picker(f: &mut Frame, area: Rect, app: &App) {
  let (title, selected) = match app.mode {
    Mode::TagPicker => (" Tag ", app.view.query().tag.as_deref()),
    _ => (" Language ", app.view.query().language.as_deref()),
  };
  let items = app.picker_items();

  let popup = centered(area, 36, items.len() as u16 + 2);

  let list_items: Vec<ListItem> = items
    .iter()
    .map(|item| {
      let mark = if Some(item.as_str()) == selected { "● " } else { "  " };
      ListItem::new(format!("{mark}{item}"))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.picker_cursor));

  f.render_widget(Clear, popup);
  f.render_stateful_widget(
    List::new(list_items)
      .block(
        Block::default()
          .title(title)
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::Yellow)),
      )
      .highlight_style(
        Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD),
      ),
    popup,
    &mut state,
  );
}

fn draw_emergency(f: &mut Frame, area: Rect) {
  let mut lines = vec![
    Line::from(Span::styled(
      format!("{EMERGENCY_REGION} emergency contact numbers"),
      Style::default().fg(Color::DarkGray),
    )),
    Line::from(""),
  ];
  lines.extend(EMERGENCY_SERVICES.iter().map(|service| {
    Line::from(vec![
      Span::styled(
        format!("{:<16}", service.name),
        Style::default().add_modifier(Modifier::BOLD),
      ),
      Span::styled(
        service.number,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
      ),
    ])
  }));

  let popup = centered(area, 40, lines.len() as u16 + 2);
  f.render_widget(Clear, popup);
  f.render_widget(
    Paragraph::new(lines).block(
      Block::default()
        .title(" Emergency Numbers ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red)),
    ),
    popup,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match (app.mode, app.screen) {
    (Mode::Search, _) => ("SEARCH", "Type to filter  Enter apply  Esc clear"),
    (Mode::TagPicker | Mode::LanguagePicker, _) => {
      ("PICK", "↑↓/jk move  Enter toggle  Esc close")
    }
    (Mode::EmergencyNumbers, _) => ("SOS", "Esc close"),
    (Mode::Normal, Screen::ContactList) => (
      "NORMAL",
      "1-7 view  / search  s sort  t/L tag/lang  ←→ page  f fav  e sos  r reload  q quit",
    ),
    (Mode::Normal, Screen::ContactDetail) => {
      ("DETAIL", "↑↓/jk next/prev  f favorite  e sos  Esc back  q quit")
    }
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span]))
      .style(Style::default().bg(Color::Black)),
    area,
  );
}
