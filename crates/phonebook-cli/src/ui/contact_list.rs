//! Contact list pane — one page of the directory plus the page strip.

use phonebook_core::{
  contact::Contact,
  pagination::{PageItem, page_window},
};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, Mode, Screen};

/// Render the contact list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let query = app.view.query();
  let title = format!(
    " {} ({}) · page {}/{} ",
    query.view.title(),
    app.view.total_results(),
    query.page,
    app.view.total_pages(),
  );

  let border = if app.screen == Screen::ContactDetail {
    Color::DarkGray
  } else {
    Color::Gray
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let mut inner = block.inner(area);
  f.render_widget(block, area);

  // Search bar and page strip take one line each at the bottom.
  let show_search = app.mode == Mode::Search || !app.search_input.is_empty();
  let reserved = 1 + u16::from(show_search);
  if inner.height > reserved {
    let footer_y = inner.y + inner.height - reserved;
    inner.height -= reserved;

    let strip = Rect { x: inner.x, y: footer_y, width: inner.width, height: 1 };
    f.render_widget(Paragraph::new(page_strip(query.page, app.view.total_pages())), strip);

    if show_search {
      let cursor = if app.mode == Mode::Search { "_" } else { "" };
      let pending = if app.search_pending() { "  …" } else { "" };
      let text = format!("/{}{cursor}{pending}", app.search_input);
      let bar = Rect { y: footer_y + 1, ..strip };
      f.render_widget(Paragraph::new(text).style(Style::default().fg(Color::Yellow)), bar);
    }
  }

  let visible = app.visible();
  if visible.is_empty() {
    let message = if app.snapshot.is_none() {
      "No contacts loaded."
    } else {
      "No contacts match."
    };
    f.render_widget(
      Paragraph::new(message).style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let items: Vec<ListItem> = visible.iter().map(|c| row(c, app)).collect();

  let mut state = ListState::default();
  state.select(Some(app.list_cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD),
    ),
    inner,
    &mut state,
  );
}

fn row<'a>(contact: &'a Contact, app: &App) -> ListItem<'a> {
  let star = if app.favorites.contains(&contact.id) { "★ " } else { "  " };

  let role = [contact.designation.as_deref(), contact.department.as_deref()]
    .into_iter()
    .flatten()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" · ");

  let mut spans = vec![
    Span::styled(star, Style::default().fg(Color::Yellow)),
    Span::styled(
      format!("{:<24}", contact.display_name()),
      Style::default().add_modifier(Modifier::BOLD),
    ),
    Span::styled(
      format!(" {:>6}", contact.extension.as_deref().unwrap_or("")),
      Style::default().fg(Color::Cyan),
    ),
    Span::styled(format!("  {role}"), Style::default().fg(Color::DarkGray)),
  ];
  if contact.is_ert {
    spans.push(Span::styled(" ERT", Style::default().fg(Color::Red)));
  }
  ListItem::new(Line::from(spans))
}

/// `‹ 1 … 4 [5] 6 … 12 ›` built from the page window.
fn page_strip(current: usize, total: usize) -> Line<'static> {
  let dim = Style::default().fg(Color::DarkGray);
  let mut spans = vec![Span::styled("‹ ", dim)];
  for item in page_window(current, total) {
    spans.push(match item {
      PageItem::Page(n) if n == current => Span::styled(
        format!("[{n}] "),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
      ),
      PageItem::Page(n) => Span::raw(format!("{n} ")),
      PageItem::Ellipsis => Span::styled("… ", dim),
    });
  }
  spans.push(Span::styled("›", dim));
  Line::from(spans)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn text(line: &Line) -> String { line.spans.iter().map(|s| s.content.as_ref()).collect() }

  #[test]
  fn strip_marks_the_current_page() {
    assert_eq!(text(&page_strip(1, 3)), "‹ [1] 2 3 ›");
    assert_eq!(text(&page_strip(6, 12)), "‹ 1 … 5 [6] 7 … 12 ›");
  }
}
