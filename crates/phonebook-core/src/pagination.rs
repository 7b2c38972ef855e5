//! Page arithmetic and the page-number strip shown under the contact list.

use std::num::NonZeroUsize;

/// Number of page buttons shown before the strip collapses with ellipses.
pub const MAX_VISIBLE_PAGES: usize = 7;

/// `max(1, ceil(total_results / page_size))`.
pub fn total_pages(total_results: usize, page_size: NonZeroUsize) -> usize {
  total_results.div_ceil(page_size.get()).max(1)
}

/// Half-open index range `[start, end)` of `page` within `total_results`.
///
/// Page `0` is treated as page 1. A page past the end yields an empty range
/// positioned at `total_results`.
pub fn page_bounds(
  page: usize,
  page_size: NonZeroUsize,
  total_results: usize,
) -> (usize, usize) {
  let size = page_size.get();
  let start = page
    .max(1)
    .saturating_sub(1)
    .saturating_mul(size)
    .min(total_results);
  let end = start.saturating_add(size).min(total_results);
  (start, end)
}

/// One entry in the page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
  Page(usize),
  Ellipsis,
}

/// The page-number strip for `current` of `total`.
///
/// Up to [`MAX_VISIBLE_PAGES`] pages are listed outright. Beyond that the
/// first and last page are always present, with a window around `current`
/// that widens to pages 2–5 near the start and to the last five near the end.
pub fn page_window(current: usize, total: usize) -> Vec<PageItem> {
  let total = total.max(1);
  let current = current.clamp(1, total);

  if total <= MAX_VISIBLE_PAGES {
    return (1..=total).map(PageItem::Page).collect();
  }

  let mut start = current.saturating_sub(1).max(2);
  let mut end = (current + 1).min(total - 1);
  if current <= 3 {
    end = 5;
  } else if current >= total - 2 {
    start = total - 4;
  }

  let mut items = vec![PageItem::Page(1)];
  if start > 2 {
    items.push(PageItem::Ellipsis);
  }
  items.extend(
    (start..=end)
      .filter(|&p| p > 1 && p < total)
      .map(PageItem::Page),
  );
  if end < total - 1 {
    items.push(PageItem::Ellipsis);
  }
  items.push(PageItem::Page(total));
  items
}

#[cfg(test)]
mod tests {
  use super::{PageItem::*, *};

  fn size(n: usize) -> NonZeroUsize { NonZeroUsize::new(n).unwrap() }

  #[test]
  fn total_pages_is_at_least_one() {
    assert_eq!(total_pages(0, size(20)), 1);
    assert_eq!(total_pages(20, size(20)), 1);
    assert_eq!(total_pages(21, size(20)), 2);
    assert_eq!(total_pages(25, size(20)), 2);
    assert_eq!(total_pages(41, size(20)), 3);
  }

  #[test]
  fn bounds_clip_to_results() {
    assert_eq!(page_bounds(1, size(20), 25), (0, 20));
    assert_eq!(page_bounds(2, size(20), 25), (20, 25));
    assert_eq!(page_bounds(3, size(20), 25), (25, 25));
    assert_eq!(page_bounds(0, size(20), 25), (0, 20));
    assert_eq!(page_bounds(usize::MAX, size(20), 25), (25, 25));
    assert_eq!(page_bounds(1, size(20), 0), (0, 0));
  }

  #[test]
  fn short_strip_lists_every_page() {
    assert_eq!(page_window(1, 1), vec![Page(1)]);
    assert_eq!(page_window(4, 7), (1..=7).map(Page).collect::<Vec<_>>());
  }

  #[test]
  fn strip_near_start() {
    assert_eq!(
      page_window(1, 10),
      vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(10)]
    );
    assert_eq!(page_window(3, 10), page_window(1, 10));
  }

  #[test]
  fn strip_in_middle() {
    assert_eq!(
      page_window(5, 10),
      vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)]
    );
  }

  #[test]
  fn strip_near_end() {
    let expected = vec![Page(1), Ellipsis, Page(6), Page(7), Page(8), Page(9), Page(10)];
    assert_eq!(page_window(8, 10), expected);
    assert_eq!(page_window(10, 10), expected);
  }

  #[test]
  fn strip_clamps_out_of_range_current() {
    assert_eq!(page_window(0, 3), vec![Page(1), Page(2), Page(3)]);
    assert_eq!(page_window(99, 10), page_window(10, 10));
  }
}
