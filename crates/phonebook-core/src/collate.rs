//! Locale-aware string comparison for sorting the directory.
//!
//! Approximates the root-locale collation a browser applies in
//! `localeCompare`. Strings are decomposed (NFD) and compared in three
//! passes:
//!
//! 1. base characters, ordered by class first (whitespace, punctuation and
//!    symbols, digits, letters) and without regard to case, so `É` sorts
//!    with `e`;
//! 2. accents, with the unaccented form first;
//! 3. case, lowercase first.
//!
//! Digits are compared one character at a time, so `"103" < "12" < "9"`.

use std::cmp::Ordering;

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Class {
  Whitespace,
  Symbol,
  Digit,
  Letter,
}

fn class(c: char) -> Class {
  if c.is_whitespace() {
    Class::Whitespace
  } else if c.is_alphabetic() {
    Class::Letter
  } else if c.is_numeric() {
    Class::Digit
  } else {
    Class::Symbol
  }
}

fn fold(c: char) -> char { c.to_lowercase().next().unwrap_or(c) }

/// A base character and the combining marks that follow it.
struct Unit {
  base:  char,
  marks: String,
}

fn units(s: &str) -> Vec<Unit> {
  let mut out: Vec<Unit> = Vec::new();
  for c in s.nfd() {
    match out.last_mut() {
      Some(unit) if is_combining_mark(c) => unit.marks.push(c),
      _ => out.push(Unit { base: c, marks: String::new() }),
    }
  }
  out
}

fn primary(u: &Unit) -> (Class, char) { (class(u.base), fold(u.base)) }

fn secondary(u: &Unit) -> &str { &u.marks }

fn tertiary(u: &Unit) -> bool { u.base.is_uppercase() }

/// Compare two strings the way the directory sorts them.
pub fn compare(a: &str, b: &str) -> Ordering {
  let (ua, ub) = (units(a), units(b));
  ua.iter()
    .map(primary)
    .cmp(ub.iter().map(primary))
    .then_with(|| ua.iter().map(secondary).cmp(ub.iter().map(secondary)))
    .then_with(|| ua.iter().map(tertiary).cmp(ub.iter().map(tertiary)))
    .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sorted(mut items: Vec<&str>) -> Vec<&str> {
    items.sort_by(|a, b| compare(a, b));
    items
  }

  #[test]
  fn letters_ignore_case() {
    assert_eq!(compare("alice", "Bob"), Ordering::Less);
    assert_eq!(sorted(vec!["bob", "Alice", "carol"]), vec!["Alice", "bob", "carol"]);
  }

  #[test]
  fn lowercase_breaks_ties_first() {
    assert_eq!(compare("a", "A"), Ordering::Less);
    assert_eq!(compare("Sales", "sales"), Ordering::Greater);
    assert_eq!(compare("Sales", "Sales"), Ordering::Equal);
  }

  #[test]
  fn empty_sorts_first() {
    assert_eq!(sorted(vec!["Ops", "", "Admin"]), vec!["", "Admin", "Ops"]);
  }

  #[test]
  fn classes_order_whitespace_symbols_digits_letters() {
    assert_eq!(sorted(vec!["a", "1", "-", " "]), vec![" ", "-", "1", "a"]);
  }

  #[test]
  fn extensions_compare_as_strings() {
    assert_eq!(sorted(vec!["9", "103", "12"]), vec!["103", "12", "9"]);
  }

  #[test]
  fn accented_letters_sort_with_their_base_letter() {
    assert_eq!(
      sorted(vec!["Zoe", "Émile", "Adam", "Óscar", "Peter"]),
      vec!["Adam", "Émile", "Óscar", "Peter", "Zoe"],
    );
    assert_eq!(compare("Élan", "Emma"), Ordering::Less);
  }

  #[test]
  fn accents_break_ties_before_case() {
    assert_eq!(sorted(vec!["f", "é", "e"]), vec!["e", "é", "f"]);
    assert_eq!(compare("Nunez", "Nuñez"), Ordering::Less);
    // An accent outweighs a case difference.
    assert_eq!(compare("Emile", "émile"), Ordering::Less);
  }

  #[test]
  fn prefix_sorts_before_longer_string() {
    assert_eq!(compare("Ann", "Anna"), Ordering::Less);
  }
}
