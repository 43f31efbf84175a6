//! # Link Header Pagination
//!
//! GitHub paginates list endpoints through the `link` response header, a
//! comma-separated list of `<url>; rel="name"` entries. Only the `next` and
//! `last` relations matter for walking the issue list.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static LINK_ENTRY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"^\s*<([^>]*)>\s*;\s*rel="?([^";]+)"?\s*$"#).expect("Failed to compile link header regex")
});

/// URL of the next page of a paginated response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink(String);

impl PageLink {
  pub fn new(url: impl Into<String>) -> Self {
    Self(url.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for PageLink {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Parse a `link` header into a map of relation name to URL.
///
/// Entries that do not look like `<url>; rel="name"` are skipped. Relation
/// order in the header is irrelevant.
pub fn parse_link_header(value: &str) -> HashMap<String, String> {
  value
    .split(',')
    .filter_map(|entry| {
      let captures = LINK_ENTRY_REGEX.captures(entry)?;
      let url = captures.get(1)?.as_str().to_string();
      let rel = captures.get(2)?.as_str().to_string();
      Some((rel, url))
    })
    .collect()
}

/// Continuation link for a response, if more pages remain.
///
/// A next page exists only when both `next` and `last` relations are present.
pub fn next_page_link(link_header: Option<&str>) -> Option<PageLink> {
  let mut pages = parse_link_header(link_header?);
  if pages.contains_key("last") {
    pages.remove("next").map(PageLink)
  } else {
    None
  }
}
