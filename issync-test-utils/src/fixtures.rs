//! GitHub API fixtures

use serde_json::{Value, json};

/// An issue object as returned by the GitHub issue list endpoint.
///
/// `milestone` is `None` for a null milestone, `Some(None)` for a milestone
/// without a title and `Some(Some(title))` otherwise.
pub fn issue_json(number: u64, labels: &[&str], milestone: Option<Option<&str>>) -> Value {
  let labels: Vec<Value> = labels
    .iter()
    .enumerate()
    .map(|(index, name)| json!({"id": index + 1, "name": name, "color": "ededed"}))
    .collect();

  let milestone = match milestone {
    None => Value::Null,
    Some(title) => json!({"number": 1, "title": title, "state": "open"}),
  };

  json!({
    "number": number,
    "title": format!("Issue {number}"),
    "state": "open",
    "html_url": format!("https://github.com/org/repo/issues/{number}"),
    "labels": labels,
    "milestone": milestone,
    "created_at": "2020-01-01T00:00:00Z",
    "updated_at": "2020-01-02T00:00:00Z"
  })
}

/// A `link` header pointing at page `next` and page `last` of a repository's
/// issue list served from `base_url`.
pub fn link_header(base_url: &str, repo: &str, next: usize, last: usize) -> String {
  format!(
    r#"<{base_url}/repos/{repo}/issues?page={next}>; rel="next", <{base_url}/repos/{repo}/issues?page={last}>; rel="last""#
  )
}
