//! Canonical identity of git-sourced packages.
//!
//! The same repository can be spelled many ways (`.git` suffix or not, a
//! trailing slash, a `#ref`, a leading slash in `path=`). Two URLs refer to the
//! same package when their canonical identities are equal.

use std::sync::LazyLock;

use regex::Regex;

static REPO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"github\.com/([^/]+/[^/?.#]+)").expect("valid regex"));
static PATH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"path=([^&#]+)").expect("valid regex"));

/// Returns `owner/repo[/subpath]` for a GitHub URL, or the input unchanged
/// when it does not name a GitHub repository.
///
/// # Examples
///
/// ```
/// use templar_lib::diff::canonical_git_identity;
///
/// assert_eq!(
///   canonical_git_identity("https://github.com/o/r.git?path=/src/Pkg"),
///   "o/r/src/Pkg"
/// );
/// ```
pub fn canonical_git_identity(url: &str) -> String {
  let Some(repo) = REPO_RE.captures(url).and_then(|c| c.get(1)) else {
    return url.to_string();
  };

  let mut identity = repo.as_str().to_string();
  if let Some(path) = PATH_RE.captures(url).and_then(|c| c.get(1)) {
    let path = path.as_str().trim_start_matches('/');
    if !path.is_empty() {
      identity.push('/');
      identity.push_str(path);
    }
  }
  identity
}

/// Whether two URLs canonicalize to the same identity.
pub fn same_git_package(a: &str, b: &str) -> bool {
  canonical_git_identity(a) == canonical_git_identity(b)
}
