/// How the host creates directory links.
///
/// Unix-like systems get relative symlinks; Windows gets junctions, which
/// need no elevation and no developer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
  Unix,
  Windows,
}

impl Os {
  /// The flavor this binary was built for.
  pub const fn current() -> Self {
    if cfg!(windows) { Os::Windows } else { Os::Unix }
  }

  /// Human name of a directory link on this OS, for messages.
  pub fn link_kind(&self) -> &'static str {
    match self {
      Os::Unix => "symlink",
      Os::Windows => "junction",
    }
  }
}
