//! Error types.

use std::{fmt, io};

/// Error raised while preparing the atlas for a composite pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtlasError {
  /// The backing surface could not be allocated.
  Allocation { width: u32, height: u32 },
}

impl fmt::Display for AtlasError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Allocation { width, height } => {
        write!(f, "failed to allocate {width}x{height} atlas surface")
      }
    }
  }
}

impl std::error::Error for AtlasError {}

/// Error loading trail settings.
#[derive(Debug)]
pub enum SettingsError {
  Io(io::Error),
  Parse(toml::de::Error),
}

impl From<io::Error> for SettingsError {
  fn from(err: io::Error) -> Self {
    Self::Io(err)
  }
}

impl From<toml::de::Error> for SettingsError {
  fn from(err: toml::de::Error) -> Self {
    Self::Parse(err)
  }
}

impl fmt::Display for SettingsError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Io(e) => write!(f, "I/O error: {e}"),
      Self::Parse(e) => write!(f, "parse error: {e}"),
    }
  }
}

impl std::error::Error for SettingsError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io(e) => Some(e),
      Self::Parse(e) => Some(e),
    }
  }
}
