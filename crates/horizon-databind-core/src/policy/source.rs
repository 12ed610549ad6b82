//! Where the last committed change came from.

use std::fmt;

/// Origin of the most recent committed change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueSource {
    /// Edited through the UI or a `set` call.
    User,
    /// Pulled from the external getter.
    External,
    /// Initial or reset-to-default value.
    #[default]
    Default,
    /// Loaded from text, typically configuration.
    Config,
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::External => "external",
            Self::Default => "default",
            Self::Config => "config",
        };
        f.write_str(name)
    }
}

/// Holds the last-write source tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceTrackingPolicy {
    last_source: ValueSource,
}

impl SourceTrackingPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_source(&self) -> ValueSource {
        self.last_source
    }

    pub fn set_source(&mut self, source: ValueSource) {
        self.last_source = source;
    }
}
