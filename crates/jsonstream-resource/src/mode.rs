use std::fmt;

/// Which directions of transfer a stream permits.
///
/// Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
    #[default]
    ReadAndWrite,
}

impl AccessMode {
    /// Whether documents may be read in this mode.
    pub fn can_read(self) -> bool {
        matches!(self, Self::ReadOnly | Self::ReadAndWrite)
    }

    /// Whether documents may be written in this mode.
    pub fn can_write(self) -> bool {
        matches!(self, Self::WriteOnly | Self::ReadAndWrite)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadOnly => "ReadOnly",
            Self::WriteOnly => "WriteOnly",
            Self::ReadAndWrite => "ReadAndWrite",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
