use std::fmt;

/// Classes of unrecoverable errors, each with a distinct process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalKind {
    Unknown,
    ConfigDecode,
    ConfigSave,
}

impl FatalKind {
    pub fn code(&self) -> u8 {
        match self {
            FatalKind::Unknown => 2,
            FatalKind::ConfigDecode => 3,
            FatalKind::ConfigSave => 4,
        }
    }
}

/// An error that terminates the session, carrying a numeric code and
/// free-text context for the final diagnostic.
#[derive(Debug)]
pub struct FatalError {
    kind: FatalKind,
    message: String,
    context: String,
}

impl FatalError {
    pub fn new(kind: FatalKind, message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: context.into(),
        }
    }

    pub fn kind(&self) -> FatalKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.code()
    }
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "rill fatal error: {} <code {} ({:#x})>",
            self.message,
            self.kind.code(),
            self.kind.code()
        )?;
        write!(f, "reason: {}", self.context)
    }
}

impl std::error::Error for FatalError {}
