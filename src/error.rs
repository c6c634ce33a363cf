use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no GPU enumeration source available (no lspci, no PCI sysfs, no embedded nodes)")]
    NoBus,

    #[error("bus listing present but no graphics devices found")]
    NoDisplay,

    #[error("no applicable GPU switcher found and environment alone cannot effect profile '{profile}'")]
    NoSwitcher { profile: String },

    #[error("corrupt {region} region in {path} (lines {start_line}..{end_line}): unbalanced sentinels")]
    CorruptRegion {
        region: String,
        path: PathBuf,
        start_line: usize,
        end_line: usize,
    },

    #[error("compositor config not found: {path}")]
    MissingConfig { path: PathBuf },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid preset field {id}.{path}: {reason}")]
    InvalidField {
        id: String,
        path: String,
        reason: String,
    },

    #[error("preset '{0}' already exists (pass --force to overwrite)")]
    Conflict(String),

    #[error("preset '{0}' not found")]
    NotFound(String),

    #[error("preset '{0}' is built-in and cannot be deleted")]
    Builtin(String),

    #[error("unknown profile '{0}'")]
    UnknownProfile(String),

    #[error("external step failed: {0}")]
    Execution(String),

    #[error("another invocation is already running (lock held on {path})")]
    Busy { path: PathBuf },

    #[error("state file error: {0}")]
    State(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Exit code contract: 0 success, 1 invalid usage, 2 corrupted state,
    /// 3 external-tool failure, 4 preset validation failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::UnknownProfile(_) => 1,
            Error::NoSwitcher { .. } | Error::Execution(_) => 3,
            Error::InvalidField { .. }
            | Error::Conflict(_)
            | Error::NotFound(_)
            | Error::Builtin(_) => 4,
            _ => 2,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
