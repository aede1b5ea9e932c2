use std::borrow::Cow;
use std::path::PathBuf;

use stackresolve_identity::IdentityField;
use thiserror::Error;

use crate::session::HandleKind;
use crate::status::StatusCode;

/// A failed call into a [`DebugInfoProvider`](crate::DebugInfoProvider).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (status: {status})")]
pub struct ProviderError {
    pub status: StatusCode,
    pub message: Cow<'static, str>,
}

impl ProviderError {
    pub fn new(status: StatusCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Reading one field of a handle's identity triple failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Could not read the {field}: {source}")]
pub struct IdentityQueryFailure {
    pub field: IdentityField,
    #[source]
    pub source: ProviderError,
}

impl IdentityQueryFailure {
    pub fn new(field: IdentityField, source: ProviderError) -> Self {
        Self { field, source }
    }
}

/// The step of the line lookup that failed. File and line are resolved as a unit,
/// so every step reports [`Error::LineNotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStep {
    Query,
    NoRecord,
    AmbiguousRecord,
    LineNumber,
    SourceFileName,
}

impl LineStep {
    fn operation(self) -> &'static str {
        match self {
            LineStep::Query => "Failed to find line info by RVA",
            LineStep::NoRecord => "Failed to enumerate line number",
            LineStep::AmbiguousRecord => "Found more than one line record by RVA",
            LineStep::LineNumber => "Failed to get line number",
            LineStep::SourceFileName => "Failed to get source file name",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("Failed to initialize the debug info provider: {0}")]
    Initialization(#[source] ProviderError),

    #[error("Failed to load {kind} file {}: {source}", .path.display())]
    Load {
        kind: HandleKind,
        path: PathBuf,
        #[source]
        source: ProviderError,
    },

    #[error("No function symbol contains RVA 0x{rva:X} (status: {status})")]
    SymbolNotFound { rva: u32, status: StatusCode },

    #[error("{} for RVA 0x{rva:X} (status: {status})", .step.operation())]
    LineNotFound {
        rva: u32,
        step: LineStep,
        status: StatusCode,
    },

    #[error("Failed to get {field} of the {kind}: {source}")]
    IdentityQuery {
        kind: HandleKind,
        field: IdentityField,
        #[source]
        source: ProviderError,
    },
}

/// The error categories, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Initialization,
    Load,
    SymbolNotFound,
    LineNotFound,
    IdentityQuery,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Initialization(_) => ErrorKind::Initialization,
            Error::Load { .. } => ErrorKind::Load,
            Error::SymbolNotFound { .. } => ErrorKind::SymbolNotFound,
            Error::LineNotFound { .. } => ErrorKind::LineNotFound,
            Error::IdentityQuery { .. } => ErrorKind::IdentityQuery,
        }
    }

    /// The raw status code of the provider call that failed.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Initialization(source)
            | Error::Load { source, .. }
            | Error::IdentityQuery { source, .. } => source.status,
            Error::SymbolNotFound { status, .. } | Error::LineNotFound { status, .. } => *status,
        }
    }

    /// A fixed description of the failing operation. Unlike the `Display` output, this
    /// never contains paths or other caller-supplied text.
    pub fn operation(&self) -> Cow<'static, str> {
        match self {
            Error::Initialization(_) => Cow::Borrowed("Failed to initialize debug info provider"),
            Error::Load { kind, .. } => Cow::Owned(format!("Failed to load {kind} file")),
            Error::SymbolNotFound { .. } => Cow::Borrowed("Failed to find symbol by RVA"),
            Error::LineNotFound { step, .. } => Cow::Borrowed(step.operation()),
            Error::IdentityQuery { kind, field, .. } => {
                Cow::Owned(format!("Failed to get {field} of the {kind}"))
            }
        }
    }

    pub fn enum_as_string(&self) -> &'static str {
        match self {
            Error::Initialization(_) => "InitializationError",
            Error::Load { .. } => "LoadError",
            Error::SymbolNotFound { .. } => "SymbolNotFound",
            Error::LineNotFound { .. } => "LineNotFound",
            Error::IdentityQuery { .. } => "IdentityQueryError",
        }
    }
}
