//! This crate resolves module-relative addresses from stack traces to function names,
//! source files and line numbers, using the PDB files that the MSVC toolchain (and
//! compatible linkers) produce. It also checks whether a PDB file belongs to a given
//! build of a module.
//!
//! There are two entry points:
//!
//!  - [`resolve_stack_frame_symbols`] maps one RVA to function, file, line and
//!    displacement.
//!  - [`match_module_with_pdb_file`] compares the {GUID, signature, age} identity triple
//!    of a module with that of a PDB file.
//!
//! Both return a flat report with a status code and a short diagnostic. The same
//! operations are available as `Result`-returning functions, [`resolve_address`] and
//! [`match_identity`].
//!
//! # Design constraints
//!
//!  - Self-contained calls: every call initializes the debug info provider, opens what
//!    it needs, and releases all of it before returning, on success and on every
//!    failure path. Nothing is cached between calls, so resolving a whole stack trace
//!    reopens the PDB file once per frame.
//!  - Strict line policy: an address must be covered by exactly one line record.
//!    Addresses with no line record, or with several, fail with
//!    [`ErrorKind::LineNotFound`] rather than guessing a nearby line.
//!  - Pluggable backends: all debug data is read through the [`DebugInfoProvider`]
//!    trait. [`PdbProvider`] is the pure-Rust implementation.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use stackresolve_symbols::{resolve_stack_frame_symbols, PdbProvider};
//!
//! let report = resolve_stack_frame_symbols(&PdbProvider::new(), Path::new("x64.pdb"), 0x1095);
//! if report.is_success() {
//!     println!(
//!         "{}+0x{:X} [{} @ {}]",
//!         report.function_name, report.displacement, report.file_name, report.line_number
//!     );
//! } else {
//!     eprintln!("{}", report.diagnostic);
//! }
//! ```

mod demangle;
mod diagnostic;
mod error;
mod matcher;
mod pdb_file;
mod provider;
mod resolver;
mod session;
mod status;

use std::path::Path;

pub use stackresolve_identity::{
    debugid, uuid, CodeViewInfo, IdentityField, IdentityTriple, ModuleIdentityFields,
    ModuleParseError,
};

pub use crate::demangle::{undecorate, MangleKind};
pub use crate::diagnostic::{Diagnostic, MAX_DIAGNOSTIC_LEN};
pub use crate::error::{Error, ErrorKind, IdentityQueryFailure, LineStep, ProviderError};
pub use crate::matcher::IdentityMatcher;
pub use crate::pdb_file::{PdbHandle, PdbLine, PdbModule, PdbProvider, PdbStore};
pub use crate::provider::{DebugInfoProvider, FunctionSymbol};
pub use crate::resolver::{
    NameSource, ResolvedFrame, ResolvedSymbol, SymbolResolver, NO_FUNCTION_NAME,
};
pub use crate::session::{DebugInfoSession, HandleKind, ProviderContext};
pub use crate::status::StatusCode;

/// Resolves `rva` against the PDB file at `store_path`.
///
/// The provider is initialized for this call only; the PDB handle is closed and the
/// provider uninitialized before this returns.
pub fn resolve_address<P: DebugInfoProvider>(
    provider: &P,
    store_path: &Path,
    rva: u32,
) -> Result<ResolvedFrame, Error> {
    let context = ProviderContext::initialize(provider)?;
    let session = context.open_store(store_path)?;
    let frame = SymbolResolver::new(&session).resolve(rva)?;
    Ok(frame)
}

/// Returns whether the PDB file at `store_path` was built together with the module at
/// `module_path`. A mismatch is `Ok(false)`.
///
/// With [`PdbProvider`], the module's signature is read from the PDB its CodeView
/// record names, so that PDB must be at the recorded path or next to the module.
pub fn match_identity<P: DebugInfoProvider>(
    provider: &P,
    module_path: &Path,
    store_path: &Path,
) -> Result<bool, Error> {
    IdentityMatcher::new(provider).matches(module_path, store_path)
}

/// The flat result of [`resolve_stack_frame_symbols`].
///
/// On failure, every output field holds its empty value and `diagnostic` describes the
/// failing step. On success, `diagnostic` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StackFrameReport {
    /// `None` on success.
    pub error: Option<ErrorKind>,
    /// The raw provider status of the failing step, or [`StatusCode::OK`].
    pub status: StatusCode,
    pub file_name: String,
    pub line_number: u32,
    pub function_name: String,
    pub displacement: i64,
    pub diagnostic: Diagnostic,
}

impl StackFrameReport {
    fn failed(err: &Error) -> Self {
        Self {
            error: Some(err.kind()),
            status: err.status(),
            diagnostic: Diagnostic::from_error(err),
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl From<Result<ResolvedFrame, Error>> for StackFrameReport {
    fn from(result: Result<ResolvedFrame, Error>) -> Self {
        match result {
            Ok(frame) => Self {
                error: None,
                status: StatusCode::OK,
                file_name: frame.source_file_name,
                line_number: frame.line_number,
                function_name: frame.function_name,
                displacement: frame.displacement,
                diagnostic: Diagnostic::empty(),
            },
            Err(err) => Self::failed(&err),
        }
    }
}

/// The flat result of [`match_module_with_pdb_file`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchReport {
    /// `None` if both identities were read, whether or not they match.
    pub error: Option<ErrorKind>,
    pub status: StatusCode,
    pub is_matched: bool,
    pub diagnostic: Diagnostic,
}

impl MatchReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl From<Result<bool, Error>> for MatchReport {
    fn from(result: Result<bool, Error>) -> Self {
        match result {
            Ok(is_matched) => Self {
                error: None,
                status: StatusCode::OK,
                is_matched,
                diagnostic: Diagnostic::empty(),
            },
            Err(err) => Self {
                error: Some(err.kind()),
                status: err.status(),
                is_matched: false,
                diagnostic: Diagnostic::from_error(&err),
            },
        }
    }
}

/// Resolves `rva` against the PDB file at `store_path` and flattens the outcome into
/// a [`StackFrameReport`].
pub fn resolve_stack_frame_symbols<P: DebugInfoProvider>(
    provider: &P,
    store_path: &Path,
    rva: u32,
) -> StackFrameReport {
    let result = resolve_address(provider, store_path, rva);
    if let Err(err) = &result {
        log::debug!("Could not resolve RVA 0x{rva:X}: {err}");
    }
    result.into()
}

/// Checks the PDB file at `store_path` against the module at `module_path` and
/// flattens the outcome into a [`MatchReport`].
pub fn match_module_with_pdb_file<P: DebugInfoProvider>(
    provider: &P,
    module_path: &Path,
    store_path: &Path,
) -> MatchReport {
    let result = match_identity(provider, module_path, store_path);
    if let Err(err) = &result {
        log::debug!("Could not match {}: {err}", module_path.display());
    }
    result.into()
}
