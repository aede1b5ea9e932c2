use std::path::Path;

use stackresolve_identity::IdentityTriple;

use crate::error::{IdentityQueryFailure, ProviderError};

/// The function symbol whose address range contains a queried address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSymbol {
    /// Start RVA of the function.
    pub address: u32,
    /// Demangled name, if the provider has one.
    pub undecorated_name: Option<String>,
    /// Linkage name as stored in the symbol store.
    pub name: Option<String>,
}

/// Access to a debug info backend, e.g. a PDB reader.
///
/// This is the only way the resolver and the identity matcher talk to debug data;
/// they do no format parsing of their own. Implementations are used through `&self`
/// for the duration of one call. If an implementation keeps process-global state
/// behind [`initialize`](Self::initialize), concurrent calls must be serialized by
/// the caller; nothing in this crate locks.
pub trait DebugInfoProvider {
    /// An open symbol store or module.
    type Handle;

    /// A line record returned by [`find_lines_by_address`](Self::find_lines_by_address).
    type Line;

    /// Sets up provider-global state. Called once per operation, before any handle
    /// is opened.
    fn initialize(&self) -> Result<(), ProviderError>;

    /// Tears down what [`initialize`](Self::initialize) set up. Only called after a
    /// successful `initialize`, and after every handle of the operation is closed.
    fn uninitialize(&self);

    fn open_store(&self, path: &Path) -> Result<Self::Handle, ProviderError>;

    fn open_module(&self, path: &Path) -> Result<Self::Handle, ProviderError>;

    /// Reads the identity triple from the handle's global scope.
    fn global_identity(&self, handle: &Self::Handle)
        -> Result<IdentityTriple, IdentityQueryFailure>;

    /// Finds the function whose address range contains `rva`. `Ok(None)` means there is
    /// no such function.
    fn find_symbol_by_address(
        &self,
        handle: &Self::Handle,
        rva: u32,
    ) -> Result<Option<FunctionSymbol>, ProviderError>;

    /// Returns at most `max_count` line records whose range contains `rva`.
    fn find_lines_by_address(
        &self,
        handle: &Self::Handle,
        rva: u32,
        max_count: usize,
    ) -> Result<Vec<Self::Line>, ProviderError>;

    fn line_number(&self, handle: &Self::Handle, line: &Self::Line) -> Result<u32, ProviderError>;

    /// Resolves the name of the source file that owns `line`.
    fn source_file_name(
        &self,
        handle: &Self::Handle,
        line: &Self::Line,
    ) -> Result<String, ProviderError>;

    /// Releases the handle's resources. The handle is dropped right after this call,
    /// whatever it returns.
    fn close(&self, handle: &mut Self::Handle) -> Result<(), ProviderError>;
}
