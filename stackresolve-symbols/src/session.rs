use std::fmt;
use std::path::Path;

use stackresolve_identity::IdentityTriple;

use crate::error::{Error, ProviderError};
use crate::provider::DebugInfoProvider;

/// What a session's handle was opened from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// A debug symbol store (PDB file).
    Store,
    /// A compiled module (PE image).
    Module,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleKind::Store => f.write_str("PDB"),
            HandleKind::Module => f.write_str("module"),
        }
    }
}

/// The provider's global initialization, scoped to a single operation.
///
/// Dropping the context uninitializes the provider. Sessions borrow the context, so
/// they are always closed before this happens.
pub struct ProviderContext<'p, P: DebugInfoProvider> {
    provider: &'p P,
}

impl<'p, P: DebugInfoProvider> ProviderContext<'p, P> {
    pub fn initialize(provider: &'p P) -> Result<Self, Error> {
        provider.initialize().map_err(Error::Initialization)?;
        log::debug!("Initialized debug info provider");
        Ok(Self { provider })
    }

    pub fn open_store(&self, path: &Path) -> Result<DebugInfoSession<'_, P>, Error> {
        self.open(HandleKind::Store, path)
    }

    pub fn open_module(&self, path: &Path) -> Result<DebugInfoSession<'_, P>, Error> {
        self.open(HandleKind::Module, path)
    }

    fn open(&self, kind: HandleKind, path: &Path) -> Result<DebugInfoSession<'_, P>, Error> {
        let opened = match kind {
            HandleKind::Store => self.provider.open_store(path),
            HandleKind::Module => self.provider.open_module(path),
        };
        let handle = opened.map_err(|source| Error::Load {
            kind,
            path: path.to_owned(),
            source,
        })?;
        log::debug!("Opened {kind} {}", path.display());
        Ok(DebugInfoSession {
            provider: self.provider,
            kind,
            handle,
        })
    }
}

impl<P: DebugInfoProvider> Drop for ProviderContext<'_, P> {
    fn drop(&mut self) {
        self.provider.uninitialize();
        log::debug!("Uninitialized debug info provider");
    }
}

/// One open symbol store or module.
///
/// A session only exists once its handle is fully open, and the handle is closed when
/// the session is dropped. A failing close is logged and otherwise ignored, so it can
/// never replace the error that ended the operation.
pub struct DebugInfoSession<'c, P: DebugInfoProvider> {
    provider: &'c P,
    kind: HandleKind,
    handle: P::Handle,
}

impl<'c, P: DebugInfoProvider> DebugInfoSession<'c, P> {
    pub fn provider(&self) -> &'c P {
        self.provider
    }

    pub fn handle(&self) -> &P::Handle {
        &self.handle
    }

    /// Reads the identity triple from the handle's global scope.
    pub fn global_identity(&self) -> Result<IdentityTriple, Error> {
        self.provider
            .global_identity(&self.handle)
            .map_err(|failure| Error::IdentityQuery {
                kind: self.kind,
                field: failure.field,
                source: failure.source,
            })
    }
}

impl<P: DebugInfoProvider> Drop for DebugInfoSession<'_, P> {
    fn drop(&mut self) {
        match self.provider.close(&mut self.handle) {
            Ok(()) => log::debug!("Closed {}", self.kind),
            Err(ProviderError { status, message }) => {
                log::warn!("Failed to close {}: {message} (status: {status})", self.kind)
            }
        }
    }
}
