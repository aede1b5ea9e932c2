use std::path::Path;

use stackresolve_identity::IdentityTriple;

use crate::error::Error;
use crate::provider::DebugInfoProvider;
use crate::session::ProviderContext;

/// Checks that a symbol store was produced by the same build as a module.
///
/// Resolving addresses against a PDB from a different build gives plausible but wrong
/// function and line output, so callers should match first.
pub struct IdentityMatcher<'p, P: DebugInfoProvider> {
    provider: &'p P,
}

impl<'p, P: DebugInfoProvider> IdentityMatcher<'p, P> {
    pub fn new(provider: &'p P) -> Self {
        Self { provider }
    }

    pub fn module_identity(&self, module_path: &Path) -> Result<IdentityTriple, Error> {
        let context = ProviderContext::initialize(self.provider)?;
        let session = context.open_module(module_path)?;
        let identity = session.global_identity()?;
        Ok(identity)
    }

    pub fn store_identity(&self, store_path: &Path) -> Result<IdentityTriple, Error> {
        let context = ProviderContext::initialize(self.provider)?;
        let session = context.open_store(store_path)?;
        let identity = session.global_identity()?;
        Ok(identity)
    }

    /// Returns whether GUID, signature and age all agree. A mismatch is `Ok(false)`;
    /// only a failure to read either triple is an error.
    ///
    /// The module is fully closed and the provider uninitialized before the store is
    /// opened, so the two never share provider state.
    pub fn matches(&self, module_path: &Path, store_path: &Path) -> Result<bool, Error> {
        let module_identity = self.module_identity(module_path)?;
        let store_identity = self.store_identity(store_path)?;
        let is_matched = module_identity.matches(&store_identity);
        if is_matched {
            log::debug!("{} matches {module_identity}", store_path.display());
        } else {
            log::debug!(
                "{} does not match: module has {module_identity}, PDB has {store_identity}",
                store_path.display()
            );
        }
        Ok(is_matched)
    }
}
