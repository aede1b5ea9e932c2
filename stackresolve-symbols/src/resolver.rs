use crate::error::{Error, LineStep};
use crate::provider::{DebugInfoProvider, FunctionSymbol};
use crate::session::DebugInfoSession;
use crate::status::StatusCode;

/// The name reported for a function that has neither an undecorated nor a raw name.
pub const NO_FUNCTION_NAME: &str = "(None)";

/// Where a [`ResolvedSymbol`]'s display name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    Undecorated,
    Raw,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSymbol {
    pub function_name: String,
    pub name_source: NameSource,
}

impl ResolvedSymbol {
    /// Picks the display name: the undecorated name, then the raw linkage name, then
    /// [`NO_FUNCTION_NAME`]. Empty names are skipped, so the result is never empty.
    pub fn from_function_symbol(symbol: FunctionSymbol) -> Self {
        let FunctionSymbol {
            undecorated_name,
            name,
            ..
        } = symbol;
        if let Some(undecorated_name) = undecorated_name.filter(|n| !n.is_empty()) {
            return Self {
                function_name: undecorated_name,
                name_source: NameSource::Undecorated,
            };
        }
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            return Self {
                function_name: name,
                name_source: NameSource::Raw,
            };
        }
        Self {
            function_name: NO_FUNCTION_NAME.to_string(),
            name_source: NameSource::None,
        }
    }
}

/// A fully resolved stack frame. All strings are owned copies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedFrame {
    pub function_name: String,
    pub source_file_name: String,
    pub line_number: u32,
    /// `rva - function_start`.
    pub displacement: i64,
}

/// Resolves RVAs against one open symbol store.
pub struct SymbolResolver<'s, 'c, P: DebugInfoProvider> {
    session: &'s DebugInfoSession<'c, P>,
}

impl<'s, 'c, P: DebugInfoProvider> SymbolResolver<'s, 'c, P> {
    pub fn new(session: &'s DebugInfoSession<'c, P>) -> Self {
        Self { session }
    }

    /// Resolves `rva` to function, source file, line and displacement.
    ///
    /// Exactly one line record must cover `rva`. Zero or several records are reported
    /// as [`Error::LineNotFound`]; there is no nearest-line fallback, so some addresses
    /// in inlined or optimized code do not resolve.
    pub fn resolve(&self, rva: u32) -> Result<ResolvedFrame, Error> {
        let provider = self.session.provider();
        let handle = self.session.handle();

        let function = match provider.find_symbol_by_address(handle, rva) {
            Ok(Some(function)) => function,
            Ok(None) => {
                return Err(Error::SymbolNotFound {
                    rva,
                    status: StatusCode::FALSE,
                })
            }
            Err(err) => {
                return Err(Error::SymbolNotFound {
                    rva,
                    status: err.status,
                })
            }
        };
        let displacement = i64::from(rva) - i64::from(function.address);
        let symbol = ResolvedSymbol::from_function_symbol(function);

        // Ask for two records so that an ambiguous mapping is visible.
        let lines = provider
            .find_lines_by_address(handle, rva, 2)
            .map_err(|err| line_error(rva, LineStep::Query, err.status))?;
        let line = match lines.as_slice() {
            [line] => line,
            [] => return Err(line_error(rva, LineStep::NoRecord, StatusCode::FALSE)),
            _ => return Err(line_error(rva, LineStep::AmbiguousRecord, StatusCode::FALSE)),
        };

        let line_number = provider
            .line_number(handle, line)
            .map_err(|err| line_error(rva, LineStep::LineNumber, err.status))?;
        let source_file_name = provider
            .source_file_name(handle, line)
            .map_err(|err| line_error(rva, LineStep::SourceFileName, err.status))?;

        log::trace!(
            "RVA 0x{rva:X} -> {}+0x{displacement:X} {source_file_name}:{line_number} ({:?} name)",
            symbol.function_name,
            symbol.name_source
        );

        Ok(ResolvedFrame {
            function_name: symbol.function_name,
            source_file_name,
            line_number,
            displacement,
        })
    }
}

fn line_error(rva: u32, step: LineStep, status: StatusCode) -> Error {
    Error::LineNotFound { rva, step, status }
}
