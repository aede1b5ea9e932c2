use std::cell::RefCell;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use pdb::{FallibleIterator, FileIndex, SymbolData, PDB};
use stackresolve_identity::uuid::Uuid;
use stackresolve_identity::{
    CodeViewInfo, IdentityField, IdentityTriple, ModuleIdentityFields, ModuleParseError,
};

use crate::demangle::undecorate;
use crate::error::{IdentityQueryFailure, ProviderError};
use crate::provider::{DebugInfoProvider, FunctionSymbol};
use crate::status::StatusCode;

/// A [`DebugInfoProvider`] that reads PDB files with the `pdb` crate and PE modules with
/// `object`.
///
/// It has no global state, so `initialize` and `uninitialize` do nothing. Store handles
/// keep the PDB file open until they are closed.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdbProvider;

impl PdbProvider {
    pub fn new() -> Self {
        Self
    }
}

pub enum PdbHandle {
    Store(PdbStore),
    Module(PdbModule),
}

/// An opened PE module. The path is kept to find the PDB its CodeView record names.
pub struct PdbModule {
    path: PathBuf,
    fields: ModuleIdentityFields,
}

pub struct PdbStore {
    pdb: RefCell<PDB<'static, File>>,
}

/// A line record. `module_index` is the index of the owning module in the DBI stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdbLine {
    module_index: usize,
    file_index: FileIndex,
    line: u32,
}

impl PdbHandle {
    fn store(&self) -> Result<&PdbStore, ProviderError> {
        match self {
            PdbHandle::Store(store) => Ok(store),
            PdbHandle::Module(_) => Err(ProviderError::new(
                StatusCode::INVALID_ARG,
                "Handle refers to a module, not a PDB file",
            )),
        }
    }
}

fn io_error(err: io::Error) -> ProviderError {
    let status = match err.kind() {
        io::ErrorKind::NotFound => StatusCode::PDB_NOT_FOUND,
        io::ErrorKind::UnexpectedEof => StatusCode::PDB_FORMAT,
        _ => StatusCode::PDB_FILE_SYSTEM,
    };
    ProviderError::new(status, err.to_string())
}

fn pdb_error(err: pdb::Error) -> ProviderError {
    match err {
        pdb::Error::IoError(err) => io_error(err),
        other => ProviderError::new(StatusCode::PDB_FORMAT, other.to_string()),
    }
}

fn module_parse_error(err: ModuleParseError) -> ProviderError {
    ProviderError::new(StatusCode::PDB_FORMAT, err.to_string())
}

impl PdbStore {
    fn open(path: &Path) -> Result<Self, ProviderError> {
        let file = File::open(path).map_err(io_error)?;
        let pdb = PDB::open(file).map_err(pdb_error)?;
        Ok(Self {
            pdb: RefCell::new(pdb),
        })
    }

    fn identity(&self) -> Result<IdentityTriple, IdentityQueryFailure> {
        let mut pdb = self.pdb.borrow_mut();
        let info = pdb
            .pdb_information()
            .map_err(|e| IdentityQueryFailure::new(IdentityField::Guid, pdb_error(e)))?;
        // The DBI stream's age is the one the linker updates on incremental links.
        let age = pdb
            .debug_information()
            .ok()
            .and_then(|dbi| dbi.age())
            .unwrap_or(info.age);
        Ok(IdentityTriple::new(
            Uuid::from_bytes(*info.guid.as_bytes()),
            info.signature,
            age,
        ))
    }

    fn find_function(&self, rva: u32) -> Result<Option<FunctionSymbol>, pdb::Error> {
        let mut pdb = self.pdb.borrow_mut();
        let address_map = pdb.address_map()?;
        let dbi = pdb.debug_information()?;
        let mut modules = dbi.modules()?;
        while let Some(module) = modules.next()? {
            let Some(info) = pdb.module_info(&module)? else {
                continue;
            };
            let mut symbols = info.symbols()?;
            while let Some(symbol) = symbols.next()? {
                let Ok(SymbolData::Procedure(proc)) = symbol.parse() else {
                    continue;
                };
                let Some(start) = proc.offset.to_rva(&address_map) else {
                    continue;
                };
                let start = start.0;
                if rva < start || rva - start >= proc.len {
                    continue;
                }
                let procedure_name = proc.name.to_string().into_owned();
                let linkage_name = public_name_at(&mut pdb, &address_map, start)?;
                let undecorated_name = linkage_name
                    .as_deref()
                    .and_then(undecorate)
                    .map(|(_, name)| name);
                return Ok(Some(FunctionSymbol {
                    address: start,
                    undecorated_name,
                    name: Some(linkage_name.unwrap_or(procedure_name)),
                }));
            }
        }
        Ok(None)
    }

    fn find_lines(&self, rva: u32, max_count: usize) -> Result<Vec<PdbLine>, pdb::Error> {
        let mut lines = Vec::new();
        if max_count == 0 {
            return Ok(lines);
        }
        let mut pdb = self.pdb.borrow_mut();
        let address_map = pdb.address_map()?;
        let dbi = pdb.debug_information()?;
        let mut modules = dbi.modules()?.enumerate();
        while let Some((module_index, module)) = modules.next()? {
            let Some(info) = pdb.module_info(&module)? else {
                continue;
            };
            let program = info.line_program()?;
            let mut line_iter = program.lines();
            while let Some(line_info) = line_iter.next()? {
                let Some(start) = line_info.offset.to_rva(&address_map) else {
                    continue;
                };
                let start = start.0;
                let len = line_info.length.unwrap_or(1).max(1);
                if rva < start || rva - start >= len {
                    continue;
                }
                lines.push(PdbLine {
                    module_index,
                    file_index: line_info.file_index,
                    line: line_info.line_start,
                });
                if lines.len() >= max_count {
                    return Ok(lines);
                }
            }
        }
        Ok(lines)
    }

    fn file_name(&self, line: &PdbLine) -> Result<String, ProviderError> {
        let mut pdb = self.pdb.borrow_mut();
        let string_table = pdb.string_table().map_err(pdb_error)?;
        let dbi = pdb.debug_information().map_err(pdb_error)?;
        let module = dbi
            .modules()
            .and_then(|mut modules| modules.nth(line.module_index))
            .map_err(pdb_error)?
            .ok_or_else(unknown_module)?;
        let info = pdb
            .module_info(&module)
            .map_err(pdb_error)?
            .ok_or_else(unknown_module)?;
        let program = info.line_program().map_err(pdb_error)?;
        let file_info = program.get_file_info(line.file_index).map_err(pdb_error)?;
        let name = file_info
            .name
            .to_string_lossy(&string_table)
            .map_err(pdb_error)?;
        Ok(name.into_owned())
    }
}

impl PdbModule {
    fn identity(&self) -> Result<IdentityTriple, IdentityQueryFailure> {
        let code_view = self.fields.code_view.as_ref().ok_or_else(|| {
            IdentityQueryFailure::new(
                IdentityField::Guid,
                ProviderError::new(
                    StatusCode::PDB_NOT_FOUND,
                    "Module has no CodeView debug directory entry",
                ),
            )
        })?;
        let signature = referenced_pdb_signature(&self.path, code_view)
            .map_err(|e| IdentityQueryFailure::new(IdentityField::Signature, e))?;
        Ok(code_view.identity(signature))
    }
}

/// Reads the info-stream signature of the PDB that `code_view` refers to. The
/// recorded path is tried first, then the module's directory. A candidate only counts
/// if its GUID and age are the ones in the record.
fn referenced_pdb_signature(
    module_path: &Path,
    code_view: &CodeViewInfo,
) -> Result<u32, ProviderError> {
    for candidate in code_view.pdb_candidates(module_path) {
        let identity = PdbStore::open(&candidate)
            .and_then(|store| store.identity().map_err(|failure| failure.source));
        match identity {
            Ok(pdb) if code_view.refers_to(&pdb) => return Ok(pdb.signature),
            Ok(pdb) => log::debug!(
                "{} has identity {pdb}, which the module does not refer to",
                candidate.display()
            ),
            Err(err) => log::debug!("Could not read {}: {err}", candidate.display()),
        }
    }
    Err(ProviderError::new(
        StatusCode::PDB_NOT_FOUND,
        "The PDB named in the module's CodeView record was not found",
    ))
}

fn unknown_module() -> ProviderError {
    ProviderError::new(
        StatusCode::INVALID_ARG,
        "Line record refers to a module that is not in the PDB",
    )
}

/// Looks up the linkage name of the public function symbol that starts at `rva`.
fn public_name_at(
    pdb: &mut PDB<'static, File>,
    address_map: &pdb::AddressMap<'_>,
    rva: u32,
) -> Result<Option<String>, pdb::Error> {
    let globals = pdb.global_symbols()?;
    let mut symbols = globals.iter();
    while let Some(symbol) = symbols.next()? {
        let Ok(SymbolData::Public(public)) = symbol.parse() else {
            continue;
        };
        if !public.function {
            continue;
        }
        if public.offset.to_rva(address_map).map(|r| r.0) == Some(rva) {
            return Ok(Some(public.name.to_string().into_owned()));
        }
    }
    Ok(None)
}

impl DebugInfoProvider for PdbProvider {
    type Handle = PdbHandle;
    type Line = PdbLine;

    fn initialize(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn uninitialize(&self) {}

    fn open_store(&self, path: &Path) -> Result<PdbHandle, ProviderError> {
        Ok(PdbHandle::Store(PdbStore::open(path)?))
    }

    fn open_module(&self, path: &Path) -> Result<PdbHandle, ProviderError> {
        let data = std::fs::read(path).map_err(io_error)?;
        let fields = ModuleIdentityFields::parse(&data).map_err(module_parse_error)?;
        Ok(PdbHandle::Module(PdbModule {
            path: path.to_path_buf(),
            fields,
        }))
    }

    fn global_identity(&self, handle: &PdbHandle) -> Result<IdentityTriple, IdentityQueryFailure> {
        match handle {
            PdbHandle::Store(store) => store.identity(),
            PdbHandle::Module(module) => module.identity(),
        }
    }

    fn find_symbol_by_address(
        &self,
        handle: &PdbHandle,
        rva: u32,
    ) -> Result<Option<FunctionSymbol>, ProviderError> {
        handle.store()?.find_function(rva).map_err(pdb_error)
    }

    fn find_lines_by_address(
        &self,
        handle: &PdbHandle,
        rva: u32,
        max_count: usize,
    ) -> Result<Vec<PdbLine>, ProviderError> {
        handle.store()?.find_lines(rva, max_count).map_err(pdb_error)
    }

    fn line_number(&self, handle: &PdbHandle, line: &PdbLine) -> Result<u32, ProviderError> {
        handle.store()?;
        Ok(line.line)
    }

    fn source_file_name(
        &self,
        handle: &PdbHandle,
        line: &PdbLine,
    ) -> Result<String, ProviderError> {
        handle.store()?.file_name(line)
    }

    fn close(&self, _handle: &mut PdbHandle) -> Result<(), ProviderError> {
        Ok(())
    }
}
