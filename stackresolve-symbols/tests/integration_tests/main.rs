use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use stackresolve_symbols::uuid::Uuid;
use stackresolve_symbols::{
    match_identity, match_module_with_pdb_file, resolve_address, resolve_stack_frame_symbols,
    DebugInfoProvider, ErrorKind, FunctionSymbol, IdentityField, IdentityQueryFailure,
    IdentityTriple, PdbProvider, ProviderError, StatusCode, NO_FUNCTION_NAME,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Initialize,
    Uninitialize,
    OpenStore(PathBuf),
    OpenModule(PathBuf),
    Close(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Initialize,
    OpenStore,
    OpenModule,
    StoreIdentity(IdentityField),
    ModuleIdentity(IdentityField),
    FindSymbol,
    FindLines,
    LineNumber,
    SourceFileName,
    Close,
}

#[derive(Debug, Clone)]
struct FakeFunction {
    start: u32,
    len: u32,
    undecorated_name: Option<&'static str>,
    name: Option<&'static str>,
}

#[derive(Debug, Clone)]
struct FakeLine {
    start: u32,
    len: u32,
    line: u32,
    file: &'static str,
}

#[derive(Debug, Clone)]
struct FakeFile {
    identity: IdentityTriple,
    functions: Vec<FakeFunction>,
    lines: Vec<FakeLine>,
}

#[derive(Debug)]
struct FakeHandle {
    path: PathBuf,
    is_store: bool,
}

/// An in-memory provider that records every lifecycle call and can fail at any step.
#[derive(Default)]
struct FakeProvider {
    files: HashMap<PathBuf, FakeFile>,
    failure: Cell<Option<(Step, StatusCode)>>,
    events: RefCell<Vec<Event>>,
}

impl FakeProvider {
    fn with_file(mut self, path: &str, file: FakeFile) -> Self {
        self.files.insert(PathBuf::from(path), file);
        self
    }

    fn fail_at(&self, step: Step, status: StatusCode) {
        self.failure.set(Some((step, status)));
    }

    fn check(&self, step: Step) -> Result<(), ProviderError> {
        match self.failure.get() {
            Some((failing_step, status)) if failing_step == step => {
                Err(ProviderError::new(status, format!("injected failure at {step:?}")))
            }
            _ => Ok(()),
        }
    }

    fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }

    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    fn file(&self, handle: &FakeHandle) -> &FakeFile {
        &self.files[&handle.path]
    }

    fn open(&self, path: &Path, step: Step) -> Result<FakeHandle, ProviderError> {
        self.check(step)?;
        if !self.files.contains_key(path) {
            return Err(ProviderError::new(StatusCode::PDB_NOT_FOUND, "no such file"));
        }
        let is_store = step == Step::OpenStore;
        self.record(if is_store {
            Event::OpenStore(path.to_owned())
        } else {
            Event::OpenModule(path.to_owned())
        });
        Ok(FakeHandle {
            path: path.to_owned(),
            is_store,
        })
    }
}

impl DebugInfoProvider for FakeProvider {
    type Handle = FakeHandle;
    type Line = FakeLine;

    fn initialize(&self) -> Result<(), ProviderError> {
        self.check(Step::Initialize)?;
        self.record(Event::Initialize);
        Ok(())
    }

    fn uninitialize(&self) {
        self.record(Event::Uninitialize);
    }

    fn open_store(&self, path: &Path) -> Result<FakeHandle, ProviderError> {
        self.open(path, Step::OpenStore)
    }

    fn open_module(&self, path: &Path) -> Result<FakeHandle, ProviderError> {
        self.open(path, Step::OpenModule)
    }

    fn global_identity(&self, handle: &FakeHandle) -> Result<IdentityTriple, IdentityQueryFailure> {
        for field in [IdentityField::Guid, IdentityField::Signature, IdentityField::Age] {
            let step = if handle.is_store {
                Step::StoreIdentity(field)
            } else {
                Step::ModuleIdentity(field)
            };
            self.check(step)
                .map_err(|err| IdentityQueryFailure::new(field, err))?;
        }
        Ok(self.file(handle).identity)
    }

    fn find_symbol_by_address(
        &self,
        handle: &FakeHandle,
        rva: u32,
    ) -> Result<Option<FunctionSymbol>, ProviderError> {
        self.check(Step::FindSymbol)?;
        Ok(self
            .file(handle)
            .functions
            .iter()
            .find(|f| rva >= f.start && rva - f.start < f.len)
            .map(|f| FunctionSymbol {
                address: f.start,
                undecorated_name: f.undecorated_name.map(ToOwned::to_owned),
                name: f.name.map(ToOwned::to_owned),
            }))
    }

    fn find_lines_by_address(
        &self,
        handle: &FakeHandle,
        rva: u32,
        max_count: usize,
    ) -> Result<Vec<FakeLine>, ProviderError> {
        self.check(Step::FindLines)?;
        Ok(self
            .file(handle)
            .lines
            .iter()
            .filter(|l| rva >= l.start && rva - l.start < l.len)
            .take(max_count)
            .cloned()
            .collect())
    }

    fn line_number(&self, _handle: &FakeHandle, line: &FakeLine) -> Result<u32, ProviderError> {
        self.check(Step::LineNumber)?;
        Ok(line.line)
    }

    fn source_file_name(
        &self,
        _handle: &FakeHandle,
        line: &FakeLine,
    ) -> Result<String, ProviderError> {
        self.check(Step::SourceFileName)?;
        Ok(line.file.to_string())
    }

    fn close(&self, handle: &mut FakeHandle) -> Result<(), ProviderError> {
        self.record(Event::Close(handle.path.clone()));
        self.check(Step::Close)
    }
}

const STORE: &str = "symbols/x64.pdb";
const MODULE: &str = "modules/x64.efi";

fn identity() -> IdentityTriple {
    IdentityTriple::new(
        Uuid::from_u128(0x6a7d_1f3e_0b2c_4d5e_8f90_a1b2_c3d4_e5f6),
        0x6512_0a3b,
        3,
    )
}

fn store_file() -> FakeFile {
    FakeFile {
        identity: identity(),
        functions: vec![
            FakeFunction {
                start: 0x1070,
                len: 0x40,
                undecorated_name: Some("func1"),
                name: Some("?func1@@YAXXZ"),
            },
            FakeFunction {
                start: 0x10b0,
                len: 0x20,
                undecorated_name: Some(""),
                name: Some("func2"),
            },
            FakeFunction {
                start: 0x10d0,
                len: 0x20,
                undecorated_name: None,
                name: None,
            },
            FakeFunction {
                start: 0x1100,
                len: 0x40,
                undecorated_name: Some("func4"),
                name: Some("func4"),
            },
        ],
        lines: vec![
            FakeLine {
                start: 0x1070,
                len: 0x20,
                line: 41,
                file: "C:\\src\\main.c",
            },
            FakeLine {
                start: 0x1090,
                len: 0x20,
                line: 42,
                file: "C:\\src\\main.c",
            },
            FakeLine {
                start: 0x10b0,
                len: 0x20,
                line: 50,
                file: "C:\\src\\other.c",
            },
            FakeLine {
                start: 0x10d0,
                len: 0x20,
                line: 60,
                file: "C:\\src\\other.c",
            },
            // Two records cover 0x1120..0x1130.
            FakeLine {
                start: 0x1110,
                len: 0x20,
                line: 70,
                file: "C:\\src\\inline.h",
            },
            FakeLine {
                start: 0x1120,
                len: 0x20,
                line: 80,
                file: "C:\\src\\main.c",
            },
        ],
    }
}

fn module_file(identity: IdentityTriple) -> FakeFile {
    FakeFile {
        identity,
        functions: Vec::new(),
        lines: Vec::new(),
    }
}

fn provider() -> FakeProvider {
    FakeProvider::default()
        .with_file(STORE, store_file())
        .with_file(MODULE, module_file(identity()))
}

/// Every successful initialize is followed by exactly one uninitialize, and every
/// opened handle is closed before that.
fn assert_balanced(events: &[Event]) {
    let mut initialized = false;
    let mut open = Vec::new();
    for event in events {
        match event {
            Event::Initialize => {
                assert!(!initialized, "nested initialize in {events:?}");
                initialized = true;
            }
            Event::Uninitialize => {
                assert!(initialized, "uninitialize without initialize in {events:?}");
                assert!(open.is_empty(), "uninitialize with open handles in {events:?}");
                initialized = false;
            }
            Event::OpenStore(path) | Event::OpenModule(path) => {
                assert!(initialized, "open before initialize in {events:?}");
                open.push(path.clone());
            }
            Event::Close(path) => {
                assert_eq!(open.pop().as_ref(), Some(path), "unexpected close in {events:?}");
            }
        }
    }
    assert!(!initialized, "provider left initialized: {events:?}");
    assert!(open.is_empty(), "handles left open: {events:?}");
}

#[test]
fn resolves_function_line_and_displacement() {
    let provider = provider();
    let report = resolve_stack_frame_symbols(&provider, Path::new(STORE), 0x1095);
    assert!(report.is_success());
    assert_eq!(report.status, StatusCode::OK);
    assert_eq!(report.function_name, "func1");
    assert_eq!(report.file_name, "C:\\src\\main.c");
    assert_eq!(report.line_number, 42);
    assert_eq!(report.displacement, 0x25);
    assert!(report.diagnostic.is_empty());
    assert_eq!(
        provider.events(),
        vec![
            Event::Initialize,
            Event::OpenStore(PathBuf::from(STORE)),
            Event::Close(PathBuf::from(STORE)),
            Event::Uninitialize,
        ]
    );
}

#[test]
fn function_start_has_zero_displacement() {
    let frame = resolve_address(&provider(), Path::new(STORE), 0x1070).unwrap();
    assert_eq!(frame.displacement, 0);
    assert_eq!(frame.line_number, 41);
}

#[test]
fn function_name_falls_back_to_raw_then_sentinel() {
    let provider = provider();
    let raw = resolve_address(&provider, Path::new(STORE), 0x10b4).unwrap();
    assert_eq!(raw.function_name, "func2");
    assert_eq!(raw.displacement, 4);

    let unnamed = resolve_address(&provider, Path::new(STORE), 0x10d8).unwrap();
    assert_eq!(unnamed.function_name, NO_FUNCTION_NAME);
    assert_eq!(unnamed.line_number, 60);
}

#[test]
fn resolving_is_repeatable() {
    let provider = provider();
    let first = resolve_stack_frame_symbols(&provider, Path::new(STORE), 0x1095);
    let second = resolve_stack_frame_symbols(&provider, Path::new(STORE), 0x1095);
    assert_eq!(first, second);
    assert_balanced(&provider.events());
}

#[test]
fn address_outside_any_function() {
    let provider = provider();
    let report = resolve_stack_frame_symbols(&provider, Path::new(STORE), 0x2000);
    assert_eq!(report.error, Some(ErrorKind::SymbolNotFound));
    assert_eq!(report.status, StatusCode::FALSE);
    assert_eq!(
        report.diagnostic.as_str(),
        "Failed to find symbol by RVA (status: 0x1)"
    );
    assert_eq!(report.function_name, "");
    assert_eq!(report.file_name, "");
    assert_eq!(report.line_number, 0);
    assert_eq!(report.displacement, 0);
    assert_balanced(&provider.events());
}

#[test]
fn address_without_line_record() {
    let provider = provider();
    // func4 covers 0x1100..0x1140, but the first line record starts at 0x1110.
    let report = resolve_stack_frame_symbols(&provider, Path::new(STORE), 0x1104);
    assert_eq!(report.error, Some(ErrorKind::LineNotFound));
    assert_eq!(report.status, StatusCode::FALSE);
    assert_eq!(
        report.diagnostic.as_str(),
        "Failed to enumerate line number (status: 0x1)"
    );
    assert_eq!(report.function_name, "");
    assert_balanced(&provider.events());
}

#[test]
fn address_with_ambiguous_line_records() {
    let provider = provider();
    let report = resolve_stack_frame_symbols(&provider, Path::new(STORE), 0x1125);
    assert_eq!(report.error, Some(ErrorKind::LineNotFound));
    assert_eq!(
        report.diagnostic.as_str(),
        "Found more than one line record by RVA (status: 0x1)"
    );
    assert_eq!(report.line_number, 0);

    // Only one record covers 0x1115.
    let frame = resolve_address(&provider, Path::new(STORE), 0x1115).unwrap();
    assert_eq!(frame.line_number, 70);
    assert_eq!(frame.source_file_name, "C:\\src\\inline.h");
}

#[test]
fn missing_store_fails_to_load() {
    let provider = provider();
    let report = resolve_stack_frame_symbols(&provider, Path::new("missing.pdb"), 0x1095);
    assert_eq!(report.error, Some(ErrorKind::Load));
    assert_eq!(report.status, StatusCode::PDB_NOT_FOUND);
    assert_eq!(
        report.diagnostic.as_str(),
        "Failed to load PDB file (status: 0x806D0004)"
    );
    assert_eq!(provider.events(), vec![Event::Initialize, Event::Uninitialize]);
}

#[test]
fn initialization_failure_skips_everything_else() {
    let provider = provider();
    provider.fail_at(Step::Initialize, StatusCode::FAIL);
    let report = resolve_stack_frame_symbols(&provider, Path::new(STORE), 0x1095);
    assert_eq!(report.error, Some(ErrorKind::Initialization));
    assert_eq!(
        report.diagnostic.as_str(),
        "Failed to initialize debug info provider (status: 0x80004005)"
    );
    assert!(provider.events().is_empty());
}

#[test]
fn every_resolve_failure_is_reported_and_cleaned_up() {
    let cases = [
        (Step::Initialize, ErrorKind::Initialization, "Failed to initialize debug info provider"),
        (Step::OpenStore, ErrorKind::Load, "Failed to load PDB file"),
        (Step::FindSymbol, ErrorKind::SymbolNotFound, "Failed to find symbol by RVA"),
        (Step::FindLines, ErrorKind::LineNotFound, "Failed to find line info by RVA"),
        (Step::LineNumber, ErrorKind::LineNotFound, "Failed to get line number"),
        (Step::SourceFileName, ErrorKind::LineNotFound, "Failed to get source file name"),
    ];
    let status = StatusCode(0x8000_FFFF);
    for (step, kind, operation) in cases {
        let provider = provider();
        provider.fail_at(step, status);
        let report = resolve_stack_frame_symbols(&provider, Path::new(STORE), 0x1095);
        assert_eq!(report.error, Some(kind), "{step:?}");
        assert_eq!(report.status, status, "{step:?}");
        assert_eq!(
            report.diagnostic.as_str(),
            format!("{operation} (status: 0x8000FFFF)"),
            "{step:?}"
        );
        assert_eq!(report.function_name, "", "{step:?}");
        assert_eq!(report.file_name, "", "{step:?}");
        assert_eq!(report.line_number, 0, "{step:?}");
        assert_eq!(report.displacement, 0, "{step:?}");
        assert_balanced(&provider.events());
    }
}

#[test]
fn close_failure_does_not_change_the_result() {
    let provider = provider();
    provider.fail_at(Step::Close, StatusCode::FAIL);
    let report = resolve_stack_frame_symbols(&provider, Path::new(STORE), 0x1095);
    assert!(report.is_success());
    assert_eq!(report.function_name, "func1");
    assert!(report.diagnostic.is_empty());
    assert_eq!(provider.events().last(), Some(&Event::Uninitialize));
}

#[test]
fn close_failure_does_not_replace_the_first_error() {
    let provider = provider();
    provider.fail_at(Step::Close, StatusCode::FAIL);
    let report = resolve_stack_frame_symbols(&provider, Path::new(STORE), 0x2000);
    assert_eq!(report.error, Some(ErrorKind::SymbolNotFound));
    assert_eq!(report.status, StatusCode::FALSE);
    assert_eq!(
        report.diagnostic.as_str(),
        "Failed to find symbol by RVA (status: 0x1)"
    );
    assert_balanced(&provider.events());
}

#[test]
fn matching_identities() {
    let provider = provider();
    let report = match_module_with_pdb_file(&provider, Path::new(MODULE), Path::new(STORE));
    assert!(report.is_success());
    assert!(report.is_matched);
    assert_eq!(report.status, StatusCode::OK);
    assert!(report.diagnostic.is_empty());
}

#[test]
fn module_is_released_before_store_is_opened() {
    let provider = provider();
    assert!(match_identity(&provider, Path::new(MODULE), Path::new(STORE)).unwrap());
    assert_eq!(
        provider.events(),
        vec![
            Event::Initialize,
            Event::OpenModule(PathBuf::from(MODULE)),
            Event::Close(PathBuf::from(MODULE)),
            Event::Uninitialize,
            Event::Initialize,
            Event::OpenStore(PathBuf::from(STORE)),
            Event::Close(PathBuf::from(STORE)),
            Event::Uninitialize,
        ]
    );
}

#[test]
fn a_single_differing_field_is_a_mismatch() {
    let base = identity();
    let flipped = [
        IdentityTriple::new(Uuid::from_u128(base.guid.as_u128() ^ 1), base.signature, base.age),
        IdentityTriple::new(base.guid, base.signature ^ 1, base.age),
        IdentityTriple::new(base.guid, base.signature, base.age + 1),
    ];
    for module_identity in flipped {
        let provider = FakeProvider::default()
            .with_file(STORE, store_file())
            .with_file(MODULE, module_file(module_identity));
        let report = match_module_with_pdb_file(&provider, Path::new(MODULE), Path::new(STORE));
        assert!(report.is_success(), "{module_identity}");
        assert!(!report.is_matched, "{module_identity}");
        assert!(report.diagnostic.is_empty());
        assert_balanced(&provider.events());
    }
}

#[test]
fn matching_is_repeatable() {
    let provider = provider();
    let first = match_module_with_pdb_file(&provider, Path::new(MODULE), Path::new(STORE));
    provider.clear_events();
    let second = match_module_with_pdb_file(&provider, Path::new(MODULE), Path::new(STORE));
    assert_eq!(first, second);
    assert_balanced(&provider.events());
}

#[test]
fn every_match_failure_is_reported_and_cleaned_up() {
    let cases = [
        (Step::Initialize, ErrorKind::Initialization, "Failed to initialize debug info provider"),
        (Step::OpenModule, ErrorKind::Load, "Failed to load module file"),
        (
            Step::ModuleIdentity(IdentityField::Guid),
            ErrorKind::IdentityQuery,
            "Failed to get GUID of the module",
        ),
        (
            Step::ModuleIdentity(IdentityField::Signature),
            ErrorKind::IdentityQuery,
            "Failed to get signature of the module",
        ),
        (
            Step::ModuleIdentity(IdentityField::Age),
            ErrorKind::IdentityQuery,
            "Failed to get age of the module",
        ),
        (Step::OpenStore, ErrorKind::Load, "Failed to load PDB file"),
        (
            Step::StoreIdentity(IdentityField::Guid),
            ErrorKind::IdentityQuery,
            "Failed to get GUID of the PDB",
        ),
        (
            Step::StoreIdentity(IdentityField::Age),
            ErrorKind::IdentityQuery,
            "Failed to get age of the PDB",
        ),
    ];
    for (step, kind, operation) in cases {
        let provider = provider();
        provider.fail_at(step, StatusCode::FAIL);
        let report = match_module_with_pdb_file(&provider, Path::new(MODULE), Path::new(STORE));
        assert_eq!(report.error, Some(kind), "{step:?}");
        assert_eq!(report.status, StatusCode::FAIL, "{step:?}");
        assert!(!report.is_matched, "{step:?}");
        assert_eq!(
            report.diagnostic.as_str(),
            format!("{operation} (status: 0x80004005)"),
            "{step:?}"
        );
        assert_balanced(&provider.events());
    }
}

#[test]
fn module_failure_never_opens_the_store() {
    let provider = provider();
    provider.fail_at(Step::ModuleIdentity(IdentityField::Guid), StatusCode::FAIL);
    let _ = match_module_with_pdb_file(&provider, Path::new(MODULE), Path::new(STORE));
    assert!(!provider
        .events()
        .iter()
        .any(|event| matches!(event, Event::OpenStore(_))));
}

#[test]
fn pdb_provider_reports_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.pdb");
    let report = resolve_stack_frame_symbols(&PdbProvider::new(), &missing, 0x1000);
    assert_eq!(report.error, Some(ErrorKind::Load));
    assert_eq!(report.status, StatusCode::PDB_NOT_FOUND);
    assert_eq!(
        report.diagnostic.as_str(),
        "Failed to load PDB file (status: 0x806D0004)"
    );
}

#[test]
fn pdb_provider_rejects_files_that_are_not_pdbs() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0xab; 8192]).unwrap();
    file.flush().unwrap();
    let report = resolve_stack_frame_symbols(&PdbProvider::new(), file.path(), 0x1000);
    assert_eq!(report.error, Some(ErrorKind::Load));
    assert_eq!(report.status, StatusCode::PDB_FORMAT);
    assert!(report.function_name.is_empty());
}

#[test]
fn pdb_provider_rejects_modules_that_are_not_pe_images() {
    let mut module = tempfile::NamedTempFile::new().unwrap();
    module.write_all(b"not a PE image, just some text").unwrap();
    module.flush().unwrap();
    let pdb = tempfile::NamedTempFile::new().unwrap();
    let report = match_module_with_pdb_file(&PdbProvider::new(), module.path(), pdb.path());
    assert_eq!(report.error, Some(ErrorKind::Load));
    assert_eq!(report.status, StatusCode::PDB_FORMAT);
    assert_eq!(
        report.diagnostic.as_str(),
        "Failed to load module file (status: 0x806D000B)"
    );
    assert!(!report.is_matched);
}

fn fixtures_dir() -> PathBuf {
    let this_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    this_dir.join("tests").join("fixtures")
}

#[test]
fn fixture_module_matches_its_pdb() {
    let dir = fixtures_dir();
    let module = dir.join("x64.efi");
    let pdb = dir.join("x64.pdb");
    let report = match_module_with_pdb_file(&PdbProvider::new(), &module, &pdb);
    assert_eq!(report.error, None, "{}", report.diagnostic);
    assert_eq!(report.status, StatusCode::OK);
    assert!(report.is_matched);
    assert_eq!(report.diagnostic.as_str(), "");
    assert_eq!(match_identity(&PdbProvider::new(), &module, &pdb), Ok(true));
}

#[test]
fn fixture_module_without_its_referenced_pdb() {
    // The CodeView record names C:\build\x64.pdb, and the module's new directory has
    // no x64.pdb, so the signature cannot be read.
    let dir = tempfile::tempdir().unwrap();
    let module = dir.path().join("x64.efi");
    std::fs::copy(fixtures_dir().join("x64.efi"), &module).unwrap();
    let report =
        match_module_with_pdb_file(&PdbProvider::new(), &module, &fixtures_dir().join("x64.pdb"));
    assert_eq!(report.error, Some(ErrorKind::IdentityQuery));
    assert_eq!(report.status, StatusCode::PDB_NOT_FOUND);
    assert!(!report.is_matched);
    assert_eq!(
        report.diagnostic.as_str(),
        "Failed to get signature of the module (status: 0x806D0004)"
    );
}

#[test]
fn fixture_resolves_a_function_start() {
    let pdb = fixtures_dir().join("x64.pdb");
    let report = resolve_stack_frame_symbols(&PdbProvider::new(), &pdb, 0x1000);
    assert_eq!(report.error, None, "{}", report.diagnostic);
    assert_eq!(report.function_name, "func1");
    assert_eq!(report.displacement, 0);
    assert_eq!(report.file_name, "C:\\src\\x64.c");
    assert_eq!(report.line_number, 11);
}

#[test]
fn fixture_resolves_an_address_inside_a_function() {
    let pdb = fixtures_dir().join("x64.pdb");
    let frame = resolve_address(&PdbProvider::new(), &pdb, 0x1015).unwrap();
    assert_eq!(frame.function_name, "efi_main");
    assert_eq!(frame.displacement, 5);
    assert_eq!(frame.source_file_name, "C:\\src\\x64.c");
    assert_eq!(frame.line_number, 21);
}

#[test]
fn fixture_address_outside_any_procedure() {
    // 0x1028 is in .text, past the end of efi_main.
    let pdb = fixtures_dir().join("x64.pdb");
    let report = resolve_stack_frame_symbols(&PdbProvider::new(), &pdb, 0x1028);
    assert_eq!(report.error, Some(ErrorKind::SymbolNotFound));
    assert_eq!(report.status, StatusCode::FALSE);
    assert!(report.function_name.is_empty());
    assert!(report.file_name.is_empty());
    assert_eq!(report.line_number, 0);
    assert_eq!(
        report.diagnostic.as_str(),
        "Failed to find symbol by RVA (status: 0x1)"
    );
}
