use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use stackresolve_symbols::{
    match_module_with_pdb_file, resolve_stack_frame_symbols, DebugInfoProvider, StackFrameReport,
};

const MODULE_EXTENSIONS: [&str; 3] = ["efi", "dll", "exe"];
const MISMATCH_MESSAGE: &str = "PDB does not match module";

/// One frame line of a dumped stack trace, e.g.
/// ` 0 00000057261FFAE0 00007FFC9AC910E5 x64+10E5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFrame {
    pub index: u32,
    pub child_sp: String,
    pub return_address: String,
    pub module: String,
    pub rva: u32,
}

impl TraceFrame {
    /// Returns `None` for lines that are not frames, like the table header.
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let index = fields.next()?.parse().ok()?;
        let child_sp = hex_field(fields.next()?)?;
        let return_address = hex_field(fields.next()?)?;
        let (module, rva) = fields.next()?.rsplit_once('+')?;
        if module.is_empty() || fields.next().is_some() {
            return None;
        }
        let rva = u32::from_str_radix(rva, 16).ok()?;
        Some(Self {
            index,
            child_sp: child_sp.to_string(),
            return_address: return_address.to_string(),
            module: module.to_string(),
            rva,
        })
    }

    pub fn format_resolved(&self, report: &StackFrameReport) -> String {
        format!(
            "{} [{} @ {}] {} {} {}!{}+0x{:X}",
            self.index,
            report.file_name,
            report.line_number,
            self.child_sp,
            self.return_address,
            self.module,
            report.function_name,
            report.displacement
        )
    }

    pub fn format_unresolved(&self, message: &str) -> String {
        format!(
            "{} [{}] {} {} {}+{:X}",
            self.index, message, self.child_sp, self.return_address, self.module, self.rva
        )
    }
}

fn hex_field(field: &str) -> Option<&str> {
    let digits = field.strip_prefix("0x").unwrap_or(field);
    let digits = digits.replace('`', "");
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(field)
}

/// Annotates a stack trace.
pub struct TraceAnnotator<'p, P: DebugInfoProvider> {
    provider: &'p P,
    pdb_dir: PathBuf,
    module_dir: Option<PathBuf>,
    /// Per module: `None` if it matches its PDB (or can't be checked), else the reason
    /// its frames are not resolved.
    verdicts: HashMap<String, Option<String>>,
}

impl<'p, P: DebugInfoProvider> TraceAnnotator<'p, P> {
    pub fn new(provider: &'p P, pdb_dir: PathBuf, module_dir: Option<PathBuf>) -> Self {
        Self {
            provider,
            pdb_dir,
            module_dir,
            verdicts: HashMap::new(),
        }
    }

    fn pdb_path(&self, module: &str) -> PathBuf {
        self.pdb_dir.join(format!("{module}.pdb"))
    }

    /// Copies `input` to `output`, replacing every frame line with its annotated form.
    pub fn annotate(&mut self, input: impl BufRead, mut output: impl Write) -> anyhow::Result<()> {
        for line in input.lines() {
            let line = line?;
            match TraceFrame::parse(&line) {
                Some(frame) => writeln!(output, "{}", self.annotate_frame(&frame))?,
                None => writeln!(output, "{line}")?,
            }
        }
        output.flush()?;
        Ok(())
    }

    pub fn annotate_frame(&mut self, frame: &TraceFrame) -> String {
        let pdb_path = self.pdb_path(&frame.module);
        if let Some(reason) = self.verdict(&frame.module, &pdb_path) {
            return frame.format_unresolved(&reason);
        }
        let report = resolve_stack_frame_symbols(self.provider, &pdb_path, frame.rva);
        if report.is_success() {
            frame.format_resolved(&report)
        } else {
            frame.format_unresolved(report.diagnostic.as_str())
        }
    }

    fn verdict(&mut self, module: &str, pdb_path: &Path) -> Option<String> {
        let Some(module_dir) = &self.module_dir else {
            return None;
        };
        if let Some(verdict) = self.verdicts.get(module) {
            return verdict.clone();
        }
        let verdict = match find_module_file(module_dir, module) {
            None => {
                log::warn!(
                    "No .efi, .dll or .exe for {module} in {}; resolving without matching",
                    module_dir.display()
                );
                None
            }
            Some(module_path) => {
                let report = match_module_with_pdb_file(self.provider, &module_path, pdb_path);
                if !report.is_success() {
                    Some(report.diagnostic.into_string())
                } else if !report.is_matched {
                    Some(MISMATCH_MESSAGE.to_string())
                } else {
                    None
                }
            }
        };
        self.verdicts.insert(module.to_string(), verdict.clone());
        verdict
    }
}

fn find_module_file(module_dir: &Path, module: &str) -> Option<PathBuf> {
    MODULE_EXTENSIONS
        .iter()
        .map(|ext| module_dir.join(format!("{module}.{ext}")))
        .find(|path| path.is_file())
}
