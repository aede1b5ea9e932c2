use std::path::{Path, PathBuf};

use object::pe::{ImageNtHeaders32, ImageNtHeaders64};
use object::read::pe::{ImageNtHeaders, PeFile};
use object::{FileKind, Object};
use thiserror::Error;

use crate::IdentityTriple;

#[derive(Error, Debug)]
pub enum ModuleParseError {
    #[error("Expected a PE image, got {0:?}")]
    NotPe(FileKind),

    #[error("Could not parse the module: {0}")]
    Object(#[from] object::read::Error),
}

/// The CodeView (RSDS) record from a PE image's debug directory.
///
/// The record carries the GUID and age of the PDB written by the same link. The
/// signature lives only in that PDB's info stream, so the module side of an
/// [`IdentityTriple`] is completed by opening the PDB that `pdb_path` names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeViewInfo {
    /// GUID bytes in on-disk order.
    pub guid: [u8; 16],
    pub age: u32,
    /// The PDB path that the linker recorded, lossily converted to UTF-8.
    pub pdb_path: String,
}

impl CodeViewInfo {
    /// The file name part of `pdb_path`. The path was written on the build machine and
    /// may use either separator.
    pub fn pdb_file_name(&self) -> Option<&str> {
        self.pdb_path
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .filter(|name| !name.is_empty())
    }

    /// The places to look for the PDB this record refers to, in order: the recorded
    /// path, then a file of the same name in the module's directory. A record without
    /// a path falls back to `<module stem>.pdb` next to the module.
    pub fn pdb_candidates(&self, module_path: &Path) -> Vec<PathBuf> {
        let module_dir = module_path.parent().unwrap_or_else(|| Path::new(""));
        let mut candidates = Vec::new();
        match self.pdb_file_name() {
            Some(file_name) => {
                candidates.push(PathBuf::from(&self.pdb_path));
                let beside_module = module_dir.join(file_name);
                if !candidates.contains(&beside_module) {
                    candidates.push(beside_module);
                }
            }
            None => {
                if let Some(stem) = module_path.file_stem() {
                    let mut file_name = stem.to_os_string();
                    file_name.push(".pdb");
                    candidates.push(module_dir.join(file_name));
                }
            }
        }
        candidates
    }

    /// Returns true if `pdb` has this record's GUID and age, i.e. it is a PDB the
    /// record can refer to. The signature is not compared.
    pub fn refers_to(&self, pdb: &IdentityTriple) -> bool {
        let recorded = IdentityTriple::from_guid_bytes_le(self.guid, pdb.signature, self.age);
        recorded.matches(pdb)
    }

    /// The module's identity triple, completed with the signature read from the
    /// referenced PDB's info stream.
    pub fn identity(&self, pdb_signature: u32) -> IdentityTriple {
        IdentityTriple::from_guid_bytes_le(self.guid, pdb_signature, self.age)
    }
}

/// The identity-relevant parts of a PE image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleIdentityFields {
    /// `None` if the image was linked without debug info.
    pub code_view: Option<CodeViewInfo>,
}

impl ModuleIdentityFields {
    /// Parses a PE32 or PE32+ image.
    pub fn parse(data: &[u8]) -> Result<Self, ModuleParseError> {
        match FileKind::parse(data)? {
            FileKind::Pe32 => parse_pe::<ImageNtHeaders32>(data),
            FileKind::Pe64 => parse_pe::<ImageNtHeaders64>(data),
            other => Err(ModuleParseError::NotPe(other)),
        }
    }
}

fn parse_pe<Pe: ImageNtHeaders>(data: &[u8]) -> Result<ModuleIdentityFields, ModuleParseError> {
    let pe = PeFile::<Pe>::parse(data)?;
    let code_view = pe.pdb_info()?.map(|info| CodeViewInfo {
        guid: info.guid(),
        age: info.age(),
        pdb_path: String::from_utf8_lossy(info.path()).into_owned(),
    });
    Ok(ModuleIdentityFields { code_view })
}
