//! Identity triples for PE modules and PDB files.
//!
//! A PDB file belongs to exactly one build of a module. The link between the two is
//! the {GUID, signature, age} triple. The linker writes GUID and age into the module's
//! CodeView debug directory entry, together with the path of the PDB; all three fields
//! are in the PDB's info and DBI streams. This crate holds the triple type and the code
//! that reads the CodeView record out of a PE image.

mod identity;
mod pe;

pub use identity::{IdentityField, IdentityTriple};
pub use pe::{CodeViewInfo, ModuleIdentityFields, ModuleParseError};

pub use debugid;
pub use uuid;
