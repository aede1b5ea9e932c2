use std::fmt;

use debugid::DebugId;
use uuid::Uuid;

/// The {GUID, signature, age} triple that ties a PDB file to one build of a module.
///
/// Two triples only match if all three fields are equal. A matching GUID with a
/// different age means the PDB was rewritten by a later incremental link, and its
/// line tables no longer describe the module's code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityTriple {
    pub guid: Uuid,
    pub signature: u32,
    pub age: u32,
}

impl IdentityTriple {
    pub fn new(guid: Uuid, signature: u32, age: u32) -> Self {
        Self {
            guid,
            signature,
            age,
        }
    }

    /// Creates a triple from GUID bytes in the on-disk layout used by CodeView
    /// records, where the first three GUID fields are stored little endian.
    pub fn from_guid_bytes_le(guid: [u8; 16], signature: u32, age: u32) -> Self {
        Self::new(Uuid::from_bytes_le(guid), signature, age)
    }

    /// Returns true if all three fields are equal.
    pub fn matches(&self, other: &IdentityTriple) -> bool {
        self.guid == other.guid && self.signature == other.signature && self.age == other.age
    }

    /// The breakpad-style debug ID for this triple. The signature is not part of it.
    pub fn debug_id(&self) -> DebugId {
        DebugId::from_parts(self.guid, self.age)
    }
}

impl fmt::Display for IdentityTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (signature {:08X})",
            self.debug_id().breakpad(),
            self.signature
        )
    }
}

/// One field of an [`IdentityTriple`], used to report which field could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityField {
    Guid,
    Signature,
    Age,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IdentityField::Guid => "GUID",
            IdentityField::Signature => "signature",
            IdentityField::Age => "age",
        };
        f.write_str(name)
    }
}
