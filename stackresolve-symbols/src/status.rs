use std::fmt;

/// A raw status code reported by a debug info provider.
///
/// The codes use the HRESULT layout of the Windows debug interfaces: the high bit marks
/// a failure, and `0x806D_xxxx` is the facility used for PDB errors. Providers that are
/// not backed by such an interface pick the closest code from the constants below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StatusCode(pub u32);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(0x0000_0000);
    /// The query ran, but found nothing.
    pub const FALSE: StatusCode = StatusCode(0x0000_0001);
    pub const FAIL: StatusCode = StatusCode(0x8000_4005);
    pub const INVALID_ARG: StatusCode = StatusCode(0x8007_0057);
    pub const PDB_FILE_SYSTEM: StatusCode = StatusCode(0x806D_0003);
    pub const PDB_NOT_FOUND: StatusCode = StatusCode(0x806D_0004);
    pub const PDB_FORMAT: StatusCode = StatusCode(0x806D_000B);
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}
