use msvc_demangler::DemangleFlags;

/// MangleKind represents the name mangling schemes that `undecorate` recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MangleKind {
    Msvc,
    Rust,
    Itanium,
}

/// Demangles a linkage name. Returns `None` if the name is not mangled in a scheme we
/// know, or if demangling fails; plain C names like `func1` end up here.
pub fn undecorate(name: &str) -> Option<(MangleKind, String)> {
    if name.starts_with('?') {
        let flags = DemangleFlags::NO_ACCESS_SPECIFIERS
            | DemangleFlags::NO_FUNCTION_RETURNS
            | DemangleFlags::NO_MEMBER_TYPE
            | DemangleFlags::NO_MS_KEYWORDS
            | DemangleFlags::NO_THISTYPE
            | DemangleFlags::NO_CLASS_TYPE
            | DemangleFlags::SPACE_AFTER_COMMA
            | DemangleFlags::HUG_TYPE;
        return msvc_demangler::demangle(name, flags)
            .ok()
            .map(|demangled| (MangleKind::Msvc, demangled));
    }

    if let Ok(demangled_symbol) = rustc_demangle::try_demangle(name) {
        return Some((MangleKind::Rust, format!("{demangled_symbol:#}")));
    }

    if name.starts_with("_Z") {
        let options = cpp_demangle::DemangleOptions::default().no_return_type();
        if let Ok(symbol) = cpp_demangle::Symbol::new(name) {
            if let Ok(demangled_string) = symbol.demangle_with_options(&options) {
                return Some((MangleKind::Itanium, demangled_string));
            }
        }
    }

    None
}
