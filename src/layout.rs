//! Target data-layout queries.
//!
//! Byte widths for the LP64 data layout the engine targets (the layout of
//! every mainstream 64-bit Unix target). These stand in for the compiler
//! front end's type-info query on scalar declarations.

use phf::phf_map;

/// Width of every object and function pointer on the target, in bytes.
pub const POINTER_WIDTH: u64 = 8;

/// Byte widths for scalar type spellings under LP64.
static SCALAR_WIDTHS: phf::Map<&'static str, u64> = phf_map! {
    "_Bool" => 1,
    "bool" => 1,
    "char" => 1,
    "signed char" => 1,
    "unsigned char" => 1,
    "short" => 2,
    "short int" => 2,
    "signed short" => 2,
    "signed short int" => 2,
    "unsigned short" => 2,
    "unsigned short int" => 2,
    "int" => 4,
    "signed" => 4,
    "signed int" => 4,
    "unsigned" => 4,
    "unsigned int" => 4,
    "long" => 8,
    "long int" => 8,
    "signed long" => 8,
    "signed long int" => 8,
    "unsigned long" => 8,
    "unsigned long int" => 8,
    "long long" => 8,
    "long long int" => 8,
    "signed long long" => 8,
    "unsigned long long" => 8,
    "unsigned long long int" => 8,
    "float" => 4,
    "double" => 8,
    "long double" => 16,
    "wchar_t" => 4,
    "char16_t" => 2,
    "char32_t" => 4,
    "size_t" => 8,
    "ssize_t" => 8,
    "ptrdiff_t" => 8,
    "intptr_t" => 8,
    "uintptr_t" => 8,
    "intmax_t" => 8,
    "uintmax_t" => 8,
    "int8_t" => 1,
    "uint8_t" => 1,
    "int16_t" => 2,
    "uint16_t" => 2,
    "int32_t" => 4,
    "uint32_t" => 4,
    "int64_t" => 8,
    "uint64_t" => 8,
};

/// Byte width of a type spelling on the target data layout.
///
/// Pointer types (any spelling ending in `*` or `&`) report
/// [`POINTER_WIDTH`]; enums report the width of `int`. Aggregates and
/// typedef names the table does not know report 0; the engine has no layout
/// information for them, and 0 is the documented "unknown" marker.
pub fn byte_width(type_name: &str) -> u64 {
    let normalized = normalize(type_name);
    if normalized.ends_with('*') || normalized.ends_with('&') {
        return POINTER_WIDTH;
    }
    if normalized.starts_with("enum ") {
        // An unscoped enum is int-sized regardless of its name.
        return 4;
    }
    SCALAR_WIDTHS.get(normalized.as_str()).copied().unwrap_or(0)
}

/// Collapse whitespace and strip qualifiers that do not affect layout.
fn normalize(type_name: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for token in type_name.split_whitespace() {
        match token {
            "const" | "volatile" | "restrict" | "register" | "static" => continue,
            _ => parts.push(token),
        }
    }
    parts.join(" ")
}
