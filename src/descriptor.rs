//! Field/return type descriptor decoding.
//!
//! `I` -> `int`, `Ljava/util/List;` -> `java.util.List`, `[[I` -> `int[][]`.
//! Anything that does not look like a descriptor is handed back as-is.

const ARRAY_MARKER: char = '[';

pub fn decode_type(descriptor: &str) -> String {
    let base = descriptor.trim_start_matches(ARRAY_MARKER);
    let dimensions = descriptor.len() - base.len();

    let mut decoded = decode_base(base);
    for _ in 0..dimensions {
        decoded.push_str("[]");
    }
    decoded
}

fn decode_base(token: &str) -> String {
    if let Some(name) = primitive_name(token) {
        return name.to_string();
    }

    if let Some(inner) = token.strip_prefix('L') {
        let inner = inner.strip_suffix(';').unwrap_or(inner);
        if !inner.is_empty() {
            return internal_to_dotted(inner);
        }
    }

    token.to_string()
}

pub fn primitive_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "I" => "int",
        "Z" => "boolean",
        "B" => "byte",
        "C" => "char",
        "D" => "double",
        "F" => "float",
        "J" => "long",
        "S" => "short",
        "V" => "void",
        _ => return None,
    };
    Some(name)
}

pub fn internal_to_dotted(name: &str) -> String {
    name.replace('/', ".")
}

/// Strips the `L`/`;` wrapper of an object descriptor, leaving separators alone.
pub fn strip_object_wrapper(descriptor: &str) -> &str {
    let inner = descriptor.strip_prefix('L').unwrap_or(descriptor);
    inner.strip_suffix(';').unwrap_or(inner)
}
