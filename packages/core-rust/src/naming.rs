//! Resource naming: derives the route segment for a capability type.

/// Suffixes stripped from a type name, tested in this order.
pub const RESOURCE_SUFFIXES: [&str; 3] = ["Client", "Service", "Api"];

/// Leading character marking an interface name (`IOrderService`).
pub const MARKER_PREFIX: char = 'I';

/// Derives the resource segment of a route from a type name.
///
/// The bare name (last path segment, generic arguments removed) loses one
/// leading `I`, then the first matching suffix from [`RESOURCE_SUFFIXES`].
/// Only one suffix is stripped, and never one that makes up the whole
/// remaining name.
#[must_use]
pub fn resource_name(type_name: &str) -> String {
    let name = strip_marker(bare_name(type_name));

    RESOURCE_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix).filter(|stem| !stem.is_empty()))
        .unwrap_or(name)
        .to_string()
}

fn bare_name(type_name: &str) -> &str {
    let without_generics = type_name
        .split_once('<')
        .map_or(type_name, |(head, _)| head);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
        .trim()
}

/// A lone `I` is kept so the resource segment never ends up empty.
fn strip_marker(name: &str) -> &str {
    match name.strip_prefix(MARKER_PREFIX) {
        Some(rest) if !rest.is_empty() => rest,
        _ => name,
    }
}
