//! Identifier checks shared by the registrar, the probe and config validation.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A single name segment: `foo`, `dummy_2_to_3`, `_private`.
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();

    /// A dotted module path: `vxl`, `vxl.vgl`.
    static ref MODULE_PATH: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap();
}

/// True if `name` can be bound in a namespace.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// True if `path` names a module the host could discover.
pub fn is_module_path(path: &str) -> bool {
    MODULE_PATH.is_match(path)
}
