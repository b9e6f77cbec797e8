//! Modules compiled into the compiler.
//!
//! The prelude is compiled into every session before any user source.
//! The others are pulled in with `@import Name;`.

pub(crate) const PRELUDE: &str = include_str!("modules/prelude.kdl");

/// Names and sources of the modules `@import` resolves without searching
/// the module paths.
pub const BUILTIN_MODULES: &[(&str, &str)] = &[
    ("Kestrel", include_str!("modules/kestrel.kdl")),
    ("Macintosh", include_str!("modules/macintosh.kdl")),
    ("SpriteWorld", include_str!("modules/spriteworld.kdl")),
];

/// Source of a built-in module.
pub fn builtin_module(name: &str) -> Option<&'static str> {
    BUILTIN_MODULES
        .iter()
        .find(|(module, _)| *module == name)
        .map(|(_, source)| *source)
}

/// File name reported in diagnostics for lexemes of a built-in module.
pub(crate) fn display_name(module: &str) -> String {
    format!("<{module}>")
}

/// Whether a location's file is a built-in module rather than a path.
pub(crate) fn is_builtin_file(file: &str) -> bool {
    file.starts_with('<')
}
