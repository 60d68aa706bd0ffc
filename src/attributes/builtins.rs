//! Built-in attribute values offered before any custom values.

pub static BUILTIN_COLORS: &[&str] = &[
    "red", "orange", "yellow", "green", "blue", "purple", "pink", "nude", "black", "brown",
    "grey", "white",
];

pub static BUILTIN_FORMULAS: &[&str] = &[
    "creme",
    "shimmer",
    "glitter",
    "metallic",
    "holographic",
    "chrome",
];

pub static BUILTIN_TOPPER_TYPES: &[&str] = &[
    "glossy",
    "matte",
    "glitter",
    "shimmer",
    "holographic",
    "chrome",
];

pub static BUILTIN_FINISHER_TYPES: &[&str] = &["glossy", "matte", "satin", "gel", "quick dry"];
