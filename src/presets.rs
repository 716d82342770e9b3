//! Named functions worth looking at.  Each entry is handed verbatim to
//! the parser, so every one of them must parse and pass the probe.

/// Preset names and their function strings.
pub const PRESETS: &[(&str, &str)] = &[
    ("identity", "z"),
    ("inversion", "1/z"),
    ("square", "z^2"),
    ("cube", "z^3"),
    ("sqrt", "sqrt(z)"),
    ("exp", "exp(z)"),
    ("log", "log(z)"),
    ("sin", "sin(z)"),
    ("tan", "tan(z)"),
    ("joukowski", "z + 1/z"),
    ("mobius", "(z - i)/(z + i)"),
];

/// Looks up a preset's function string by name.
pub fn lookup(name: &str) -> Option<&'static str> {
    PRESETS
        .iter()
        .find(|&&(n, _)| n == name)
        .map(|&(_, f)| f)
}
