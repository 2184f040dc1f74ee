//! Icon name to glyph mapping.

const ICONS: &[(&str, &str)] = &[
    ("mail", "\u{2709}"),
    ("phone", "\u{260E}"),
    ("user", "\u{263A}"),
    ("star", "\u{2605}"),
    ("heart", "\u{2665}"),
    ("check", "\u{2713}"),
    ("calendar", "\u{1F4C5}"),
    ("clock", "\u{1F550}"),
    ("map-pin", "\u{1F4CD}"),
    ("globe", "\u{1F310}"),
    ("search", "\u{1F50D}"),
    ("settings", "\u{2699}"),
    ("bell", "\u{1F514}"),
    ("home", "\u{1F3E0}"),
    ("arrow-right", "\u{2192}"),
    ("plus", "+"),
    ("minus", "\u{2212}"),
    ("edit", "\u{270E}"),
    ("trash", "\u{1F5D1}"),
    ("download", "\u{2B07}"),
    ("upload", "\u{2B06}"),
    ("link", "\u{1F517}"),
    ("send", "\u{27A4}"),
    ("menu", "\u{2630}"),
    ("close", "\u{2715}"),
    ("chevron-right", "\u{203A}"),
    ("chevron-down", "\u{2304}"),
    ("info", "\u{2139}"),
    ("warning", "\u{26A0}"),
    ("error", "\u{26D4}"),
    ("success", "\u{2714}"),
    ("airplane", "\u{2708}"),
    ("hotel", "\u{1F3E8}"),
    ("restaurant", "\u{1F37D}"),
    ("coffee", "\u{2615}"),
    ("shopping-cart", "\u{1F6D2}"),
    ("credit-card", "\u{1F4B3}"),
    ("briefcase", "\u{1F4BC}"),
    ("code", "\u{1F4BB}"),
    ("terminal", "\u{276F}"),
    ("database", "\u{1F5C4}"),
    ("cloud", "\u{2601}"),
    ("sun", "\u{2600}"),
    ("moon", "\u{1F319}"),
];

/// Glyph for a named icon. Unrecognized names are returned unchanged.
pub fn glyph(name: &str) -> &str {
    ICONS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, g)| *g)
        .unwrap_or(name)
}
