/// Normalize `#rgb` / `#rrggbb` (hash optional, any case) to lower-case `#rrggbb`
pub fn normalize_hex_color(value: &str) -> Option<String> {
    let hex = value.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let expanded = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => hex.to_string(),
        _ => return None,
    };

    Some(format!("#{}", expanded.to_ascii_lowercase()))
}
