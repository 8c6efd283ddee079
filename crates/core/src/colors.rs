//! Type color table

/// Color for types missing from the table.
pub const FALLBACK_COLOR: &str = "#888888";

/// Background color for a type badge, case-insensitive.
pub fn type_color(type_name: &str) -> &'static str {
    match type_name.to_lowercase().as_str() {
        "normal" => "#A8A878",
        "fire" => "#F08030",
        "water" => "#6890F0",
        "electric" => "#F8D030",
        "grass" => "#78C850",
        "ice" => "#98D8D8",
        "fighting" => "#C03028",
        "poison" => "#A040A0",
        "ground" => "#E0C068",
        "flying" => "#A890F0",
        "psychic" => "#F85888",
        "bug" => "#A8B820",
        "rock" => "#B8A038",
        "ghost" => "#705898",
        "dragon" => "#7038F8",
        "dark" => "#705848",
        "steel" => "#B8B8D0",
        "fairy" => "#EE99AC",
        _ => FALLBACK_COLOR,
    }
}

/// Foreground color readable on top of [`type_color`].
pub fn type_text_color(type_name: &str) -> &'static str {
    if type_name.eq_ignore_ascii_case("electric") {
        "#333333"
    } else {
        "#FFFFFF"
    }
}

/// Parse `#RRGGBB` into its channels.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
