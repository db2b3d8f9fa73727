const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Deterministic value in `[0, 1]` derived from an id. Stable across runs
/// and platforms, so seeded layouts repeat.
pub fn stable_unit(id: &str) -> f32 {
    let hash = id
        .bytes()
        .fold(FNV_OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME));
    (hash >> 40) as f32 / (1_u64 << 24) as f32
}

/// Cuts `text` to `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_label_keeps_short_text_and_ellipsizes_long_text() {
        assert_eq!(truncate_label("parse", 15), "parse");
        let long = truncate_label("resolve_workspace_dependencies", 15);
        assert_eq!(long, "resolve_workspa…");
    }

    #[test]
    fn stable_unit_is_deterministic_and_bounded() {
        let value = stable_unit("core/dir0/file1/fn2");
        assert_eq!(value, stable_unit("core/dir0/file1/fn2"));
        assert!((0.0..=1.0).contains(&value));
        assert_ne!(value, stable_unit("core/dir0/file1/fn3"));
    }
}
