//! Simplified/traditional detection by set membership.

use crate::dictionary_lib::ScriptSets;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptKind {
    /// No script-specific codepoint found.
    None,
    Simplified,
    Traditional,
    /// Both simplified-only and traditional-only codepoints occur.
    Both,
}

impl ScriptKind {
    /// Numeric code used by `zho_check`: 0 none, 1 traditional,
    /// 2 simplified, 3 both.
    pub fn code(self) -> i32 {
        match self {
            ScriptKind::None => 0,
            ScriptKind::Traditional => 1,
            ScriptKind::Simplified => 2,
            ScriptKind::Both => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ScriptKind::None),
            1 => Some(ScriptKind::Traditional),
            2 => Some(ScriptKind::Simplified),
            3 => Some(ScriptKind::Both),
            _ => None,
        }
    }
}

/// Classifies `text`. Codepoints in neither set are neutral. Scanning stops
/// as soon as both scripts have been seen.
pub fn detect(text: &str, sets: &ScriptSets) -> ScriptKind {
    let mut simplified = false;
    let mut traditional = false;

    for c in text.chars() {
        if !simplified && sets.simplified_only.contains(&c) {
            simplified = true;
        } else if !traditional && sets.traditional_only.contains(&c) {
            traditional = true;
        }
        if simplified && traditional {
            break;
        }
    }

    match (simplified, traditional) {
        (false, false) => ScriptKind::None,
        (true, false) => ScriptKind::Simplified,
        (false, true) => ScriptKind::Traditional,
        (true, true) => ScriptKind::Both,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets() -> ScriptSets {
        ScriptSets {
            simplified_only: ['简', '体', '汉'].into_iter().collect(),
            traditional_only: ['簡', '體', '漢'].into_iter().collect(),
        }
    }

    #[test]
    fn classifies_each_case() {
        let sets = sets();
        assert_eq!(detect("简体字", &sets), ScriptKind::Simplified);
        assert_eq!(detect("繁體字", &sets), ScriptKind::Traditional);
        assert_eq!(detect("简体與繁體", &sets), ScriptKind::Both);
        assert_eq!(detect("123 abc", &sets), ScriptKind::None);
        assert_eq!(detect("", &sets), ScriptKind::None);
    }

    #[test]
    fn codes_round_trip() {
        for kind in [
            ScriptKind::None,
            ScriptKind::Simplified,
            ScriptKind::Traditional,
            ScriptKind::Both,
        ] {
            assert_eq!(ScriptKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ScriptKind::from_code(-1), None);
    }
}
