//! Registry of supported conversion configurations.
//!
//! Every configuration is a fixed pipeline of rounds; each round is an
//! ordered chain of lexicons (earlier lexicons win ties). The output of one
//! round is the input of the next.

use std::fmt;

use crate::dictionary_lib::Lexicon;
use crate::error::OpenccError;

use Lexicon::*;

const ST: &[Lexicon] = &[StPhrases, StCharacters];
const TS: &[Lexicon] = &[TsPhrases, TsCharacters];
const TW_REV: &[Lexicon] = &[TwVariantsRevPhrases, TwVariantsRev];
const HK_REV: &[Lexicon] = &[HkVariantsRevPhrases, HkVariantsRev];

/// Script direction of a configuration; decides the punctuation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    SimplifiedToTraditional,
    TraditionalToSimplified,
    /// Regional variants between Traditional standards; quotes are rendered
    /// in Traditional corner brackets.
    TraditionalVariants,
    /// Japanese Shinjitai and back; punctuation is kept.
    Japanese,
}

impl Direction {
    pub fn punctuation_lexicon(self) -> Option<Lexicon> {
        match self {
            Direction::SimplifiedToTraditional | Direction::TraditionalVariants => {
                Some(StPunctuations)
            }
            Direction::TraditionalToSimplified => Some(TsPunctuations),
            Direction::Japanese => None,
        }
    }
}

/// Supported configurations. Discriminants are the stable numeric ids used
/// across the C boundary.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenccConfig {
    S2t = 1,
    S2tw = 2,
    S2twp = 3,
    S2hk = 4,
    T2s = 5,
    T2tw = 6,
    T2twp = 7,
    T2hk = 8,
    Tw2s = 9,
    Tw2sp = 10,
    Tw2t = 11,
    Tw2tp = 12,
    Hk2s = 13,
    Hk2t = 14,
    Jp2t = 15,
    T2jp = 16,
}

impl OpenccConfig {
    pub const COUNT: usize = 16;

    pub const ALL: [OpenccConfig; OpenccConfig::COUNT] = [
        OpenccConfig::S2t,
        OpenccConfig::S2tw,
        OpenccConfig::S2twp,
        OpenccConfig::S2hk,
        OpenccConfig::T2s,
        OpenccConfig::T2tw,
        OpenccConfig::T2twp,
        OpenccConfig::T2hk,
        OpenccConfig::Tw2s,
        OpenccConfig::Tw2sp,
        OpenccConfig::Tw2t,
        OpenccConfig::Tw2tp,
        OpenccConfig::Hk2s,
        OpenccConfig::Hk2t,
        OpenccConfig::Jp2t,
        OpenccConfig::T2jp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OpenccConfig::S2t => "s2t",
            OpenccConfig::S2tw => "s2tw",
            OpenccConfig::S2twp => "s2twp",
            OpenccConfig::S2hk => "s2hk",
            OpenccConfig::T2s => "t2s",
            OpenccConfig::T2tw => "t2tw",
            OpenccConfig::T2twp => "t2twp",
            OpenccConfig::T2hk => "t2hk",
            OpenccConfig::Tw2s => "tw2s",
            OpenccConfig::Tw2sp => "tw2sp",
            OpenccConfig::Tw2t => "tw2t",
            OpenccConfig::Tw2tp => "tw2tp",
            OpenccConfig::Hk2s => "hk2s",
            OpenccConfig::Hk2t => "hk2t",
            OpenccConfig::Jp2t => "jp2t",
            OpenccConfig::T2jp => "t2jp",
        }
    }

    #[inline]
    pub fn to_ffi(self) -> u32 {
        self as u32
    }

    pub fn from_ffi(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|cfg| cfg.to_ffi() == id)
    }

    /// Position in [`OpenccConfig::ALL`], used for per-config cache slots.
    #[inline]
    pub(crate) fn slot(self) -> usize {
        self as usize - 1
    }

    /// Lexicon chains applied in order, one per round.
    pub fn rounds(self) -> &'static [&'static [Lexicon]] {
        match self {
            OpenccConfig::S2t => &[ST],
            OpenccConfig::T2s => &[TS],
            OpenccConfig::S2tw => &[ST, &[TwVariants]],
            OpenccConfig::Tw2s => &[TW_REV, TS],
            OpenccConfig::S2twp => &[ST, &[TwPhrases], &[TwVariants]],
            OpenccConfig::Tw2sp => &[TW_REV, &[TwPhrasesRev], TS],
            OpenccConfig::S2hk => &[ST, &[HkVariants]],
            OpenccConfig::Hk2s => &[HK_REV, TS],
            OpenccConfig::T2tw => &[&[TwVariants]],
            OpenccConfig::T2twp => &[&[TwPhrases], &[TwVariants]],
            OpenccConfig::Tw2t => &[TW_REV],
            OpenccConfig::Tw2tp => &[TW_REV, &[TwPhrasesRev]],
            OpenccConfig::T2hk => &[&[HkVariants]],
            OpenccConfig::Hk2t => &[HK_REV],
            OpenccConfig::T2jp => &[&[JpVariants]],
            OpenccConfig::Jp2t => &[&[JpsPhrases, JpsCharacters, JpVariantsRev]],
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            OpenccConfig::S2t | OpenccConfig::S2tw | OpenccConfig::S2twp | OpenccConfig::S2hk => {
                Direction::SimplifiedToTraditional
            }
            OpenccConfig::T2s | OpenccConfig::Tw2s | OpenccConfig::Tw2sp | OpenccConfig::Hk2s => {
                Direction::TraditionalToSimplified
            }
            OpenccConfig::T2tw
            | OpenccConfig::Tw2t
            | OpenccConfig::T2twp
            | OpenccConfig::Tw2tp
            | OpenccConfig::T2hk
            | OpenccConfig::Hk2t => Direction::TraditionalVariants,
            OpenccConfig::T2jp | OpenccConfig::Jp2t => Direction::Japanese,
        }
    }

    /// The configuration converting back the other way.
    pub fn inverse(self) -> Self {
        match self {
            OpenccConfig::S2t => OpenccConfig::T2s,
            OpenccConfig::T2s => OpenccConfig::S2t,
            OpenccConfig::S2tw => OpenccConfig::Tw2s,
            OpenccConfig::Tw2s => OpenccConfig::S2tw,
            OpenccConfig::S2twp => OpenccConfig::Tw2sp,
            OpenccConfig::Tw2sp => OpenccConfig::S2twp,
            OpenccConfig::S2hk => OpenccConfig::Hk2s,
            OpenccConfig::Hk2s => OpenccConfig::S2hk,
            OpenccConfig::T2tw => OpenccConfig::Tw2t,
            OpenccConfig::Tw2t => OpenccConfig::T2tw,
            OpenccConfig::T2twp => OpenccConfig::Tw2tp,
            OpenccConfig::Tw2tp => OpenccConfig::T2twp,
            OpenccConfig::T2hk => OpenccConfig::Hk2t,
            OpenccConfig::Hk2t => OpenccConfig::T2hk,
            OpenccConfig::T2jp => OpenccConfig::Jp2t,
            OpenccConfig::Jp2t => OpenccConfig::T2jp,
        }
    }

    /// Every lexicon the configuration reads, conversion rounds first.
    pub fn required_lexicons(self, punctuation: bool) -> Vec<Lexicon> {
        let mut out: Vec<Lexicon> = self.rounds().iter().flat_map(|r| r.iter().copied()).collect();
        if punctuation {
            out.extend(self.direction().punctuation_lexicon());
        }
        out
    }
}

impl fmt::Display for OpenccConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for OpenccConfig {
    type Error = OpenccError;

    /// Exact, case-sensitive match.
    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|cfg| cfg.as_str() == name)
            .ok_or_else(|| OpenccError::UnknownConfiguration(name.to_string()))
    }
}

impl std::str::FromStr for OpenccConfig {
    type Err = OpenccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_ids_round_trip() {
        for cfg in OpenccConfig::ALL {
            assert_eq!(OpenccConfig::try_from(cfg.as_str()).unwrap(), cfg);
            assert_eq!(OpenccConfig::from_ffi(cfg.to_ffi()), Some(cfg));
            assert_eq!(OpenccConfig::ALL[cfg.slot()], cfg);
        }
        assert_eq!(OpenccConfig::from_ffi(0), None);
        assert_eq!(OpenccConfig::from_ffi(17), None);
    }

    #[test]
    fn names_are_case_sensitive() {
        assert!(OpenccConfig::try_from("S2T").is_err());
        assert!(OpenccConfig::try_from("s2t ").is_err());
        assert!(OpenccConfig::try_from("").is_err());
        assert!("s2twp".parse::<OpenccConfig>().is_ok());
    }

    #[test]
    fn inverse_is_an_involution() {
        for cfg in OpenccConfig::ALL {
            assert_ne!(cfg.inverse(), cfg);
            assert_eq!(cfg.inverse().inverse(), cfg);
        }
    }

    #[test]
    fn punctuation_follows_direction() {
        assert_eq!(
            OpenccConfig::S2twp.required_lexicons(true).last(),
            Some(&Lexicon::StPunctuations)
        );
        assert_eq!(
            OpenccConfig::Hk2s.required_lexicons(true).last(),
            Some(&Lexicon::TsPunctuations)
        );
        assert!(!OpenccConfig::T2jp
            .required_lexicons(true)
            .contains(&Lexicon::StPunctuations));
    }

    #[test]
    fn traditional_variant_configs_use_st_punctuation() {
        for cfg in [
            OpenccConfig::T2tw,
            OpenccConfig::Tw2t,
            OpenccConfig::T2twp,
            OpenccConfig::Tw2tp,
            OpenccConfig::T2hk,
            OpenccConfig::Hk2t,
        ] {
            assert_eq!(cfg.direction(), Direction::TraditionalVariants);
            assert_eq!(
                cfg.direction().punctuation_lexicon(),
                Some(Lexicon::StPunctuations)
            );
        }
        assert_eq!(OpenccConfig::Jp2t.direction().punctuation_lexicon(), None);
    }

    #[test]
    fn every_config_has_a_round() {
        for cfg in OpenccConfig::ALL {
            assert!(!cfg.rounds().is_empty());
            assert!(cfg.rounds().iter().all(|r| !r.is_empty()));
        }
    }
}
