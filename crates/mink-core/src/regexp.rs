//! Regular-expression flag semantics
//!
//! The matching engine is an external collaborator; only the flag set and
//! its parsing rules live here.

use crate::error::{RtResult, RuntimeError};

/// Flags of a regular-expression literal or constructor call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegExpFlags {
    /// `g` — match repeatedly, advancing past each match
    pub global: bool,
    /// `i` — case-insensitive matching
    pub ignore_case: bool,
    /// `m` — `^`/`$` also match at line terminators
    pub multiline: bool,
}

impl RegExpFlags {
    /// Parse a flag string such as `"gim"`.
    ///
    /// Each flag may appear at most once; unknown letters are rejected.
    pub fn parse(s: &str) -> RtResult<Self> {
        let mut flags = Self::default();
        for c in s.chars() {
            let slot = match c {
                'g' => &mut flags.global,
                'i' => &mut flags.ignore_case,
                'm' => &mut flags.multiline,
                _ => {
                    return Err(RuntimeError::syntax_error(format!(
                        "invalid regular expression flag '{c}'"
                    )));
                }
            };
            if *slot {
                return Err(RuntimeError::syntax_error(format!(
                    "duplicate regular expression flag '{c}'"
                )));
            }
            *slot = true;
        }
        Ok(flags)
    }
}

impl std::fmt::Display for RegExpFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.global {
            f.write_str("g")?;
        }
        if self.ignore_case {
            f.write_str("i")?;
        }
        if self.multiline {
            f.write_str("m")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_flag_in_any_order() {
        assert_eq!(RegExpFlags::parse("").unwrap(), RegExpFlags::default());
        let f = RegExpFlags::parse("mig").unwrap();
        assert!(f.global && f.ignore_case && f.multiline);
        assert_eq!(f.to_string(), "gim");
    }

    #[test]
    fn rejects_duplicates_and_unknown() {
        assert!(RegExpFlags::parse("gg").is_err());
        assert!(RegExpFlags::parse("x").is_err());
        assert!(RegExpFlags::parse("giy").is_err());
    }
}
