//! Administrative codes (`61`, `61.02`, `61.02.13`, `61.02.13.2003`).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::AdminLevel;

/// A validated administrative code in dotted form.
///
/// The code length determines the hierarchy depth, and every level's code is a
/// fixed-length prefix of its descendants' codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminCode(String);

impl AdminCode {
    /// Parse a raw code from a boundary property or code table key.
    ///
    /// Purely numeric codes in the dotless form (`6102132003`) are rewritten
    /// as dotted codes. Returns `None` when the result is not a usable code.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let code = if raw.bytes().all(|b| b.is_ascii_digit()) {
            dotted(raw)?
        } else {
            raw.to_string()
        };

        let well_formed = code.bytes().all(|b| b.is_ascii_digit() || b == b'.')
            && code.bytes().take(2).all(|b| b.is_ascii_digit());
        if !well_formed || AdminLevel::from_code_len(code.len()).is_none() {
            return None;
        }

        Some(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hierarchy depth implied by the code length.
    pub fn level(&self) -> Option<AdminLevel> {
        AdminLevel::from_code_len(self.0.len())
    }

    /// Code of this code's ancestor (or self) at `level`.
    ///
    /// Returns `None` when the code is too short to carry that level. The
    /// village level yields the full code, and only for village codes.
    pub fn prefix(&self, level: AdminLevel) -> Option<&str> {
        match level.prefix_len() {
            Some(n) if self.0.len() >= n => self.0.get(..n),
            Some(_) => None,
            None if self.level() == Some(AdminLevel::Village) => Some(&self.0),
            None => None,
        }
    }
}

impl fmt::Display for AdminCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AdminCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Insert dots into a dotless numeric code (2-2-2-4 grouping).
fn dotted(digits: &str) -> Option<String> {
    match digits.len() {
        2 => Some(digits.to_string()),
        4 => Some(format!("{}.{}", &digits[..2], &digits[2..])),
        6 => Some(format!("{}.{}.{}", &digits[..2], &digits[2..4], &digits[4..])),
        10 => Some(format!(
            "{}.{}.{}.{}",
            &digits[..2],
            &digits[2..4],
            &digits[4..6],
            &digits[6..]
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotted() {
        let code = AdminCode::parse(" 61.02.13.2003 ").unwrap();
        assert_eq!(code.as_str(), "61.02.13.2003");
        assert_eq!(code.level(), Some(AdminLevel::Village));
    }

    #[test]
    fn test_parse_dotless() {
        assert_eq!(AdminCode::parse("6102132003").unwrap().as_str(), "61.02.13.2003");
        assert_eq!(AdminCode::parse("610213").unwrap().as_str(), "61.02.13");
        assert_eq!(AdminCode::parse("6102").unwrap().as_str(), "61.02");
        assert_eq!(AdminCode::parse("61").unwrap().as_str(), "61");
    }

    #[test]
    fn test_parse_rejects_unusable() {
        assert!(AdminCode::parse("").is_none());
        assert!(AdminCode::parse("7").is_none());
        assert!(AdminCode::parse("12345").is_none());
        assert!(AdminCode::parse("ID-61").is_none());
        assert!(AdminCode::parse("61.0").is_none());
        assert!(AdminCode::parse(".1.02").is_none());
    }

    #[test]
    fn test_prefixes() {
        let code = AdminCode::parse("61.02.13.2003").unwrap();
        assert_eq!(code.prefix(AdminLevel::Province), Some("61"));
        assert_eq!(code.prefix(AdminLevel::District), Some("61.02"));
        assert_eq!(code.prefix(AdminLevel::SubDistrict), Some("61.02.13"));
        assert_eq!(code.prefix(AdminLevel::Village), Some("61.02.13.2003"));

        let district = AdminCode::parse("61.02").unwrap();
        assert_eq!(district.prefix(AdminLevel::District), Some("61.02"));
        assert_eq!(district.prefix(AdminLevel::SubDistrict), None);
        assert_eq!(district.prefix(AdminLevel::Village), None);

        let province = AdminCode::parse("61").unwrap();
        assert_eq!(province.prefix(AdminLevel::Province), Some("61"));
        assert_eq!(province.prefix(AdminLevel::Village), None);
    }
}
