use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Direction of a keyset listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = std::convert::Infallible;

    /// Anything other than "asc" (any case) lists newest first
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else {
            Ok(SortDirection::Desc)
        }
    }
}

/// Turns a raw request cursor into an optional one; non-positive values mean
/// "start from the far end" in either direction.
pub fn cursor_from_raw(raw: i64) -> Option<i64> {
    (raw > 0).then_some(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_direction_case_insensitively() {
        assert_eq!("ASC".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert_eq!("".parse::<SortDirection>().unwrap(), SortDirection::Desc);
    }

    #[test]
    fn non_positive_cursor_is_absent() {
        assert_eq!(cursor_from_raw(0), None);
        assert_eq!(cursor_from_raw(-5), None);
        assert_eq!(cursor_from_raw(3), Some(3));
    }
}
