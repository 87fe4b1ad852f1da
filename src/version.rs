//! Numeric version handling.
//!
//! Tool versions are compared component by component (major, then minor,
//! then patch), never as strings, which would order "3.9" after "3.10".

use crate::error::{KindlingError, Result};
use std::fmt;
use std::str::FromStr;

/// A three-component numeric version.
///
/// Missing components parse as zero, so "3.20" and "3.20.0" are equal.
/// Ordering is derived field by field, which gives the numeric
/// component-wise comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemVer {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SemVer {
    /// Create a version from its components.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemVer {
    type Err = KindlingError;

    /// Parse "1.2.3", "1.2", "1", or any of those with a leading 'v'.
    ///
    /// Trailing non-numeric suffixes on the last component ("268.0-rc1")
    /// are rejected rather than silently truncated.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_start_matches('v');
        if trimmed.is_empty() {
            return Err(KindlingError::VersionParse { input: s.into() });
        }

        let mut components = [0u32; 3];
        for (i, part) in trimmed.splitn(3, '.').enumerate() {
            components[i] = part
                .parse()
                .map_err(|_| KindlingError::VersionParse { input: s.into() })?;
        }

        Ok(Self {
            major: components[0],
            minor: components[1],
            patch: components[2],
        })
    }
}

/// Extract the first version-looking token from command output.
///
/// Probes run tools with a version-reporting flag and scan whatever comes
/// back ("cmake version 3.27.9", "v1.3.268", ...). Two-component matches
/// are accepted since several tools omit the patch number.
pub fn extract_version(output: &str) -> Option<SemVer> {
    let patterns = [r"(\d+\.\d+\.\d+)", r"version\s+(\d+\.\d+)", r"v?(\d+\.\d+)"];

    for pattern in &patterns {
        if let Ok(re) = regex::Regex::new(pattern) {
            if let Some(caps) = re.captures(output) {
                if let Some(m) = caps.get(1) {
                    if let Ok(version) = m.as_str().parse() {
                        return Some(version);
                    }
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_components() {
        let v: SemVer = "3.27.9".parse().unwrap();
        assert_eq!(v, SemVer::new(3, 27, 9));
    }

    #[test]
    fn parses_two_components_with_zero_patch() {
        let v: SemVer = "3.20".parse().unwrap();
        assert_eq!(v, SemVer::new(3, 20, 0));
    }

    #[test]
    fn parses_single_component() {
        let v: SemVer = "14".parse().unwrap();
        assert_eq!(v, SemVer::new(14, 0, 0));
    }

    #[test]
    fn parses_leading_v() {
        let v: SemVer = "v1.3.268".parse().unwrap();
        assert_eq!(v, SemVer::new(1, 3, 268));
    }

    #[test]
    fn rejects_garbage() {
        assert!("not-a-version".parse::<SemVer>().is_err());
        assert!("".parse::<SemVer>().is_err());
        assert!("1.2.x".parse::<SemVer>().is_err());
    }

    #[test]
    fn compares_components_numerically() {
        // "3.9.0" < "3.10.0"; lexicographic string comparison gets this wrong
        let old: SemVer = "3.9.0".parse().unwrap();
        let new: SemVer = "3.10.0".parse().unwrap();
        assert!(new > old);
    }

    #[test]
    fn compares_multi_digit_majors() {
        let nine: SemVer = "9.99.99".parse().unwrap();
        let ten: SemVer = "10.0.0".parse().unwrap();
        assert!(ten > nine);
    }

    #[test]
    fn equal_versions_compare_equal() {
        let a: SemVer = "1.2.3".parse().unwrap();
        let b: SemVer = "1.2.3".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn two_component_equals_explicit_zero_patch() {
        let short: SemVer = "3.20".parse().unwrap();
        let long: SemVer = "3.20.0".parse().unwrap();
        assert_eq!(short, long);
    }

    #[test]
    fn display_round_trips() {
        let v = SemVer::new(3, 27, 9);
        assert_eq!(v.to_string(), "3.27.9");
        assert_eq!(v.to_string().parse::<SemVer>().unwrap(), v);
    }

    #[test]
    fn extracts_from_cmake_style_output() {
        let output = "cmake version 3.27.9\n\nCMake suite maintained by Kitware";
        assert_eq!(extract_version(output), Some(SemVer::new(3, 27, 9)));
    }

    #[test]
    fn extracts_from_v_prefixed_output() {
        assert_eq!(extract_version("v1.3.268"), Some(SemVer::new(1, 3, 268)));
    }

    #[test]
    fn extracts_two_component_version() {
        assert_eq!(
            extract_version("tool version 2.4"),
            Some(SemVer::new(2, 4, 0))
        );
    }

    #[test]
    fn extracts_nothing_from_unversioned_output() {
        assert_eq!(extract_version("usage: tool [options]"), None);
    }

    #[test]
    fn extraction_takes_first_match() {
        let output = "frontend 1.2.3 (backend 9.9.9)";
        assert_eq!(extract_version(output), Some(SemVer::new(1, 2, 3)));
    }
}
