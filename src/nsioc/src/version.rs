use std::cmp::Ordering;

/// The version assumed for objects and tags that don't declare one.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Compares two dotted numeric versions.
///
/// A leading `v` is ignored and missing trailing segments count as `0`, so
/// `"1.0"` equals `"v1.0.0"`. Each segment is read up to its first
/// non-digit character: `"2-beta"` is read as `2`, a segment without any
/// leading digit is read as `0`, and oversized numbers saturate. The
/// comparison never panics on malformed input.
///
/// # Examples
///
/// ```rust
/// # use std::cmp::Ordering;
/// # use nsioc::version::compare_version;
/// assert_eq!(compare_version("1.2.0", "1.10"), Ordering::Less);
/// assert_eq!(compare_version("v2", "2.0.0"), Ordering::Equal);
/// assert_eq!(compare_version("1.0.1", "1.0"), Ordering::Greater);
/// ```
pub fn compare_version(a: &str, b: &str) -> Ordering {
    let a = segments(a);
    let b = segments(b);
    let len = a.len().max(b.len());

    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn segments(version: &str) -> Vec<u64> {
    let version = version.trim();
    let version = version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('V'))
        .unwrap_or(version);

    if version.is_empty() {
        return Vec::new();
    }

    version.split('.').map(parse_segment).collect()
}

fn parse_segment(segment: &str) -> u64 {
    segment
        .trim()
        .chars()
        .map_while(|c| c.to_digit(10))
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u64::from(digit))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_version_orders_numeric_segments() {
        assert_eq!(compare_version("1.0.0", "2.0.0"), Ordering::Less);
        assert_eq!(compare_version("1.10.0", "1.9.9"), Ordering::Greater);
        assert_eq!(compare_version("0.0.1", "0.0.1"), Ordering::Equal);
    }

    #[test]
    fn compare_version_pads_missing_segments_with_zero() {
        assert_eq!(compare_version("1.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_version("1", "1.0.1"), Ordering::Less);
        assert_eq!(compare_version("", "0.0"), Ordering::Equal);
    }

    #[test]
    fn compare_version_ignores_leading_v() {
        assert_eq!(compare_version("v2", "2.0.0"), Ordering::Equal);
        assert_eq!(compare_version("V1.2", "v1.3"), Ordering::Less);
    }

    #[test]
    fn compare_version_tolerates_malformed_segments() {
        assert_eq!(compare_version("1.x.3", "1.0.3"), Ordering::Equal);
        assert_eq!(compare_version("2-beta", "2.0"), Ordering::Equal);
        assert_eq!(compare_version("1..2", "1.0.2"), Ordering::Equal);
        assert_eq!(
            compare_version("99999999999999999999999", "1"),
            Ordering::Greater
        );
    }
}
