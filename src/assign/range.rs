//! Compressed CPU range lists
//!
//! Collapses CPU indices into the `0-3,8-11` notation used by the kernel's
//! `cpulist` files, and expands it back.

use crate::error::{HostCpuError, Result};

/// Largest number of CPUs a single `a-b` part may expand to
pub const MAX_RANGE_SPAN: u32 = 65_536;

/// Compress CPU indices into a range list (e.g. `[0,1,2,4]` -> `"0-2,4"`)
///
/// Input order and duplicates do not matter. An empty input gives an
/// empty string.
pub fn compress_range(indices: &[u32]) -> String {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut runs: Vec<(u32, u32)> = Vec::new();
    for n in sorted {
        match runs.last_mut() {
            Some((_, end)) if n == *end + 1 => *end = n,
            _ => runs.push((n, n)),
        }
    }

    runs.iter()
        .map(|&(start, end)| {
            if start == end {
                start.to_string()
            } else {
                format!("{}-{}", start, end)
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Expand a range list (e.g. `"0-3,8"` -> `[0,1,2,3,8]`)
///
/// Whitespace around parts is ignored and an empty string yields no CPUs.
pub fn expand_range(s: &str) -> Result<Vec<u32>> {
    let mut cpus = Vec::new();

    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((start, end)) = part.split_once('-') {
            let start = parse_index(s, start)?;
            let end = parse_index(s, end)?;
            if start > end {
                return Err(HostCpuError::range(s, format!("descending range '{}'", part)));
            }
            if end - start >= MAX_RANGE_SPAN {
                return Err(HostCpuError::range(
                    s,
                    format!("range '{}' spans more than {} CPUs", part, MAX_RANGE_SPAN),
                ));
            }
            cpus.extend(start..=end);
        } else {
            cpus.push(parse_index(s, part)?);
        }
    }

    Ok(cpus)
}

fn parse_index(input: &str, part: &str) -> Result<u32> {
    part.trim()
        .parse::<u32>()
        .map_err(|_| HostCpuError::range(input, format!("'{}' is not a CPU index", part.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_compress_range() {
        assert_eq!(compress_range(&[]), "");
        assert_eq!(compress_range(&[3]), "3");
        assert_eq!(compress_range(&[5]), "5");
        assert_eq!(compress_range(&[0, 1, 2, 4]), "0-2,4");
        assert_eq!(compress_range(&[0, 1, 2, 4, 5]), "0-2,4-5");
        assert_eq!(compress_range(&[1, 2, 3, 7, 8, 10]), "1-3,7-8,10");
    }

    #[test]
    fn test_compress_range_unsorted_and_duplicates() {
        assert_eq!(compress_range(&[10, 8, 7, 3, 2, 1]), "1-3,7-8,10");
        assert_eq!(compress_range(&[2, 2, 3, 3]), "2-3");
    }

    #[test]
    fn test_compress_range_large_indices() {
        assert_eq!(compress_range(&[998, 999, 1000]), "998-1000");
        assert_eq!(compress_range(&[u32::MAX - 1, u32::MAX]), format!("{}-{}", u32::MAX - 1, u32::MAX));
    }

    #[test]
    fn test_expand_range() {
        assert_eq!(expand_range("0-3").unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(expand_range("0,2,4").unwrap(), vec![0, 2, 4]);
        assert_eq!(expand_range("0-2,4-6").unwrap(), vec![0, 1, 2, 4, 5, 6]);
        assert_eq!(expand_range(" 7 ").unwrap(), vec![7]);
        assert!(expand_range("").unwrap().is_empty());
    }

    #[test]
    fn test_expand_range_errors() {
        assert!(matches!(expand_range("a"), Err(HostCpuError::InvalidRange { .. })));
        assert!(expand_range("3-1").is_err());
        assert!(expand_range("1-").is_err());
    }

    #[test]
    fn test_expand_range_span_limit() {
        let err = expand_range("0-4294967295").unwrap_err();
        assert!(err.to_string().contains("spans more than"));

        let widest = format!("0-{}", MAX_RANGE_SPAN - 1);
        assert_eq!(expand_range(&widest).unwrap().len(), MAX_RANGE_SPAN as usize);
        assert!(expand_range(&format!("0-{}", MAX_RANGE_SPAN)).is_err());
    }

    proptest! {
        #[test]
        fn compress_is_order_independent(
            (indices, shuffled) in proptest::collection::vec(0u32..256, 0..64)
                .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
        ) {
            let forward = compress_range(&indices);
            let mut reversed = indices.clone();
            reversed.reverse();
            prop_assert_eq!(&forward, &compress_range(&reversed));
            prop_assert_eq!(&forward, &compress_range(&shuffled));
        }
    }
}
