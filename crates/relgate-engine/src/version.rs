//! RPM package version ordering.
//!
//! Versions are compared segment by segment: runs of digits numerically,
//! runs of letters lexically, with `~` sorting before anything (pre-release)
//! and `^` sorting after the base version but before any further segment.

use relgate_model::Evr;
use std::cmp::Ordering;

use crate::collaborators::VersionComparator;

/// The ordering the build system itself applies to epoch-version-release.
#[derive(Debug, Clone, Copy, Default)]
pub struct RpmVersionComparator;

impl VersionComparator for RpmVersionComparator {
    fn compare(&self, left: &Evr, right: &Evr) -> Ordering {
        label_compare(left, right)
    }
}

/// Compare two epoch-version-release triples. A missing epoch is zero.
pub fn label_compare(left: &Evr, right: &Evr) -> Ordering {
    left.epoch_or_zero()
        .cmp(&right.epoch_or_zero())
        .then_with(|| rpmvercmp(&left.version, &right.version))
        .then_with(|| rpmvercmp(&left.release, &right.release))
}

/// Compare two version (or release) strings.
pub fn rpmvercmp(left: &str, right: &str) -> Ordering {
    if left == right {
        return Ordering::Equal;
    }

    let mut one = left.as_bytes();
    let mut two = right.as_bytes();

    while !one.is_empty() || !two.is_empty() {
        one = skip_separators(one);
        two = skip_separators(two);

        if one.first() == Some(&b'~') || two.first() == Some(&b'~') {
            if one.first() != Some(&b'~') {
                return Ordering::Greater;
            }
            if two.first() != Some(&b'~') {
                return Ordering::Less;
            }
            one = &one[1..];
            two = &two[1..];
            continue;
        }

        if one.first() == Some(&b'^') || two.first() == Some(&b'^') {
            if one.is_empty() {
                return Ordering::Less;
            }
            if two.is_empty() {
                return Ordering::Greater;
            }
            if one[0] != b'^' {
                return Ordering::Greater;
            }
            if two[0] != b'^' {
                return Ordering::Less;
            }
            one = &one[1..];
            two = &two[1..];
            continue;
        }

        if one.is_empty() || two.is_empty() {
            break;
        }

        let numeric = one[0].is_ascii_digit();
        let (seg_one, rest_one) = take_segment(one, numeric);
        let (seg_two, rest_two) = take_segment(two, numeric);

        // Segment kinds differ: a numeric segment is newer than an alpha one.
        if seg_two.is_empty() {
            return if numeric {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        let ordering = if numeric {
            compare_numeric(seg_one, seg_two)
        } else {
            seg_one.cmp(seg_two)
        };
        if ordering != Ordering::Equal {
            return ordering;
        }

        one = rest_one;
        two = rest_two;
    }

    match (one.is_empty(), two.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        _ => Ordering::Greater,
    }
}

fn skip_separators(input: &[u8]) -> &[u8] {
    let skip = input
        .iter()
        .take_while(|c| !c.is_ascii_alphanumeric() && **c != b'~' && **c != b'^')
        .count();
    &input[skip..]
}

fn take_segment(input: &[u8], numeric: bool) -> (&[u8], &[u8]) {
    let len = input
        .iter()
        .take_while(|c| {
            if numeric {
                c.is_ascii_digit()
            } else {
                c.is_ascii_alphabetic()
            }
        })
        .count();
    input.split_at(len)
}

fn compare_numeric(one: &[u8], two: &[u8]) -> Ordering {
    let one = strip_leading_zeros(one);
    let two = strip_leading_zeros(two);
    one.len().cmp(&two.len()).then_with(|| one.cmp(two))
}

fn strip_leading_zeros(input: &[u8]) -> &[u8] {
    let zeros = input.iter().take_while(|c| **c == b'0').count();
    &input[zeros..]
}
