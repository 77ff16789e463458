//! Domination tests and irredundant-list maintenance.
//!
//! The single primitive is `dominates`: entrywise no larger on the processed
//! window, sign-consistent at the halfspace currently being applied, and
//! strictly smaller total degree. The strict-degree side of the rule is the
//! directional asymmetry that rules out mutual domination and makes the
//! outcome independent of processing order.

use super::types::Candidate;

/// True when `r` may replace `c` as a generator during cut `cut`.
///
/// A zero current value makes `r` compatible with every bucket, which is how
/// neutral vectors act as the only cross-bucket reducers; for them the
/// "window excluding the current halfspace" coincides with the full window.
#[inline]
pub(crate) fn dominates(r: &Candidate, c: &Candidate, cut: usize) -> bool {
    if r.degree >= c.degree {
        return false;
    }
    let rv = r.values[cut];
    let cv = c.values[cut];
    if rv != 0 && (rv.signum() != cv.signum() || rv.abs() > cv.abs()) {
        return false;
    }
    r.values[..cut]
        .iter()
        .zip(&c.values[..cut])
        .all(|(a, b)| a <= b)
}

/// Domination or exact coordinate duplication. Duplicates of surviving
/// vectors must never re-enter a bucket: they would come back with a fresh
/// generation and re-fire the same combinations every round.
#[inline]
pub(crate) fn covers(r: &Candidate, c: &Candidate, cut: usize) -> bool {
    r.coords == c.coords || dominates(r, c, cut)
}

pub(crate) fn covered_by_any(list: &[Candidate], c: &Candidate, cut: usize) -> bool {
    list.iter().any(|r| covers(r, c, cut))
}

/// Sort, dedup and reduce a freshly generated batch to an irredundant list.
///
/// After the sort only earlier entries can dominate later ones (domination
/// needs strictly smaller degree), so one forward pass is complete. A
/// successful dominator is swapped to the front of the scan list: the same
/// generators tend to kill many consecutive candidates.
pub(crate) fn auto_reduce(batch: &mut Vec<Candidate>, cut: usize) {
    if batch.len() < 2 {
        return;
    }
    batch.sort_unstable_by(Candidate::cmp_for_reduction);
    batch.dedup_by(|a, b| a.coords == b.coords);
    let mut kept: Vec<Candidate> = Vec::with_capacity(batch.len());
    'next: for cand in batch.drain(..) {
        for i in 0..kept.len() {
            if dominates(&kept[i], &cand, cut) {
                kept.swap(0, i);
                continue 'next;
            }
        }
        kept.push(cand);
    }
    *batch = kept;
}

/// Drop members of `bucket` dominated by any member of `batch`.
pub(crate) fn filter_dominated(bucket: &mut Vec<Candidate>, batch: &[Candidate], cut: usize) {
    if bucket.is_empty() || batch.is_empty() {
        return;
    }
    bucket.retain(|c| !batch.iter().any(|r| dominates(r, c, cut)));
}
