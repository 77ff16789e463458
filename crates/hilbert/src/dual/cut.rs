//! Halfspace-intersection engine: one cut of the running candidate set.
//!
//! Purpose
//! - Classify the current candidates against one new halfspace and generate
//!   the candidate set of the intersection, keeping every bucket reduced.
//!
//! Why this design
//! - The pairwise positive×negative loop is data-parallel over the positive
//!   bucket; every worker accumulates into a private batch and a
//!   single-threaded splice merges the batches afterwards, so the hot loop
//!   touches no shared mutable state.
//! - Overflow inside the pool is recorded in a flag and raised once after
//!   the region ends; worker tasks never panic across the pool boundary.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering::Relaxed};

use rayon::prelude::*;
use tracing::{debug, trace};

use super::reduce::{auto_reduce, covered_by_any, filter_dominated};
use super::types::{Candidate, CutPolicy};
use crate::error::DualError;
use crate::matrix::{checked_add_rows, checked_dot};

/// Private per-worker output of one combination round.
#[derive(Default)]
struct RoundBatch {
    positive: Vec<Candidate>,
    negative: Vec<Candidate>,
    neutral: Vec<Candidate>,
}

impl RoundBatch {
    fn absorb(&mut self, mut other: RoundBatch) {
        self.positive.append(&mut other.positive);
        self.negative.append(&mut other.negative);
        self.neutral.append(&mut other.neutral);
    }
}

/// Diagnostic counters; atomically updated, never read for correctness.
#[derive(Default)]
struct CutStats {
    pairs: AtomicU64,
    kept: AtomicU64,
    dominated: AtomicU64,
}

/// Apply halfspace `cut` to `candidates` and return the candidate set of the
/// intersection. `injected` carries the ± generator pair from the lifting
/// step when the processed halfspaces still span a line.
pub(crate) fn apply_halfspace(
    candidates: Vec<Candidate>,
    halfspace: &[i64],
    cut: usize,
    injected: Option<(Candidate, Candidate)>,
    grading: Option<&[i64]>,
    max_candidates: usize,
) -> Result<Vec<Candidate>, DualError> {
    let mut positive: Vec<Candidate> = Vec::new();
    let mut negative: Vec<Candidate> = Vec::new();
    let mut neutral: Vec<Candidate> = Vec::new();

    for mut c in candidates {
        let v = checked_dot(halfspace, &c.coords)?;
        c.values[cut] = v;
        let av = v.checked_abs().ok_or(DualError::Overflow {
            stage: "degree update",
        })?;
        c.degree = c.degree.checked_add(av).ok_or(DualError::Overflow {
            stage: "degree update",
        })?;
        c.generation = 1;
        c.parent_value = 0;
        match v.signum() {
            1 => positive.push(c),
            -1 => negative.push(c),
            _ => neutral.push(c),
        }
    }
    if let Some((plus, minus)) = injected {
        positive.push(plus);
        negative.push(minus);
    }

    // Re-establish the reduced-bucket invariant under the widened value
    // window: the new slot can expose dominations between old candidates
    // whose value slices agreed on every halfspace processed before.
    // auto_reduce also leaves each bucket sorted by ascending degree, which
    // puts likely dominators at the front of every scan.
    rayon::join(
        || auto_reduce(&mut positive, cut),
        || {
            rayon::join(
                || auto_reduce(&mut negative, cut),
                || auto_reduce(&mut neutral, cut),
            )
        },
    );
    filter_dominated(&mut positive, &neutral, cut);
    filter_dominated(&mut negative, &neutral, cut);

    let policy = cut_policy(grading, &positive, &negative)?;
    if let Some(g) = grading {
        if policy.truncate && policy.no_degree_one_positives {
            let mut kept = Vec::with_capacity(negative.len());
            for c in negative.drain(..) {
                if checked_dot(g, &c.coords)? == 0 {
                    kept.push(c);
                }
            }
            negative = kept;
        }
    }

    let stats = CutStats::default();
    let mut rounds = 0usize;
    loop {
        rounds += 1;
        let overflow = AtomicBool::new(false);
        let parts: Vec<RoundBatch> = positive
            .par_iter()
            .fold(RoundBatch::default, |mut acc, p| {
                if overflow.load(Relaxed) {
                    return acc;
                }
                let mut pairs = 0u64;
                let mut kept = 0u64;
                let mut dominated = 0u64;
                let pv = p.values[cut] as i128;
                for n in &negative {
                    // Only genuinely new material may recombine.
                    if p.generation == 0 && n.generation == 0 {
                        continue;
                    }
                    // Parent-value pre-tests: in either case the sum is
                    // reachable through an already-generated decomposition.
                    let nv = n.values[cut] as i128;
                    if p.parent_value != 0 && -nv >= p.parent_value as i128 {
                        continue;
                    }
                    if n.parent_value != 0 && pv >= n.parent_value as i128 {
                        continue;
                    }
                    pairs += 1;
                    let sum = match combine(p, n, cut) {
                        Ok(Some(sum)) => sum,
                        Ok(None) => continue,
                        Err(_) => {
                            overflow.store(true, Relaxed);
                            break;
                        }
                    };
                    let keep = match sum.values[cut].signum() {
                        1 => {
                            !covered_by_any(&positive, &sum, cut)
                                && !covered_by_any(&neutral, &sum, cut)
                        }
                        -1 => {
                            !covered_by_any(&negative, &sum, cut)
                                && !covered_by_any(&neutral, &sum, cut)
                        }
                        _ => !covered_by_any(&neutral, &sum, cut),
                    };
                    if !keep {
                        dominated += 1;
                        continue;
                    }
                    kept += 1;
                    match sum.values[cut].signum() {
                        1 => acc.positive.push(sum),
                        -1 => acc.negative.push(sum),
                        _ => acc.neutral.push(sum),
                    }
                }
                stats.pairs.fetch_add(pairs, Relaxed);
                stats.kept.fetch_add(kept, Relaxed);
                stats.dominated.fetch_add(dominated, Relaxed);
                acc
            })
            .collect();
        if overflow.load(Relaxed) {
            return Err(DualError::Overflow {
                stage: "candidate combination",
            });
        }

        // Single-threaded splice of the private batches.
        let mut fresh = RoundBatch::default();
        for part in parts {
            fresh.absorb(part);
        }
        let produced_signed = !(fresh.positive.is_empty() && fresh.negative.is_empty());
        trace!(
            cut,
            rounds,
            fresh_positive = fresh.positive.len(),
            fresh_negative = fresh.negative.len(),
            fresh_neutral = fresh.neutral.len(),
            "combination round"
        );

        // Auto-reduce the three batches independently.
        rayon::join(
            || auto_reduce(&mut fresh.positive, cut),
            || {
                rayon::join(
                    || auto_reduce(&mut fresh.negative, cut),
                    || auto_reduce(&mut fresh.neutral, cut),
                )
            },
        );
        // Fresh neutrals may still kill fresh signed vectors, and they sweep
        // the existing buckets on merge.
        filter_dominated(&mut fresh.positive, &fresh.neutral, cut);
        filter_dominated(&mut fresh.negative, &fresh.neutral, cut);
        filter_dominated(&mut positive, &fresh.positive, cut);
        filter_dominated(&mut positive, &fresh.neutral, cut);
        filter_dominated(&mut negative, &fresh.negative, cut);
        filter_dominated(&mut negative, &fresh.neutral, cut);
        filter_dominated(&mut neutral, &fresh.neutral, cut);
        positive.append(&mut fresh.positive);
        negative.append(&mut fresh.negative);
        neutral.append(&mut fresh.neutral);

        // Age out: merged vectors join the next round at generation 1,
        // everything older bottoms out at 0.
        for c in positive
            .iter_mut()
            .chain(negative.iter_mut())
            .chain(neutral.iter_mut())
        {
            c.generation = c.generation.saturating_sub(1);
        }

        let total = positive.len() + negative.len() + neutral.len();
        if total > max_candidates {
            return Err(DualError::CandidateLimit {
                limit: max_candidates,
            });
        }
        if !produced_signed {
            break;
        }
    }

    let mut survivors = positive;
    survivors.append(&mut neutral);
    for c in &mut survivors {
        c.generation = 0;
        c.parent_value = 0;
    }
    survivors.sort_unstable_by(Candidate::cmp_for_reduction);
    survivors.dedup_by(|a, b| a.coords == b.coords);
    debug!(
        cut,
        rounds,
        survivors = survivors.len(),
        pairs = stats.pairs.load(Relaxed),
        kept = stats.kept.load(Relaxed),
        dominated = stats.dominated.load(Relaxed),
        "halfspace applied"
    );
    Ok(survivors)
}

/// Discarding graded negatives is sound only while every positive sits at
/// grading value >= 1 and every negative at >= 0: sums then only move the
/// grading up, so once no positive has value one, no degree-one element can
/// arise through a negative with nonzero value. Outside that regime the
/// policy stays inert.
fn cut_policy(
    grading: Option<&[i64]>,
    positive: &[Candidate],
    negative: &[Candidate],
) -> Result<CutPolicy, DualError> {
    let Some(g) = grading else {
        return Ok(CutPolicy::default());
    };
    let mut has_degree_one = false;
    let mut monotone = true;
    for c in positive {
        let level = checked_dot(g, &c.coords)?;
        has_degree_one |= level == 1;
        monotone &= level >= 1;
    }
    for c in negative {
        monotone &= checked_dot(g, &c.coords)? >= 0;
    }
    Ok(CutPolicy {
        truncate: true,
        no_degree_one_positives: monotone && !has_degree_one,
    })
}

/// Form `p + n` with full bookkeeping; `Ok(None)` for the zero vector
/// (the injected ± pair sums to it).
fn combine(p: &Candidate, n: &Candidate, cut: usize) -> Result<Option<Candidate>, DualError> {
    let Some(coords) = checked_add_rows(&p.coords, &n.coords)? else {
        return Ok(None);
    };
    let overflow = DualError::Overflow {
        stage: "candidate combination",
    };
    let mut values = vec![0i64; p.values.len()];
    for i in 0..=cut {
        values[i] = p.values[i]
            .checked_add(n.values[i])
            .ok_or_else(|| overflow.clone())?;
    }
    let vp = p.values[cut];
    let vn = n.values[cut];
    debug_assert!(vp > 0 && vn < 0);
    // |vp + vn| = |vp| + |vn| − 2·min(vp, −vn): the degree stays the exact
    // sum of absolute values over the processed window.
    let cancel = vp.min(vn.checked_neg().ok_or_else(|| overflow.clone())?);
    let degree = p
        .degree
        .checked_add(n.degree)
        .and_then(|d| cancel.checked_mul(2).and_then(|c2| d.checked_sub(c2)))
        .ok_or(overflow)?;
    Ok(Some(Candidate {
        degree,
        values,
        generation: 2,
        // The positive parent's value is the larger of the two.
        parent_value: vp,
        coords,
    }))
}
