use super::*;
use crate::matrix::{checked_dot, IntMatrix, SublatticeTransform};
use crate::rand_cone::{draw_cone_matrix, RandConeCfg};
use proptest::prelude::*;

fn computed(rows: Vec<Vec<i64>>, cols: usize) -> DualCone {
    let normals = IntMatrix::from_rows(rows, cols).unwrap();
    let mut cone = DualCone::from_inequalities(normals).unwrap();
    cone.compute().unwrap();
    cone
}

fn basis_rows(cone: &DualCone) -> Vec<Vec<i64>> {
    cone.hilbert_basis().to_rows()
}

/// No basis element may be the sum of two others (a cheap necessary
/// condition for minimality).
fn assert_no_pairwise_sums(rows: &[Vec<i64>]) {
    for (i, x) in rows.iter().enumerate() {
        for (j, a) in rows.iter().enumerate() {
            for (k, b) in rows.iter().enumerate() {
                if i == j || i == k {
                    continue;
                }
                let sum: Vec<i64> = a.iter().zip(b).map(|(p, q)| p + q).collect();
                assert_ne!(x, &sum, "basis element {x:?} splits as {a:?} + {b:?}");
            }
        }
    }
}

#[test]
fn quadrant_cone_basis_and_extreme_rays() {
    let cone = computed(vec![vec![1, 0], vec![0, 1]], 2);
    assert_eq!(basis_rows(&cone), vec![vec![0, 1], vec![1, 0]]);
    assert_eq!(cone.extreme_ray_flags(), &[true, true]);
    assert_eq!(
        cone.support_hyperplanes().to_rows(),
        vec![vec![1, 0], vec![0, 1]]
    );
}

#[test]
fn nonsmooth_cone_keeps_interior_generator() {
    // Dual of the cone generated by (1,0) and (1,2): the reduction engine
    // must discard dominated sums but keep the genuinely new (1,1).
    let cone = computed(vec![vec![2, -1], vec![0, 1]], 2);
    assert_eq!(
        basis_rows(&cone),
        vec![vec![1, 0], vec![1, 1], vec![1, 2]]
    );
    assert_eq!(cone.extreme_ray_flags(), &[true, false, true]);
}

#[test]
fn rerun_reproduces_identical_basis() {
    let rows = vec![vec![2, -1], vec![0, 1]];
    let first = computed(rows.clone(), 2);
    let second = computed(rows, 2);
    assert_eq!(first.hilbert_basis(), second.hilbert_basis());
    assert_eq!(first.extreme_ray_flags(), second.extreme_ray_flags());
    assert_eq!(first.support_hyperplanes(), second.support_hyperplanes());
}

#[test]
fn unimodular_simplicial_cone_basis_equals_extreme_rays() {
    let cone = computed(vec![vec![1, 0, 0], vec![0, 1, 0], vec![0, 0, 1]], 3);
    assert_eq!(
        basis_rows(&cone),
        vec![vec![0, 0, 1], vec![0, 1, 0], vec![1, 0, 0]]
    );
    assert!(cone.extreme_ray_flags().iter().all(|&e| e));
}

#[test]
fn non_unimodular_simplicial_cone_gains_interior_points() {
    // x >= 0, y >= 0, 2z >= x + y: simplicial but not unimodular, so the
    // basis strictly contains the three extreme rays.
    let cone = computed(vec![vec![1, 0, 0], vec![0, 1, 0], vec![-1, -1, 2]], 3);
    assert_eq!(
        basis_rows(&cone),
        vec![
            vec![0, 0, 1],
            vec![0, 1, 1],
            vec![0, 2, 1],
            vec![1, 0, 1],
            vec![1, 1, 1],
            vec![2, 0, 1],
        ]
    );
    assert_eq!(
        cone.extreme_ray_flags(),
        &[true, false, true, false, false, true]
    );
    assert_eq!(cone.support_hyperplanes().nr_rows(), 3);
}

#[test]
fn rank_deficient_input_fails_construction() {
    let normals = IntMatrix::from_rows(vec![vec![1, 1, 0], vec![2, 2, 0], vec![0, 0, 1]], 3)
        .unwrap();
    let err = DualCone::from_inequalities(normals).unwrap_err();
    assert_eq!(err, DualError::NotPointed { dim: 3, rank: 2 });
}

#[test]
fn redundant_and_duplicate_halfspaces_are_trimmed() {
    // (2,0) is a scaled duplicate of (1,0); (1,1) never supports a facet.
    let cone = computed(vec![vec![1, 0], vec![2, 0], vec![0, 1], vec![1, 1]], 2);
    assert_eq!(basis_rows(&cone), vec![vec![0, 1], vec![1, 0]]);
    assert_eq!(
        cone.support_hyperplanes().to_rows(),
        vec![vec![1, 0], vec![0, 1]]
    );
}

#[test]
fn recorded_values_match_exact_evaluation() {
    let cone = computed(vec![vec![1, 0, 0], vec![0, 1, 0], vec![-1, -1, 2]], 3);
    let halfspaces = cone.raw_halfspaces().clone();
    for c in cone.basis_candidates() {
        for (i, h) in halfspaces.rows_iter().enumerate() {
            assert_eq!(
                c.values[i],
                checked_dot(h, &c.coords).unwrap(),
                "stale value slot {i} on {:?}",
                c.coords
            );
        }
    }
}

#[test]
fn basis_minimality_spot_check() {
    let cone = computed(vec![vec![1, 0, 0], vec![0, 1, 0], vec![-1, -1, 2]], 3);
    assert_no_pairwise_sums(&basis_rows(&cone));
    let cone = computed(vec![vec![2, -1], vec![0, 1]], 2);
    assert_no_pairwise_sums(&basis_rows(&cone));
}

#[test]
fn truncation_returns_degree_one_elements() {
    let normals = IntMatrix::from_rows(vec![vec![2, -1], vec![0, 1]], 2).unwrap();
    let cfg = DualCfg {
        truncation: Some(vec![1, 0]),
        ..DualCfg::default()
    };
    let mut cone = DualCone::with_cfg(normals.clone(), cfg).unwrap();
    cone.compute().unwrap();
    // Under the grading (1,0) every basis element already has degree one.
    assert_eq!(
        basis_rows(&cone),
        vec![vec![1, 0], vec![1, 1], vec![1, 2]]
    );

    let cfg = DualCfg {
        truncation: Some(vec![1, 1]),
        ..DualCfg::default()
    };
    let mut cone = DualCone::with_cfg(normals, cfg).unwrap();
    cone.compute().unwrap();
    assert_eq!(basis_rows(&cone), vec![vec![1, 0]]);
}

#[test]
fn compute_is_one_shot_and_phases_are_terminal() {
    let normals = IntMatrix::from_rows(vec![vec![1, 0], vec![0, 1]], 2).unwrap();
    let mut cone = DualCone::from_inequalities(normals).unwrap();
    assert_eq!(cone.phase(), Phase::Constructed);
    cone.compute().unwrap();
    assert_eq!(cone.phase(), Phase::Done);
    assert_eq!(cone.compute().unwrap_err(), DualError::AlreadyRun);

    // A blown candidate cap is a terminal failure.
    let normals =
        IntMatrix::from_rows(vec![vec![1, 0, 0], vec![0, 1, 0], vec![-1, -1, 2]], 3).unwrap();
    let cfg = DualCfg {
        max_candidates: 2,
        ..DualCfg::default()
    };
    let mut cone = DualCone::with_cfg(normals, cfg).unwrap();
    assert_eq!(
        cone.compute().unwrap_err(),
        DualError::CandidateLimit { limit: 2 }
    );
    assert_eq!(cone.phase(), Phase::Failed);
}

#[test]
fn grading_length_is_validated() {
    let normals = IntMatrix::from_rows(vec![vec![1, 0], vec![0, 1]], 2).unwrap();
    let cfg = DualCfg {
        truncation: Some(vec![1, 1, 1]),
        ..DualCfg::default()
    };
    assert_eq!(
        DualCone::with_cfg(normals, cfg).unwrap_err(),
        DualError::GradingLength {
            expected: 2,
            found: 3
        }
    );
}

#[test]
fn to_sublattice_rewrites_points_and_hyperplanes() {
    let mut cone = computed(vec![vec![1, 0], vec![0, 1]], 2);
    // Unimodular change of basis x' = U x with U = [[1,1],[0,1]]; functionals
    // move through (U^{-1})^T so all pairings are preserved.
    let t = SublatticeTransform {
        point_map: IntMatrix::from_rows(vec![vec![1, 1], vec![0, 1]], 2).unwrap(),
        point_denom: 1,
        dual_map: IntMatrix::from_rows(vec![vec![1, 0], vec![-1, 1]], 2).unwrap(),
    };
    cone.to_sublattice(&t).unwrap();
    assert_eq!(basis_rows(&cone), vec![vec![1, 1], vec![1, 0]]);
    assert_eq!(
        cone.support_hyperplanes().to_rows(),
        vec![vec![1, -1], vec![0, 1]]
    );
    // The rewrite preserves pairings: (1,-1)·(1,1) = 0 and (0,1)·(1,0) = 0,
    // exactly the incidences the untransformed cone had.
    assert_eq!(checked_dot(&[1, -1], &[1, 1]).unwrap(), 0);
    assert_eq!(checked_dot(&[0, 1], &[1, 0]).unwrap(), 0);

    let mut unfinished =
        DualCone::from_inequalities(IntMatrix::from_rows(vec![vec![1, 0], vec![0, 1]], 2).unwrap())
            .unwrap();
    assert_eq!(
        unfinished.to_sublattice(&t).unwrap_err(),
        DualError::NothingComputed
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Every basis element lies in the cone, bookkeeping matches exact
    /// evaluation, and reruns are deterministic.
    #[test]
    fn random_cones_produce_consistent_bases(
        seed in 0u64..512,
        dim in 2usize..4,
        extra_rows in 0usize..4,
        bound in 1i64..5,
    ) {
        let cfg = RandConeCfg { dim, extra_rows, bound };
        let normals = draw_cone_matrix(&cfg, seed);
        let mut cone = DualCone::from_inequalities(normals.clone()).unwrap();
        cone.compute().unwrap();
        for x in basis_rows(&cone) {
            for h in normals.rows_iter() {
                prop_assert!(checked_dot(h, &x).unwrap() >= 0);
            }
        }
        let halfspaces = cone.raw_halfspaces().clone();
        for c in cone.basis_candidates() {
            for (i, h) in halfspaces.rows_iter().enumerate() {
                prop_assert_eq!(c.values[i], checked_dot(h, &c.coords).unwrap());
            }
        }
        let mut again = DualCone::from_inequalities(normals).unwrap();
        again.compute().unwrap();
        prop_assert_eq!(cone.hilbert_basis(), again.hilbert_basis());
        prop_assert_eq!(cone.extreme_ray_flags(), again.extreme_ray_flags());
    }
}
