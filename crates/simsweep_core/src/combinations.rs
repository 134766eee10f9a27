//! Combination generation: Cartesian expansion of a parameter space.

use rand::seq::SliceRandom;

use crate::space::{ParamValue, ParameterSpace};

/// One point of the expanded sweep: a value per axis plus its run counter.
///
/// `index` is the point's row-major position within the full Cartesian
/// product (run axis last, varying fastest), assigned once at generation and
/// never recomputed. It is the sole identity used for result placement;
/// completion order never matters. The run counter only distinguishes
/// repeated trials for averaging, it is not part of the address.
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    pub index: usize,
    pub run: usize,
    pub values: Vec<ParamValue>,
}

/// Expand `space` into the full run-replicated Cartesian product.
///
/// The run axis is appended as the last axis with values `0..runs`, so the
/// trials of one grid point occupy consecutive indices and `index / runs`
/// recovers the base grid point.
#[must_use]
pub fn generate(space: &ParameterSpace, runs: usize) -> Vec<Combination> {
    let mut shape = space.cardinalities();
    shape.push(runs);
    let total: usize = shape.iter().product();

    let mut combinations = Vec::with_capacity(total);
    let mut cursor = vec![0usize; shape.len()];
    for index in 0..total {
        let values: Vec<ParamValue> = space
            .parameters()
            .iter()
            .zip(&cursor)
            .map(|(param, &i)| param.values[i].clone())
            .collect();
        let run = cursor[shape.len() - 1];
        combinations.push(Combination { index, run, values });

        // Advance the cursor, last axis fastest
        for axis in (0..shape.len()).rev() {
            cursor[axis] += 1;
            if cursor[axis] < shape[axis] {
                break;
            }
            cursor[axis] = 0;
        }
    }
    combinations
}

/// Pseudo-random dispatch order for the expanded combinations.
///
/// Neighboring grid points often share wall-clock cost (a monotonically
/// increasing simulated-time axis, say), which would skew load across the
/// worker pool if dispatched in grid order. Seeded from process randomness,
/// deliberately not reproducible.
#[must_use]
pub fn shuffled(mut combinations: Vec<Combination>) -> Vec<Combination> {
    combinations.shuffle(&mut rand::rng());
    combinations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::Parameter;

    fn two_by_two() -> ParameterSpace {
        ParameterSpace::new(vec![
            Parameter::new("a", vec![ParamValue::Int(1), ParamValue::Int(2)]),
            Parameter::new("b", vec![ParamValue::Int(10), ParamValue::Int(20)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_generate_counts() {
        let combos = generate(&two_by_two(), 3);
        assert_eq!(combos.len(), 12, "2 * 2 * 3 runs should yield 12 trials");
    }

    #[test]
    fn test_generate_is_row_major_with_run_axis_last() {
        let combos = generate(&two_by_two(), 2);
        // First grid point, both runs, then b advances before a.
        assert_eq!(
            combos[0].values,
            vec![ParamValue::Int(1), ParamValue::Int(10)]
        );
        assert_eq!(combos[0].run, 0);
        assert_eq!(combos[1].values, combos[0].values);
        assert_eq!(combos[1].run, 1);
        assert_eq!(
            combos[2].values,
            vec![ParamValue::Int(1), ParamValue::Int(20)]
        );
        assert_eq!(combos[2].run, 0);
        assert_eq!(
            combos[7].values,
            vec![ParamValue::Int(2), ParamValue::Int(20)]
        );
        assert_eq!(combos[7].run, 1);
    }

    #[test]
    fn test_index_matches_position_and_base_recovery() {
        let runs = 3;
        let combos = generate(&two_by_two(), runs);
        for (position, combo) in combos.iter().enumerate() {
            assert_eq!(combo.index, position);
            assert_eq!(combo.run, combo.index % runs);
            // Trials of one grid point are consecutive, so index / runs
            // identifies the base point they all share.
            let base_values = &combos[(combo.index / runs) * runs].values;
            assert_eq!(&combo.values, base_values);
        }
    }

    #[test]
    fn test_shuffle_preserves_index_bijection() {
        let combos = shuffled(generate(&two_by_two(), 5));
        let mut indices: Vec<usize> = combos.iter().map(|c| c.index).collect();
        indices.sort_unstable();
        let expected: Vec<usize> = (0..combos.len()).collect();
        assert_eq!(
            indices, expected,
            "Shuffling must permute, not drop or duplicate, indices"
        );
    }

    #[test]
    fn test_single_point_space_still_replicates_runs() {
        let space =
            ParameterSpace::new(vec![Parameter::new("a", vec![ParamValue::Int(7)])]).unwrap();
        let combos = generate(&space, 4);
        assert_eq!(combos.len(), 4);
        for combo in &combos {
            assert_eq!(combo.values, vec![ParamValue::Int(7)]);
        }
    }
}
