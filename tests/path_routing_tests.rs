//! Property and scenario tests for the tour construction behind path
//! routing.

use hamlet::map::paths::{manhattan_matrix, nearest_neighbor, tour_length, two_opt};
use hamlet::WorldPos;
use proptest::prelude::*;

fn points_strategy() -> impl Strategy<Value = Vec<WorldPos>> {
    prop::collection::vec((-200.0f32..200.0, -200.0f32..200.0), 2..12)
        .prop_map(|pts| pts.into_iter().map(|(x, z)| WorldPos::new(x, z)).collect())
}

proptest! {
    #[test]
    fn prop_two_opt_never_worse_than_nearest_neighbor(points in points_strategy()) {
        let matrix = manhattan_matrix(&points);
        let nn = nearest_neighbor(&matrix);
        let nn_len = tour_length(&matrix, &nn);
        let refined = two_opt(&matrix, nn);
        prop_assert!(tour_length(&matrix, &refined) <= nn_len + 1e-3);
    }

    #[test]
    fn prop_tours_visit_every_point_exactly_once(points in points_strategy()) {
        let matrix = manhattan_matrix(&points);
        let tour = two_opt(&matrix, nearest_neighbor(&matrix));
        let mut sorted = tour.clone();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, (0..points.len()).collect::<Vec<_>>());
    }

    #[test]
    fn prop_matrix_is_symmetric_with_zero_diagonal(points in points_strategy()) {
        let matrix = manhattan_matrix(&points);
        for i in 0..points.len() {
            prop_assert_eq!(matrix[i][i], 0.0);
            for j in 0..points.len() {
                prop_assert_eq!(matrix[i][j], matrix[j][i]);
            }
        }
    }
}

#[test]
fn test_collinear_points_get_an_optimal_tour() {
    // Scrambled points on a line: the optimal open tour from the leftmost
    // visits them in order.
    let points: Vec<WorldPos> = [0.0, 40.0, 10.0, 30.0, 20.0]
        .iter()
        .map(|&x| WorldPos::new(x, 0.0))
        .collect();
    let matrix = manhattan_matrix(&points);
    let tour = two_opt(&matrix, nearest_neighbor(&matrix));
    assert_eq!(tour_length(&matrix, &tour), 40.0);
}

#[test]
fn test_two_point_tour_is_trivial() {
    let points = vec![WorldPos::new(0.0, 0.0), WorldPos::new(3.0, 4.0)];
    let matrix = manhattan_matrix(&points);
    let tour = two_opt(&matrix, nearest_neighbor(&matrix));
    assert_eq!(tour, vec![0, 1]);
    assert_eq!(tour_length(&matrix, &tour), 7.0);
}
