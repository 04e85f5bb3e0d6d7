/// Whether `a` dominates `b` under minimization: no worse in every objective and
/// strictly better in at least one.
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    let mut strictly_better = false;
    for (x, y) in a.iter().zip(b) {
        if x > y {
            return false;
        }
        if x < y {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Indices of the non-dominated entries of `scores`, in input order. Identical score
/// vectors do not dominate each other and are all kept.
pub fn pareto_front(scores: &[Vec<f64>]) -> Vec<usize> {
    (0..scores.len())
        .filter(|&i| {
            !scores
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && dominates(other, &scores[i]))
        })
        .collect()
}
