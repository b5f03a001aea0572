use crate::region::{Interval, Region};

/// Whether `interval` is narrow enough to be kept as an eigenvalue bracket.
/// Isolated points and unbounded pieces never qualify.
pub fn is_confirmable(interval: &Interval, threshold: f64) -> bool {
    let width = interval.width();
    width.is_finite() && width > 0.0 && width < threshold
}

/// One refinement step on an already solved candidate region.
///
/// The candidate is cut down to `reference`; every surviving piece narrower
/// than `threshold` joins `confirmed`, which is unioned back in when
/// `remerge_confirmed` is set.
pub fn refine_round(
    candidate: &Region,
    reference: &Region,
    confirmed: &mut Region,
    threshold: f64,
    remerge_confirmed: bool,
) -> Region {
    let surviving = candidate.intersect(reference);

    let newly_confirmed: Vec<Interval> = surviving
        .iter()
        .filter(|interval| is_confirmable(interval, threshold))
        .copied()
        .collect();
    if !newly_confirmed.is_empty() {
        *confirmed = confirmed.union(&Region::from_intervals(newly_confirmed));
    }

    if remerge_confirmed {
        surviving.union(confirmed)
    } else {
        surviving
    }
}
