//! Direction-based neighbour lookup.
//!
//! The directional helpers (`pull_group`, `push_group`, ...) need "the group
//! to the left of this one".  [`NearestNeighbour`] answers that from the
//! rectangles the outer arrangement produced on the last redraw.

use crate::command::Direction;
use crate::geometry::Rect;
use crate::traits::Navigator;

/// Picks the closest window whose rectangle centre lies strictly in the
/// requested direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighbour;

impl<W: Clone + PartialEq> Navigator<W> for NearestNeighbour {
    fn neighbour(&self, placements: &[(W, Rect)], from: &W, direction: Direction) -> Option<W> {
        find_window_in_direction(placements, from, direction).map(|(w, _)| w.clone())
    }
}

/// Find the placement in `direction` of `from`.
///
/// Compares rectangle centres and returns the closest placement whose centre
/// is in the requested direction.  Returns `None` if there is none, or if
/// `from` has no placement.
pub fn find_window_in_direction<'a, W: PartialEq>(
    placements: &'a [(W, Rect)],
    from: &W,
    direction: Direction,
) -> Option<&'a (W, Rect)> {
    let (_, current) = placements.iter().find(|(w, _)| w == from)?;
    let (cx, cy) = current.center();

    placements
        .iter()
        .filter(|(w, _)| w != from)
        .filter(|(_, r)| {
            let (mx, my) = r.center();
            match direction {
                Direction::Right => mx > cx,
                Direction::Left => mx < cx,
                Direction::Down => my > cy,
                Direction::Up => my < cy,
            }
        })
        .min_by(|(_, a), (_, b)| {
            let dist = |r: &Rect| -> f64 {
                let (mx, my) = r.center();
                let dx = mx - cx;
                let dy = my - cy;
                dx * dx + dy * dy
            };
            dist(a)
                .partial_cmp(&dist(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}
