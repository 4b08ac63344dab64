/// Adversary AI: junction-commit heuristic.
///
/// An adversary travels toward its committed waypoint. When the resolved
/// displacement toward it is zero (arrived, or blocked), it picks a new
/// direction:
///
///   1. Candidates = the four directions whose sign agrees with (or is
///      neutral to) the current momentum on each axis, and which the
///      collision resolver lets it move in. Pure U-turns are excluded.
///   2. Several candidates → uniform random choice.
///   3. No candidate → reverse the previous direction (dead end).
///
/// The chosen direction becomes the new momentum and the waypoint becomes
/// the neighbouring cell in that direction. Fear does not change any of this.
///
/// The random source is passed in explicitly so the decision is
/// reproducible with a seeded generator.

use rand::Rng;

use super::entity::Adversary;
use super::geometry::{nearest_grid_point, Direction, Vec2};
use super::grid::Grid;
use super::physics;

/// Is `dir` compatible with the momentum `movement` on both axes?
fn agrees_with_momentum(movement: Option<Direction>, dir: Direction) -> bool {
    let (mx, my) = movement.map_or((0, 0), Direction::offset);
    let (dx, dy) = dir.offset();
    (dx == 0 || dx * mx >= 0) && (dy == 0 || dy * my >= 0)
}

/// Directions the adversary may take at a decision point.
pub fn candidate_directions(grid: &Grid, adv: &Adversary) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|&dir| agrees_with_momentum(adv.movement, dir))
        .filter(|&dir| physics::can_move(grid, adv.pos, adv.speed, dir))
        .collect()
}

/// Pick a new direction, commit to it, and return the legal displacement
/// along it (zero if even the reversal is blocked).
pub fn choose_move<R: Rng + ?Sized>(grid: &Grid, adv: &mut Adversary, rng: &mut R) -> Vec2 {
    let candidates = candidate_directions(grid, adv);
    let choice = if candidates.is_empty() {
        adv.movement.map(Direction::opposite)
    } else {
        Some(candidates[rng.random_range(0..candidates.len())])
    };

    let here = nearest_grid_point(adv.pos);
    tracing::debug!(
        adversary = adv.index,
        x = here.x, y = here.y,
        ?candidates, ?choice,
        "adversary decision"
    );

    adv.movement = choice;
    match choice {
        Some(dir) => {
            adv.waypoint = here.step(dir);
            physics::furthest_legal_move(grid, adv.pos, adv.speed, dir.unit())
        }
        None => {
            adv.waypoint = here;
            Vec2::ZERO
        }
    }
}

/// One movement step: head for the waypoint, re-decide when stalled,
/// apply the displacement. Returns the displacement applied.
pub fn step_adversary<R: Rng + ?Sized>(grid: &Grid, adv: &mut Adversary, rng: &mut R) -> Vec2 {
    let toward = adv.waypoint.center() - adv.pos;
    let mut m = physics::furthest_legal_move(grid, adv.pos, adv.speed, toward);
    if m.is_zero() {
        m = choose_move(grid, adv, rng);
    }
    adv.pos = adv.pos + m;
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::Cell;
    use crate::domain::grid::MapCell;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SPEED: f64 = 0.2;

    fn grid_from(rows: &[&str]) -> Grid {
        let mut g = Grid::new(rows[0].len(), rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '%' {
                    g.set(Cell::new(x as i32, y as i32), MapCell::Wall);
                }
            }
        }
        g
    }

    fn adversary_at(x: i32, y: i32, movement: Option<Direction>) -> Adversary {
        let mut a = Adversary::new(1, Cell::new(x, y), SPEED);
        a.movement = movement;
        a
    }

    #[test]
    fn momentum_filter_excludes_only_reversal() {
        let m = Some(Direction::Right);
        assert!(agrees_with_momentum(m, Direction::Right));
        assert!(agrees_with_momentum(m, Direction::Up));
        assert!(agrees_with_momentum(m, Direction::Down));
        assert!(!agrees_with_momentum(m, Direction::Left));
        for dir in Direction::ALL {
            assert!(agrees_with_momentum(None, dir));
        }
    }

    #[test]
    fn junction_choice_is_always_a_legal_non_reversing_candidate() {
        let g = grid_from(&[
            "%%%%%%",
            "%    %",
            "%% %%%",
            "%% %%%",
        ]);
        let legal = [Direction::Right, Direction::Down];
        let base = adversary_at(2, 1, Some(Direction::Right));
        assert_eq!(candidate_directions(&g, &base), legal.to_vec());

        let mut seen_right = false;
        let mut seen_down = false;
        for seed in 0..200u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut a = base.clone();
            let m = choose_move(&g, &mut a, &mut rng);
            let dir = a.movement.expect("a direction is committed");
            assert!(legal.contains(&dir), "seed {seed} chose {dir:?}");
            assert_eq!(a.waypoint, Cell::new(2, 1).step(dir));
            assert_eq!(m, dir.unit() * SPEED);
            seen_right |= dir == Direction::Right;
            seen_down |= dir == Direction::Down;
        }
        assert!(seen_right && seen_down);
    }

    #[test]
    fn dead_end_reverses() {
        let g = grid_from(&[
            "%%%%%",
            "%   %",
            "%%%%%",
        ]);
        let mut a = adversary_at(3, 1, Some(Direction::Right));
        let mut rng = StdRng::seed_from_u64(7);
        let m = choose_move(&g, &mut a, &mut rng);
        assert_eq!(a.movement, Some(Direction::Left));
        assert_eq!(a.waypoint, Cell::new(2, 1));
        assert_eq!(m, Vec2::new(-SPEED, 0.0));
    }

    #[test]
    fn boxed_in_without_momentum_stays_put() {
        let g = grid_from(&[
            "%%%",
            "% %",
            "%%%",
        ]);
        let mut a = adversary_at(1, 1, None);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(step_adversary(&g, &mut a, &mut rng).is_zero());
        assert_eq!(a.pos, Vec2::new(1.0, 1.0));
        assert_eq!(a.waypoint, Cell::new(1, 1));
    }

    #[test]
    fn travels_to_waypoint_then_decides_again() {
        let g = grid_from(&[
            "%%%%%%%",
            "%     %",
            "%%%%%%%",
        ]);
        let mut a = adversary_at(1, 1, None);
        let mut rng = StdRng::seed_from_u64(3);
        // Only Right is legal from the west end of the corridor.
        step_adversary(&g, &mut a, &mut rng);
        assert_eq!(a.movement, Some(Direction::Right));
        assert_eq!(a.waypoint, Cell::new(2, 1));

        // Keep going until the far end: every step is at most SPEED and the
        // adversary never leaves the corridor row.
        for _ in 0..60 {
            let m = step_adversary(&g, &mut a, &mut rng);
            assert!(m.x.abs() <= SPEED && m.y == 0.0);
            assert_eq!(a.pos.y, 1.0);
            assert!(a.pos.x >= 1.0 && a.pos.x <= 5.0);
        }
    }
}
