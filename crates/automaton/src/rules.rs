//! Rule families and their transition functions.
//!
//! Every 2D family counts the Moore neighborhood on a torus. Cell states are
//! small integers whose meaning depends on the family:
//!
//! | family        | 0     | 1     | 2     | 3         |
//! |---------------|-------|-------|-------|-----------|
//! | life, seeds   | dead  | alive |       |           |
//! | brians-brain  | dead  | alive | dying |           |
//! | wireworld     | empty | head  | tail  | conductor |
//! | elementary    | off   | on    |       |           |

use pattern_engine_core::grid::Grid;
use pattern_engine_core::prng::Xorshift64;

pub const DEAD: u8 = 0;
pub const ALIVE: u8 = 1;
pub const DYING: u8 = 2;

pub const EMPTY: u8 = 0;
pub const HEAD: u8 = 1;
pub const TAIL: u8 = 2;
pub const CONDUCTOR: u8 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RuleFamily {
    #[default]
    Life,
    Seeds,
    BriansBrain,
    Wireworld,
    Elementary,
}

impl RuleFamily {
    pub const ALL: [RuleFamily; 5] = [
        RuleFamily::Life,
        RuleFamily::Seeds,
        RuleFamily::BriansBrain,
        RuleFamily::Wireworld,
        RuleFamily::Elementary,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        let n = name.trim().to_ascii_lowercase().replace(['_', ' ', '\''], "-");
        match n.as_str() {
            "life" | "game-of-life" | "conway" => Some(RuleFamily::Life),
            "seeds" => Some(RuleFamily::Seeds),
            "brians-brain" | "brian-s-brain" | "briansbrain" => Some(RuleFamily::BriansBrain),
            "wireworld" => Some(RuleFamily::Wireworld),
            "elementary" | "wolfram" => Some(RuleFamily::Elementary),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RuleFamily::Life => "life",
            RuleFamily::Seeds => "seeds",
            RuleFamily::BriansBrain => "brians-brain",
            RuleFamily::Wireworld => "wireworld",
            RuleFamily::Elementary => "elementary",
        }
    }

    /// State painted by the pointer.
    pub fn paint_state(self) -> u8 {
        match self {
            RuleFamily::Wireworld => CONDUCTOR,
            _ => ALIVE,
        }
    }

    /// True for states that keep the pattern going.
    pub fn is_active(self, state: u8) -> bool {
        match self {
            RuleFamily::Wireworld => state == HEAD || state == TAIL,
            _ => state != DEAD,
        }
    }
}

/// Birth/survival neighbor-count sets for life-like rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifeRule {
    pub birth: [bool; 9],
    pub survival: [bool; 9],
}

impl Default for LifeRule {
    /// Conway's B3/S23.
    fn default() -> Self {
        Self::from_counts(&[3], &[2, 3])
    }
}

impl LifeRule {
    /// Builds a rule from neighbor counts; counts above 8 are ignored.
    pub fn from_counts(birth: &[usize], survival: &[usize]) -> Self {
        let mut rule = Self {
            birth: [false; 9],
            survival: [false; 9],
        };
        for &n in birth.iter().filter(|&&n| n <= 8) {
            rule.birth[n] = true;
        }
        for &n in survival.iter().filter(|&&n| n <= 8) {
            rule.survival[n] = true;
        }
        rule
    }

    /// Parses `B<digits>/S<digits>` notation, case-insensitive, in either
    /// order. Returns `None` for anything else.
    pub fn parse(rulestring: &str) -> Option<Self> {
        let mut birth = None;
        let mut survival = None;
        for part in rulestring.trim().split('/') {
            let part = part.trim();
            let mut chars = part.chars();
            let tag = chars.next()?.to_ascii_uppercase();
            let mut counts = [false; 9];
            for c in chars {
                let d = c.to_digit(10)? as usize;
                if d > 8 {
                    return None;
                }
                counts[d] = true;
            }
            match tag {
                'B' if birth.is_none() => birth = Some(counts),
                'S' if survival.is_none() => survival = Some(counts),
                _ => return None,
            }
        }
        Some(Self {
            birth: birth?,
            survival: survival?,
        })
    }

    pub fn birth_counts(&self) -> Vec<usize> {
        (0..9).filter(|&n| self.birth[n]).collect()
    }

    pub fn survival_counts(&self) -> Vec<usize> {
        (0..9).filter(|&n| self.survival[n]).collect()
    }

    pub fn to_rulestring(&self) -> String {
        let digits = |v: Vec<usize>| v.iter().map(|n| n.to_string()).collect::<String>();
        format!(
            "B{}/S{}",
            digits(self.birth_counts()),
            digits(self.survival_counts())
        )
    }
}

/// Number of Moore neighbors of `(x, y)` in state `state`, wrapping on both axes.
pub fn count_neighbors(grid: &Grid<u8>, x: usize, y: usize, state: u8) -> usize {
    let (x, y) = (x as isize, y as isize);
    let mut n = 0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if (dx != 0 || dy != 0) && grid.get(x + dx, y + dy) == state {
                n += 1;
            }
        }
    }
    n
}

fn step_each(current: &Grid<u8>, next: &mut Grid<u8>, mut f: impl FnMut(u8, usize, usize) -> u8) {
    let w = current.width();
    for (i, out) in next.data_mut().iter_mut().enumerate() {
        let (x, y) = (i % w, i / w);
        *out = f(current.data()[i], x, y);
    }
}

pub fn step_life(current: &Grid<u8>, next: &mut Grid<u8>, rule: &LifeRule) {
    step_each(current, next, |s, x, y| {
        let n = count_neighbors(current, x, y, ALIVE);
        let alive = if s == ALIVE {
            rule.survival[n]
        } else {
            rule.birth[n]
        };
        if alive {
            ALIVE
        } else {
            DEAD
        }
    });
}

/// Seeds (B2/S): live cells always die; a dead cell with exactly two live
/// neighbors is born with probability `birth_probability`.
pub fn step_seeds(
    current: &Grid<u8>,
    next: &mut Grid<u8>,
    birth_probability: f64,
    rng: &mut Xorshift64,
) {
    step_each(current, next, |s, x, y| {
        if s == DEAD
            && count_neighbors(current, x, y, ALIVE) == 2
            && (birth_probability >= 1.0 || rng.chance(birth_probability))
        {
            ALIVE
        } else {
            DEAD
        }
    });
}

/// Brian's Brain: alive → dying → dead; dead with exactly two alive
/// neighbors becomes alive.
pub fn step_brians_brain(current: &Grid<u8>, next: &mut Grid<u8>) {
    step_each(current, next, |s, x, y| match s {
        ALIVE => DYING,
        DYING => DEAD,
        _ if count_neighbors(current, x, y, ALIVE) == 2 => ALIVE,
        _ => DEAD,
    });
}

/// Wireworld: head → tail → conductor; a conductor with one or two head
/// neighbors becomes a head.
pub fn step_wireworld(current: &Grid<u8>, next: &mut Grid<u8>) {
    step_each(current, next, |s, x, y| match s {
        HEAD => TAIL,
        TAIL => CONDUCTOR,
        CONDUCTOR => {
            let heads = count_neighbors(current, x, y, HEAD);
            if heads == 1 || heads == 2 {
                HEAD
            } else {
                CONDUCTOR
            }
        }
        _ => EMPTY,
    });
}

/// Elementary (1D) automaton rendered as a scrolling history: every row moves
/// down by one and the new top row is computed from the previous top row,
/// wrapping horizontally.
pub fn step_elementary(current: &Grid<u8>, next: &mut Grid<u8>, rule: u8) {
    let w = current.width();
    let h = current.height();
    let (top, rest) = next.data_mut().split_at_mut(w);
    rest.copy_from_slice(&current.data()[..w * (h - 1)]);
    let row = current.row(0);
    for (x, out) in top.iter_mut().enumerate() {
        let l = row[(x + w - 1) % w] & 1;
        let c = row[x] & 1;
        let r = row[(x + 1) % w] & 1;
        let pattern = (l << 2) | (c << 1) | r;
        *out = (rule >> pattern) & 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(w: usize, h: usize, cells: &[(usize, usize, u8)]) -> Grid<u8> {
        let mut g = Grid::filled(w, h, 0u8).unwrap();
        for &(x, y, s) in cells {
            g.set(x as isize, y as isize, s);
        }
        g
    }

    #[test]
    fn family_names_round_trip() {
        for f in RuleFamily::ALL {
            assert_eq!(RuleFamily::from_name(f.name()), Some(f));
        }
        assert_eq!(RuleFamily::from_name("Brian's Brain"), Some(RuleFamily::BriansBrain));
        assert_eq!(RuleFamily::from_name("langton"), None);
    }

    #[test]
    fn rulestring_parses_both_orders() {
        let r = LifeRule::parse("B36/S23").unwrap();
        assert_eq!(r.birth_counts(), vec![3, 6]);
        assert_eq!(r.survival_counts(), vec![2, 3]);
        assert_eq!(LifeRule::parse("s23/b3"), Some(LifeRule::default()));
        assert_eq!(r.to_rulestring(), "B36/S23");
    }

    #[test]
    fn rulestring_allows_empty_sets() {
        let seeds = LifeRule::parse("B2/S").unwrap();
        assert_eq!(seeds.birth_counts(), vec![2]);
        assert!(seeds.survival_counts().is_empty());
    }

    #[test]
    fn bad_rulestrings_are_rejected() {
        for s in ["", "B3", "B9/S23", "X3/S23", "B3/S2a", "B3/B3"] {
            assert_eq!(LifeRule::parse(s), None, "{s}");
        }
    }

    #[test]
    fn neighbor_count_wraps_at_corners() {
        let g = grid(5, 5, &[(4, 4, 1), (0, 4, 1), (4, 0, 1)]);
        assert_eq!(count_neighbors(&g, 0, 0, ALIVE), 3);
    }

    #[test]
    fn life_blinker_oscillates() {
        let g0 = grid(5, 5, &[(1, 2, 1), (2, 2, 1), (3, 2, 1)]);
        let mut g1 = g0.clone();
        step_life(&g0, &mut g1, &LifeRule::default());
        assert_eq!(g1, grid(5, 5, &[(2, 1, 1), (2, 2, 1), (2, 3, 1)]));
        let mut g2 = g1.clone();
        step_life(&g1, &mut g2, &LifeRule::default());
        assert_eq!(g2, g0);
    }

    #[test]
    fn seeds_live_cells_always_die() {
        let g0 = grid(6, 6, &[(2, 2, 1), (3, 2, 1)]);
        let mut g1 = g0.clone();
        let mut rng = Xorshift64::new(1);
        step_seeds(&g0, &mut g1, 1.0, &mut rng);
        assert_eq!(g1.get(2, 2), DEAD);
        assert_eq!(g1.get(3, 2), DEAD);
        // Cells above and below the pair have exactly two neighbors.
        assert_eq!(g1.get(2, 1), ALIVE);
        assert_eq!(g1.get(3, 3), ALIVE);
    }

    #[test]
    fn seeds_zero_probability_births_nothing() {
        let g0 = grid(6, 6, &[(2, 2, 1), (3, 2, 1)]);
        let mut g1 = g0.clone();
        let mut rng = Xorshift64::new(1);
        step_seeds(&g0, &mut g1, 0.0, &mut rng);
        assert!(g1.data().iter().all(|&s| s == DEAD));
    }

    #[test]
    fn brians_brain_cycle() {
        let g0 = grid(6, 6, &[(2, 2, ALIVE), (3, 2, ALIVE), (0, 0, DYING)]);
        let mut g1 = g0.clone();
        step_brians_brain(&g0, &mut g1);
        assert_eq!(g1.get(2, 2), DYING);
        assert_eq!(g1.get(0, 0), DEAD);
        assert_eq!(g1.get(2, 1), ALIVE);
        let mut g2 = g1.clone();
        step_brians_brain(&g1, &mut g2);
        assert_eq!(g2.get(2, 2), DEAD);
    }

    #[test]
    fn wireworld_transitions() {
        // A wire with one electron travelling right.
        let g0 = grid(
            6,
            3,
            &[(0, 1, TAIL), (1, 1, HEAD), (2, 1, CONDUCTOR), (3, 1, CONDUCTOR)],
        );
        let mut g1 = g0.clone();
        step_wireworld(&g0, &mut g1);
        assert_eq!(g1.get(0, 1), CONDUCTOR);
        assert_eq!(g1.get(1, 1), TAIL);
        assert_eq!(g1.get(2, 1), HEAD);
        assert_eq!(g1.get(3, 1), CONDUCTOR);
        assert_eq!(g1.get(4, 1), EMPTY);
    }

    #[test]
    fn wireworld_three_heads_do_not_fire() {
        let g0 = grid(
            5,
            5,
            &[(1, 1, HEAD), (2, 1, HEAD), (3, 1, HEAD), (2, 2, CONDUCTOR)],
        );
        let mut g1 = g0.clone();
        step_wireworld(&g0, &mut g1);
        assert_eq!(g1.get(2, 2), CONDUCTOR);
    }

    #[test]
    fn elementary_rule_90_sierpinski() {
        let g0 = grid(9, 4, &[(4, 0, 1)]);
        let mut g1 = g0.clone();
        step_elementary(&g0, &mut g1, 90);
        let top: Vec<u8> = g1.row(0).to_vec();
        assert_eq!(top, vec![0, 0, 0, 1, 0, 1, 0, 0, 0]);
        // Previous top row scrolled down.
        assert_eq!(g1.row(1), g0.row(0));
        let mut g2 = g1.clone();
        step_elementary(&g1, &mut g2, 90);
        assert_eq!(g2.row(0), &[0, 0, 1, 0, 0, 0, 1, 0, 0]);
        assert_eq!(g2.row(1), g1.row(0));
        assert_eq!(g2.row(2), g0.row(0));
    }

    #[test]
    fn elementary_wraps_horizontally() {
        let g0 = grid(5, 2, &[(0, 0, 1)]);
        let mut g1 = g0.clone();
        step_elementary(&g0, &mut g1, 90);
        assert_eq!(g1.row(0), &[0, 1, 0, 0, 1]);
    }

    #[test]
    fn elementary_single_row_grid() {
        let g0 = grid(3, 1, &[(1, 0, 1)]);
        let mut g1 = g0.clone();
        step_elementary(&g0, &mut g1, 90);
        assert_eq!(g1.row(0), &[1, 0, 1]);
    }
}
