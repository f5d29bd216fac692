use serde::{Deserialize, Serialize};
use std::fmt;

/// One segment of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Focus => "Focus",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Position of the state machine within a session.
///
/// Cycle indices are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "cycle", rename_all = "snake_case")]
pub enum Stage {
    Focus(u32),
    ShortBreak(u32),
    LongBreak,
    Finished,
}

impl Stage {
    /// The phase being counted down, or `None` once finished.
    pub fn phase(self) -> Option<Phase> {
        match self {
            Stage::Focus(_) => Some(Phase::Focus),
            Stage::ShortBreak(_) => Some(Phase::ShortBreak),
            Stage::LongBreak => Some(Phase::LongBreak),
            Stage::Finished => None,
        }
    }

    /// The cycle this stage belongs to. The long break and the finished
    /// state belong to the last cycle.
    pub fn cycle_index(self, cycles: u32) -> u32 {
        match self {
            Stage::Focus(i) | Stage::ShortBreak(i) => i,
            Stage::LongBreak | Stage::Finished => cycles,
        }
    }

    /// The transition table. Only called when a phase countdown completes.
    pub fn next(self, cycles: u32) -> Stage {
        match self {
            Stage::Focus(i) if i < cycles => Stage::ShortBreak(i),
            Stage::Focus(_) => Stage::LongBreak,
            Stage::ShortBreak(i) => Stage::Focus(i + 1),
            Stage::LongBreak | Stage::Finished => Stage::Finished,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Focus(i) => write!(f, "Focus({i})"),
            Stage::ShortBreak(i) => write!(f, "ShortBreak({i})"),
            Stage::LongBreak => f.write_str("LongBreak"),
            Stage::Finished => f.write_str("Finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn walk(cycles: u32) -> Vec<Stage> {
        let mut stage = Stage::Focus(1);
        let mut visited = vec![stage];
        while stage != Stage::Finished {
            stage = stage.next(cycles);
            visited.push(stage);
        }
        visited
    }

    #[test]
    fn two_cycles_visit_expected_order() {
        assert_eq!(
            walk(2),
            vec![
                Stage::Focus(1),
                Stage::ShortBreak(1),
                Stage::Focus(2),
                Stage::LongBreak,
                Stage::Finished,
            ]
        );
    }

    #[test]
    fn single_cycle_skips_short_break() {
        assert_eq!(walk(1), vec![Stage::Focus(1), Stage::LongBreak, Stage::Finished]);
    }

    #[test]
    fn finished_is_terminal() {
        assert_eq!(Stage::Finished.next(3), Stage::Finished);
        assert_eq!(Stage::Finished.phase(), None);
    }

    #[test]
    fn display_matches_table_names() {
        assert_eq!(Stage::ShortBreak(3).to_string(), "ShortBreak(3)");
        assert_eq!(Phase::LongBreak.to_string(), "Long Break");
    }

    proptest! {
        #[test]
        fn phase_counts_hold_for_any_cycle_count(cycles in 1u32..64) {
            let stages = walk(cycles);
            let focus = stages.iter().filter(|s| matches!(s, Stage::Focus(_))).count();
            let short = stages.iter().filter(|s| matches!(s, Stage::ShortBreak(_))).count();
            let long = stages.iter().filter(|s| matches!(s, Stage::LongBreak)).count();
            prop_assert_eq!(focus, cycles as usize);
            prop_assert_eq!(short, cycles as usize - 1);
            prop_assert_eq!(long, 1);
            // Long break directly follows the last focus phase.
            prop_assert_eq!(stages[stages.len() - 3], Stage::Focus(cycles));
        }

        #[test]
        fn cycle_index_stays_in_range(cycles in 1u32..64) {
            for stage in walk(cycles) {
                let i = stage.cycle_index(cycles);
                prop_assert!((1..=cycles).contains(&i));
            }
        }
    }
}
