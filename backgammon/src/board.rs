use crate::{BoardView, Color, RailSide, RailView};

pub const NUM_POINTS: usize = 24;

/// The contents of one point: how many checkers, and whose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Slot {
    pub count: u32,
    /// The color of the bottom checker. `None` for an empty point, or when
    /// the service did not say.
    pub color: Option<Color>,
}

impl Slot {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Checker counts per color for the bar or the borne-off area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RailCounts {
    pub white: u32,
    pub black: u32,
}

impl RailCounts {
    /// Counts the checkers on a rail.
    ///
    /// The per-direction shape wins whenever either direction is present:
    /// clockwise checkers count as white, counterclockwise as black.
    /// Otherwise the flat `white`/`black` counts are used. Anything missing is 0.
    pub fn extract(rail: &RailView) -> Self {
        if rail.clockwise.is_some() || rail.counterclockwise.is_some() {
            RailCounts {
                white: side_count(rail.clockwise.as_ref()),
                black: side_count(rail.counterclockwise.as_ref()),
            }
        } else {
            RailCounts {
                white: rail.white.unwrap_or(0),
                black: rail.black.unwrap_or(0),
            }
        }
    }

    pub fn get(&self, color: Color) -> u32 {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }
}

fn side_count(side: Option<&RailSide>) -> u32 {
    side.map_or(0, |side| saturating_len(side.checkers.len()))
}

fn saturating_len(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// The 24 points plus bar and off, indexed by clockwise point number.
///
/// This is always derived from a [`BoardView`] and never edited afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Board24 {
    /// Index `i` holds clockwise point `i + 1`.
    slots: [Slot; NUM_POINTS],
    pub bar: RailCounts,
    pub off: RailCounts,
}

impl Board24 {
    /// Builds the board from the wire representation.
    ///
    /// Points without a clockwise position, or with one outside 1..=24, are
    /// skipped. If two points claim the same position, the later one wins.
    pub fn normalize(board: &BoardView) -> Self {
        let mut slots = [Slot::default(); NUM_POINTS];
        for point in &board.points {
            let Some(index) = point.position.clockwise.and_then(slot_index) else {
                continue;
            };
            slots[index] = Slot {
                count: saturating_len(point.checkers.len()),
                color: point.checkers.first().and_then(|checker| checker.color),
            };
        }

        Self {
            slots,
            bar: RailCounts::extract(&board.bar),
            off: RailCounts::extract(&board.off),
        }
    }

    /// The slot for a clockwise point number in 1..=24.
    pub fn slot(&self, point: u8) -> Option<&Slot> {
        slot_index(point).map(|index| &self.slots[index])
    }

    pub fn slots(&self) -> &[Slot; NUM_POINTS] {
        &self.slots
    }

    /// The non-empty points in ascending clockwise order.
    pub fn occupied(&self) -> impl Iterator<Item = (u8, Slot)> + '_ {
        (1..=NUM_POINTS as u8)
            .zip(self.slots.iter().copied())
            .filter(|(_, slot)| !slot.is_empty())
    }

    /// All checkers of a color: on points, on the bar and borne off.
    pub fn total(&self, color: Color) -> u32 {
        let on_points: u32 = self
            .slots
            .iter()
            .filter(|slot| slot.color == Some(color))
            .map(|slot| slot.count)
            .sum();
        on_points + self.bar.get(color) + self.off.get(color)
    }
}

fn slot_index(point: u8) -> Option<usize> {
    (1..=NUM_POINTS as u8)
        .contains(&point)
        .then(|| usize::from(point) - 1)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{CheckerView, PointView, Position};

    fn point(clockwise: u8, color: Color, count: usize) -> PointView {
        PointView {
            id: None,
            position: Position::from_clockwise(clockwise),
            checkers: vec![
                CheckerView {
                    id: None,
                    color: Some(color),
                };
                count
            ],
        }
    }

    #[test]
    fn untouched_slots_are_empty() {
        let board = Board24::normalize(&BoardView {
            points: vec![point(5, Color::White, 2)],
            ..Default::default()
        });
        for (i, slot) in board.slots().iter().enumerate() {
            if i == 4 {
                assert_eq!(*slot, Slot { count: 2, color: Some(Color::White) });
            } else {
                assert_eq!(*slot, Slot::default());
            }
        }
    }

    #[test]
    fn out_of_range_and_missing_positions_are_skipped() {
        let mut missing = point(3, Color::Black, 4);
        missing.position.clockwise = None;
        let board = Board24::normalize(&BoardView {
            points: vec![point(0, Color::Black, 1), point(25, Color::Black, 1), missing],
            ..Default::default()
        });
        assert_eq!(board.occupied().count(), 0);
        assert_eq!(board.slot(0), None);
        assert_eq!(board.slot(25), None);
    }

    #[test]
    fn duplicate_positions_keep_the_last_entry() {
        let board = Board24::normalize(&BoardView {
            points: vec![point(7, Color::White, 3), point(7, Color::Black, 1)],
            ..Default::default()
        });
        assert_eq!(
            board.slot(7),
            Some(&Slot {
                count: 1,
                color: Some(Color::Black)
            })
        );
    }

    #[test]
    fn first_checker_decides_the_color() {
        let mut mixed = point(9, Color::White, 1);
        mixed.checkers.push(CheckerView {
            id: None,
            color: Some(Color::Black),
        });
        let board = Board24::normalize(&BoardView {
            points: vec![mixed],
            ..Default::default()
        });
        assert_eq!(board.slot(9).unwrap().color, Some(Color::White));
        assert_eq!(board.slot(9).unwrap().count, 2);
    }

    #[test]
    fn rail_counts_from_either_shape() {
        let directional: RailView = serde_json::from_value(json!({
            "clockwise": { "checkers": [{ "color": "white" }, { "color": "white" }] },
            "counterclockwise": { "checkers": [{ "color": "black" }] }
        }))
        .unwrap();
        let flat: RailView = serde_json::from_value(json!({ "white": 2, "black": 1 })).unwrap();

        let expected = RailCounts { white: 2, black: 1 };
        assert_eq!(RailCounts::extract(&directional), expected);
        assert_eq!(RailCounts::extract(&flat), expected);
    }

    #[test]
    fn directional_shape_wins_over_flat_counts() {
        let rail: RailView = serde_json::from_value(json!({
            "clockwise": { "checkers": [{ "color": "white" }] },
            "white": 9,
            "black": 9
        }))
        .unwrap();
        assert_eq!(RailCounts::extract(&rail), RailCounts { white: 1, black: 0 });
    }

    #[test]
    fn malformed_rails_count_as_zero() {
        let rail: RailView =
            serde_json::from_value(json!({ "clockwise": 3, "white": "two" })).unwrap();
        assert_eq!(RailCounts::extract(&rail), RailCounts::default());
        assert_eq!(RailCounts::extract(&RailView::default()), RailCounts::default());
    }

    #[test]
    fn totals_include_bar_and_off() {
        let board: BoardView = serde_json::from_value(json!({
            "points": [
                { "position": { "clockwise": 1 }, "checkers": [{ "color": "black" }, { "color": "black" }] },
                { "position": { "clockwise": 24 }, "checkers": [{ "color": "white" }] }
            ],
            "bar": { "white": 1, "black": 0 },
            "off": { "white": 13, "black": 3 }
        }))
        .unwrap();
        let board = Board24::normalize(&board);
        assert_eq!(board.total(Color::White), 15);
        assert_eq!(board.total(Color::Black), 5);
        assert_eq!(
            board.occupied().map(|(p, _)| p).collect::<Vec<_>>(),
            vec![1, 24]
        );
    }
}
