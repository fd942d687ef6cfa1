use itertools::Itertools;

use crate::{Board24, Color, PossibleMove, RailCounts, Slot, NUM_POINTS};

/// Rows of checkers drawn per point. Deeper stacks show their count instead.
pub const STACK_ROWS: usize = 5;
/// The row (counted from the board edge) that shows the count of a deep stack.
pub const OVERFLOW_ROW: usize = 0;
/// Drawn for a checker whose color is unknown.
pub const PLACEHOLDER_GLYPH: char = '◌';

/// Upper half, left to right.
pub const TOP_POINTS: [u8; 12] = [13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24];
/// Lower half, left to right.
pub const BOTTOM_POINTS: [u8; 12] = [12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1];

const CELL_WIDTH: usize = 3;
const HALF_WIDTH: usize = CELL_WIDTH * 6;
/// The bar column widens beyond this when a count needs more room.
const BAR_WIDTH: usize = 7;
const BAR_LABEL_ROW: usize = 2;

/// What one point shows in one row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Checker(Option<Color>),
    /// The full height of a stack taller than [`STACK_ROWS`].
    /// Shown as `+++` when it has more than three digits.
    Overflow(u32),
}

impl Cell {
    fn for_slot(slot: &Slot, row: usize) -> Cell {
        if slot.count as usize > STACK_ROWS && row == OVERFLOW_ROW {
            Cell::Overflow(slot.count)
        } else if (row as u32) < slot.count {
            Cell::Checker(slot.color)
        } else {
            Cell::Empty
        }
    }

    fn render(self) -> String {
        match self {
            Cell::Empty => " ".repeat(CELL_WIDTH),
            Cell::Checker(color) => format!(" {} ", color.map_or(PLACEHOLDER_GLYPH, Color::glyph)),
            Cell::Overflow(count) if count > 999 => String::from("+++"),
            Cell::Overflow(count) if count > 99 => count.to_string(),
            Cell::Overflow(count) => format!("{:>2} ", count),
        }
    }
}

/// The board laid out as 24 columns of [`STACK_ROWS`] cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Index `i` is clockwise point `i + 1`; row 0 is nearest the board edge.
    columns: [[Cell; STACK_ROWS]; NUM_POINTS],
    bar: RailCounts,
    off: RailCounts,
}

impl Layout {
    pub fn build(board: &Board24) -> Self {
        let mut columns = [[Cell::Empty; STACK_ROWS]; NUM_POINTS];
        for (column, slot) in columns.iter_mut().zip(board.slots()) {
            for (row, cell) in column.iter_mut().enumerate() {
                *cell = Cell::for_slot(slot, row);
            }
        }
        Self {
            columns,
            bar: board.bar,
            off: board.off,
        }
    }

    /// The cells of a point, from the board edge inwards.
    pub fn column(&self, point: u8) -> Option<&[Cell; STACK_ROWS]> {
        let index = usize::from(point).checked_sub(1)?;
        self.columns.get(index)
    }

    /// Draws the board.
    ///
    /// The upper half is labelled 13..24 along the top edge and the lower
    /// half 12..1 along the bottom edge, so the points read as one
    /// continuous track. Stacks grow from the edges towards the middle.
    /// The bar column shows the bar counts and `BAR` in the upper half, and
    /// the borne-off counts and `HOME` in the lower half. The bar column
    /// widens to fit a count pair that does not fit [`BAR_WIDTH`].
    pub fn render(&self) -> String {
        let bar_pair = rail_pair(self.bar);
        let off_pair = rail_pair(self.off);
        let width = [&bar_pair, &off_pair]
            .iter()
            .map(|pair| pair.chars().count() + 2)
            .fold(BAR_WIDTH, usize::max);

        let mut lines = Vec::with_capacity(2 * STACK_ROWS + 7);
        lines.push(border('┌', '┬', '┐', width));
        lines.push(framed(&TOP_POINTS, label, "", width));
        lines.push(border('├', '┼', '┤', width));
        for row in 0..STACK_ROWS {
            let bar = match row {
                0 => bar_pair.as_str(),
                BAR_LABEL_ROW => "BAR",
                _ => "",
            };
            lines.push(framed(&TOP_POINTS, |point| self.cell(point, row), bar, width));
        }
        lines.push(border('├', '┼', '┤', width));
        for row in (0..STACK_ROWS).rev() {
            let home = match row {
                0 => off_pair.as_str(),
                BAR_LABEL_ROW => "HOME",
                _ => "",
            };
            lines.push(framed(&BOTTOM_POINTS, |point| self.cell(point, row), home, width));
        }
        lines.push(border('├', '┼', '┤', width));
        lines.push(framed(&BOTTOM_POINTS, label, "", width));
        lines.push(border('└', '┴', '┘', width));
        lines.into_iter().join("\n")
    }

    fn cell(&self, point: u8, row: usize) -> String {
        self.column(point)
            .map_or(Cell::Empty, |column| column[row])
            .render()
    }
}

fn label(point: u8) -> String {
    format!("{:>2} ", point)
}

fn rail_pair(counts: RailCounts) -> String {
    format!(
        "{}{} {}{}",
        Color::White.glyph(),
        counts.white,
        Color::Black.glyph(),
        counts.black
    )
}

fn border(left: char, middle: char, right: char, bar_width: usize) -> String {
    format!(
        "{left}{}{middle}{}{middle}{}{right}",
        "─".repeat(HALF_WIDTH),
        "─".repeat(bar_width),
        "─".repeat(HALF_WIDTH)
    )
}

fn framed(points: &[u8; 12], cell: impl Fn(u8) -> String, bar: &str, bar_width: usize) -> String {
    let (left, right) = points.split_at(6);
    format!(
        "│{}│{:^width$}│{}│",
        left.iter().map(|&point| cell(point)).join(""),
        bar,
        right.iter().map(|&point| cell(point)).join(""),
        width = bar_width
    )
}

/// Draws the board as framed text. See [`Layout::render`].
pub fn render_board(board: &Board24) -> String {
    Layout::build(board).render()
}

/// One line per occupied point, e.g. `Point 6: 5 white checkers`.
pub fn render_point_summary(board: &Board24) -> String {
    let mut output = String::new();
    for (point, slot) in board.occupied() {
        let color = slot.color.map_or("unknown", Color::as_str);
        let plural = if slot.count == 1 { "" } else { "s" };
        output += &format!("Point {}: {} {} checker{}\n", point, slot.count, color, plural);
    }
    output
}

pub fn render_possible_moves(moves: &[PossibleMove]) -> String {
    if moves.is_empty() {
        return String::from("No legal moves available.\n");
    }
    let mut output = String::from("Possible moves:\n");
    for (i, mv) in moves.iter().enumerate() {
        output += &format!("{}. {}→{} ({})\n", i + 1, mv.from, mv.to, mv.die_value);
    }
    output
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;
    use serde_json::json;

    use super::*;
    use crate::arbitrary::StackedPoint;
    use crate::{BoardView, GameDocument};

    const LINE_WIDTH: usize = 47;

    fn board_from(points: serde_json::Value) -> Board24 {
        let view: BoardView = serde_json::from_value(json!({ "points": points })).unwrap();
        Board24::normalize(&view)
    }

    fn stacked(point: u8, color: &str, count: usize) -> serde_json::Value {
        json!({
            "position": { "clockwise": point, "counterclockwise": 25 - point },
            "checkers": vec![json!({ "color": color }); count],
        })
    }

    /// The five rendered cells of a point, from the board edge inwards.
    fn column_cells(text: &str, point: u8) -> Vec<String> {
        let lines: Vec<Vec<char>> = text.lines().map(|line| line.chars().collect()).collect();
        let top = point >= 13;
        let index = if top {
            usize::from(point - 13)
        } else {
            usize::from(12 - point)
        };
        let line_of_row = |row: usize| if top { 3 + row } else { 13 - row };
        let offset = if index < 6 {
            1 + CELL_WIDTH * index
        } else {
            2 + HALF_WIDTH + BAR_WIDTH + 1 + CELL_WIDTH * (index - 6)
        };
        (0..STACK_ROWS)
            .map(|row| lines[line_of_row(row)][offset..offset + CELL_WIDTH].iter().collect())
            .collect()
    }

    fn glyph_count(cells: &[String], glyph: char) -> usize {
        cells.iter().flat_map(|cell| cell.chars()).filter(|&c| c == glyph).count()
    }

    quickcheck! {
        fn shallow_stacks_show_one_glyph_per_checker(input: StackedPoint) -> bool {
            let count = input.count % (STACK_ROWS + 1);
            let board = board_from(json!([stacked(input.point, input.color.as_str(), count)]));
            let text = render_board(&board);
            let cells = column_cells(&text, input.point);
            glyph_count(&cells, input.color.glyph()) == count
                && cells.iter().all(|cell| !cell.chars().any(|c| c.is_ascii_digit()))
        }

        fn deep_stacks_show_their_count(input: StackedPoint) -> bool {
            let count = STACK_ROWS + 1 + input.count % 25;
            let board = board_from(json!([stacked(input.point, input.color.as_str(), count)]));
            let text = render_board(&board);
            let cells = column_cells(&text, input.point);
            cells[OVERFLOW_ROW] == format!("{:>2} ", count)
                && glyph_count(&cells, input.color.glyph()) == STACK_ROWS - 1
        }

        fn every_line_has_the_same_width(input: StackedPoint) -> bool {
            let board = board_from(json!([stacked(input.point, input.color.as_str(), input.count)]));
            render_board(&board).lines().all(|line| line.chars().count() == LINE_WIDTH)
        }
    }

    #[test]
    fn labels_run_around_the_board() {
        let text = render_board(&Board24::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 17);
        assert_eq!(lines[1], "│13 14 15 16 17 18 │       │19 20 21 22 23 24 │");
        assert_eq!(lines[15], "│12 11 10  9  8  7 │       │ 6  5  4  3  2  1 │");
    }

    #[test]
    fn opening_position() {
        let board = board_from(json!([
            stacked(1, "black", 2),
            stacked(12, "black", 5),
            stacked(17, "black", 3),
            stacked(19, "black", 5),
            stacked(6, "white", 5),
            stacked(8, "white", 3),
            stacked(13, "white", 5),
            stacked(24, "white", 2),
        ]));
        let text = render_board(&board);
        for point in 1..=24u8 {
            let cells = column_cells(&text, point);
            let (black, white) = match point {
                1 => (2, 0),
                12 => (5, 0),
                17 => (3, 0),
                19 => (5, 0),
                6 => (0, 5),
                8 => (0, 3),
                13 => (0, 5),
                24 => (0, 2),
                _ => (0, 0),
            };
            assert_eq!(glyph_count(&cells, '●'), black, "black on point {}", point);
            assert_eq!(glyph_count(&cells, '○'), white, "white on point {}", point);
        }
    }

    #[test]
    fn eleven_checkers_show_as_a_count() {
        let board = board_from(json!([stacked(1, "black", 11)]));
        let layout = Layout::build(&board);
        let column = layout.column(1).unwrap();
        assert_eq!(column[OVERFLOW_ROW], Cell::Overflow(11));
        assert!(column[1..]
            .iter()
            .all(|cell| *cell == Cell::Checker(Some(Color::Black))));

        let cells = column_cells(&layout.render(), 1);
        assert_eq!(cells[OVERFLOW_ROW], "11 ");
        assert_eq!(glyph_count(&cells, '●'), 4);
    }

    #[test]
    fn three_digit_stacks_show_their_count() {
        let board = board_from(json!([stacked(20, "white", 150)]));
        let text = render_board(&board);
        let cells = column_cells(&text, 20);
        assert_eq!(cells[OVERFLOW_ROW], "150");
        assert_eq!(glyph_count(&cells, '○'), STACK_ROWS - 1);
        assert!(text.lines().all(|line| line.chars().count() == LINE_WIDTH));

        let cells = column_cells(&render_board(&board_from(json!([stacked(4, "black", 100)]))), 4);
        assert_eq!(cells[OVERFLOW_ROW], "100");
    }

    #[test]
    fn four_digit_stacks_show_a_marker() {
        let layout = Layout {
            columns: {
                let mut columns = [[Cell::Empty; STACK_ROWS]; NUM_POINTS];
                columns[0][OVERFLOW_ROW] = Cell::Overflow(1000);
                columns
            },
            bar: RailCounts::default(),
            off: RailCounts::default(),
        };
        assert_eq!(column_cells(&layout.render(), 1)[OVERFLOW_ROW], "+++");
    }

    #[test]
    fn empty_point_and_missing_point_look_the_same() {
        let with_empty = board_from(json!([
            { "position": { "clockwise": 4, "counterclockwise": 21 }, "checkers": [] },
            stacked(10, "white", 1),
        ]));
        let without = board_from(json!([stacked(10, "white", 1)]));
        assert_eq!(render_board(&with_empty), render_board(&without));
        assert!(column_cells(&render_board(&with_empty), 4)
            .iter()
            .all(|cell| cell.trim().is_empty()));
    }

    #[test]
    fn unknown_color_uses_placeholder() {
        let board = board_from(json!([
            { "position": { "clockwise": 15 }, "checkers": [{ "color": "green" }, {}] }
        ]));
        let cells = column_cells(&render_board(&board), 15);
        assert_eq!(glyph_count(&cells, PLACEHOLDER_GLYPH), 2);
    }

    #[test]
    fn bar_and_home_columns() {
        let view: BoardView = serde_json::from_value(json!({
            "bar": { "white": 2, "black": 1 },
            "off": {
                "clockwise": { "checkers": [{ "color": "white" }] },
                "counterclockwise": { "checkers": [] }
            }
        }))
        .unwrap();
        let text = render_board(&Board24::normalize(&view));
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[3].contains("│ ○2 ●1 │"));
        assert!(lines[5].contains("│  BAR  │"));
        assert!(lines[11].contains("│ HOME  │"));
        assert!(lines[13].contains("│ ○1 ●0 │"));
    }

    #[test]
    fn wide_rail_counts_widen_the_bar_column() {
        let view: BoardView = serde_json::from_value(json!({
            "bar": { "white": 100, "black": 100 },
            "off": { "white": 15, "black": 2345 }
        }))
        .unwrap();
        let text = render_board(&Board24::normalize(&view));
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[3].contains("│ ○100 ●100 │"), "{}", lines[3]);
        assert!(lines[13].contains("│ ○15 ●2345 │"), "{}", lines[13]);
        let width = lines[0].chars().count();
        assert_eq!(width, LINE_WIDTH + 4);
        assert!(lines.iter().all(|line| line.chars().count() == width));
    }

    #[test]
    fn rendering_is_deterministic() {
        let game = GameDocument::from_value(json!({
            "board": { "points": [stacked(3, "white", 7), stacked(22, "black", 2)] }
        }))
        .unwrap();
        let first = render_board(&Board24::normalize(&game.board));
        let second = render_board(&Board24::normalize(&game.board));
        assert_eq!(first, second);
    }

    #[test]
    fn point_summary_lists_occupied_points() {
        let board = board_from(json!([stacked(6, "white", 5), stacked(1, "black", 1)]));
        assert_eq!(
            render_point_summary(&board),
            "Point 1: 1 black checker\nPoint 6: 5 white checkers\n"
        );
    }

    #[test]
    fn possible_moves_are_numbered() {
        assert_eq!(render_possible_moves(&[]), "No legal moves available.\n");
        let moves = [
            PossibleMove { from: 13, to: 10, die_value: 3 },
            PossibleMove { from: 8, to: 3, die_value: 5 },
        ];
        assert_eq!(
            render_possible_moves(&moves),
            "Possible moves:\n1. 13→10 (3)\n2. 8→3 (5)\n"
        );
    }
}
