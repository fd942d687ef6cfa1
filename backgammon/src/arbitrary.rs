use crate::{Color, Direction};

/// A single point holding a stack of one color.
#[derive(Clone, Debug)]
pub struct StackedPoint {
    /// Clockwise, in 1..=24.
    pub point: u8,
    pub color: Color,
    /// In 0..=30.
    pub count: usize,
}

impl quickcheck::Arbitrary for StackedPoint {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        StackedPoint {
            point: u8::arbitrary(g) % 24 + 1,
            color: Color::arbitrary(g),
            count: usize::arbitrary(g) % 31,
        }
    }
}

impl quickcheck::Arbitrary for Color {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        *g.choose(&[Color::White, Color::Black]).unwrap()
    }
}

impl quickcheck::Arbitrary for Direction {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        *g.choose(&[Direction::Clockwise, Direction::Counterclockwise])
            .unwrap()
    }
}
