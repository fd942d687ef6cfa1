use crate::{CheckerLookupError, GameDocument};

/// Finds the checker the active player would move from `position`.
///
/// `position` is in the active player's own numbering. The result is the
/// id of the topmost checker of the active color on that point.
pub fn find_checker_id(game: &GameDocument, position: u8) -> Result<String, CheckerLookupError> {
    if !(1..=24).contains(&position) {
        return Err(CheckerLookupError::InvalidPosition { position });
    }
    let player = game
        .active_player()
        .ok_or(CheckerLookupError::NoActivePlayer)?;
    let not_found = CheckerLookupError::NoCheckerAtPosition { position };
    let (Some(direction), Some(color)) = (player.direction, player.color) else {
        return Err(not_found);
    };

    game.board
        .points
        .iter()
        .filter(|point| point.position.in_direction(direction) == Some(position))
        .flat_map(|point| point.checkers.iter().rev())
        .filter(|checker| checker.color == Some(color))
        .find_map(|checker| checker.id.clone())
        .ok_or(not_found)
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;
    use serde_json::json;

    use super::*;
    use crate::{Direction, Position};

    fn game(direction: &str, points: serde_json::Value) -> GameDocument {
        GameDocument::from_value(json!({
            "activeColor": "black",
            "players": [
                { "color": "white", "direction": "clockwise" },
                { "color": "black", "direction": direction }
            ],
            "board": { "points": points }
        }))
        .unwrap()
    }

    quickcheck! {
        fn finds_checker_in_own_numbering(direction: Direction, clockwise: u8) -> bool {
            let clockwise = clockwise % 24 + 1;
            let position = Position::from_clockwise(clockwise);
            let own = position.in_direction(direction).unwrap();
            let game = game(direction.as_str(), json!([{
                "position": { "clockwise": clockwise, "counterclockwise": 25 - clockwise },
                "checkers": [{ "id": "c1", "color": "black" }]
            }]));
            find_checker_id(&game, own) == Ok(String::from("c1"))
        }
    }

    #[test]
    fn picks_the_topmost_checker_of_the_active_color() {
        let game = game(
            "counterclockwise",
            json!([{
                "position": { "clockwise": 1, "counterclockwise": 24 },
                "checkers": [
                    { "id": "b1", "color": "black" },
                    { "id": "b2", "color": "black" },
                    { "id": "w1", "color": "white" }
                ]
            }]),
        );
        assert_eq!(find_checker_id(&game, 24), Ok(String::from("b2")));
    }

    #[test]
    fn reports_why_nothing_was_found() {
        let game = game(
            "clockwise",
            json!([{
                "position": { "clockwise": 6, "counterclockwise": 19 },
                "checkers": [{ "id": "w1", "color": "white" }]
            }]),
        );
        assert_eq!(
            find_checker_id(&game, 6),
            Err(CheckerLookupError::NoCheckerAtPosition { position: 6 })
        );
        assert_eq!(
            find_checker_id(&game, 0),
            Err(CheckerLookupError::InvalidPosition { position: 0 })
        );
        assert_eq!(
            find_checker_id(&GameDocument::default(), 6),
            Err(CheckerLookupError::NoActivePlayer)
        );
    }
}
