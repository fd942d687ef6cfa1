/// The error type for [`find_checker_id()`](crate::find_checker_id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckerLookupError {
    InvalidPosition { position: u8 },
    NoActivePlayer,
    NoCheckerAtPosition { position: u8 },
}

impl std::error::Error for CheckerLookupError {}

impl std::fmt::Display for CheckerLookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckerLookupError::InvalidPosition { position } =>
                write!(f, "Position {} is not on the board, expected 1 to 24", position),
            CheckerLookupError::NoActivePlayer =>
                write!(f, "The game has no active player"),
            CheckerLookupError::NoCheckerAtPosition { position } =>
                write!(f, "No checker of the active player found at position {}", position),
        }
    }
}
