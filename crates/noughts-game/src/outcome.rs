//! Outcome evaluation: has anyone won, is it a draw, or does play go on?

use noughts_protocol::{Board, Symbol, Verdict};

/// The eight cell triples that win: three rows, three columns, two diagonals.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Result of evaluating a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No winner and at least one empty cell.
    Pending,
    Winner(Symbol),
    /// Full board, no winning line.
    Draw,
}

impl Outcome {
    /// `true` for a win or a draw.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// The `winner` field of a `gameOver` frame, if the game is over.
    pub fn verdict(self) -> Option<Verdict> {
        match self {
            Self::Pending => None,
            Self::Winner(symbol) => Some(symbol.into()),
            Self::Draw => Some(Verdict::Draw),
        }
    }
}

/// Evaluates a board. Pure and total.
pub fn evaluate(board: &Board) -> Outcome {
    for [a, b, c] in WINNING_LINES {
        if let Some(symbol) = board.get(a) {
            if board.get(b) == Some(symbol) && board.get(c) == Some(symbol) {
                return Outcome::Winner(symbol);
            }
        }
    }
    if board.is_full() {
        Outcome::Draw
    } else {
        Outcome::Pending
    }
}
