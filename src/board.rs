use std::fmt;

use cozy_chess::util::display_uci_move;
use cozy_chess::{Board, Color, File, Move, Piece, Rank, Square};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PositionError {
    #[error("invalid FEN {fen:?}: {reason}")]
    InvalidFen { fen: String, reason: String },
    #[error("illegal move {uci:?} in {fen}")]
    IllegalMove { uci: String, fen: String },
}

/// Wrapper around the rules library. `apply` hands back a new position so
/// search branches never share mutable state.
#[derive(Clone, Debug)]
pub struct Position {
    board: Board,
}

impl Position {
    pub fn startpos() -> Self {
        Self { board: Board::default() }
    }

    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        Board::from_fen(fen, false)
            .map(|board| Self { board })
            .map_err(|e| PositionError::InvalidFen { fen: fen.to_string(), reason: format!("{e:?}") })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn fen(&self) -> String {
        format!("{}", self.board)
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn in_check(&self) -> bool {
        !self.board.checkers().is_empty()
    }

    /// All legal moves in the generator's order. The order is stable for a
    /// given position, which the root tie-break relies on.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        self.board.generate_moves(|ml| {
            for m in ml {
                moves.push(m);
            }
            false
        });
        moves
    }

    pub fn has_legal_moves(&self) -> bool {
        let mut any = false;
        self.board.generate_moves(|ml| {
            if ml.len() > 0 {
                any = true;
            }
            any
        });
        any
    }

    /// Play `mv` on a copy. `mv` must come from `legal_moves`.
    pub fn apply(&self, mv: Move) -> Position {
        let mut board = self.board.clone();
        board.play(mv);
        Position { board }
    }

    pub fn apply_uci(&self, uci: &str) -> Result<Position, PositionError> {
        let mv = self.find_uci(uci).ok_or_else(|| PositionError::IllegalMove {
            uci: uci.to_string(),
            fen: self.fen(),
        })?;
        Ok(self.apply(mv))
    }

    /// Standard UCI rendering of `mv` (castling as e1g1, not king-takes-rook).
    pub fn uci(&self, mv: Move) -> String {
        display_uci_move(&self.board, mv).to_string()
    }

    /// Look a UCI string up among the legal moves.
    pub fn find_uci(&self, uci: &str) -> Option<Move> {
        let mut found = None;
        self.board.generate_moves(|ml| {
            for m in ml {
                if display_uci_move(&self.board, m).to_string() == uci {
                    found = Some(m);
                    break;
                }
            }
            found.is_some()
        });
        found
    }

    pub fn is_capture(&self, mv: Move) -> bool {
        let them = self.board.colors(!self.board.side_to_move());
        if them.has(mv.to) {
            return true;
        }
        // en passant: a pawn leaves its file onto an empty square
        self.board.piece_on(mv.from) == Some(Piece::Pawn)
            && mv.from.file() != mv.to.file()
            && self.board.piece_on(mv.to).is_none()
    }

    pub fn is_checkmate(&self) -> bool {
        self.in_check() && !self.has_legal_moves()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.in_check() && !self.has_legal_moves()
    }

    /// Neither side can mate: bare kings, a lone minor piece, or bishops on
    /// one square color only. Two knights against a bare king still count as
    /// mating material.
    pub fn is_insufficient_material(&self) -> bool {
        for piece in [Piece::Pawn, Piece::Rook, Piece::Queen] {
            if !self.board.pieces(piece).is_empty() {
                return false;
            }
        }
        let knights = self.board.pieces(Piece::Knight);
        let bishops = self.board.pieces(Piece::Bishop);
        let minors = knights.into_iter().count() + bishops.into_iter().count();
        if minors <= 1 {
            return true;
        }
        if !knights.is_empty() {
            return false;
        }
        let dark = bishops.into_iter().filter(|&sq| is_dark(sq)).count();
        dark == 0 || dark == minors
    }

    pub fn piece_count(&self) -> usize {
        self.board.occupied().into_iter().count()
    }

    pub fn piece_count_of(&self, color: Color) -> usize {
        self.board.colors(color).into_iter().count()
    }

    pub fn halfmove_clock(&self) -> u8 {
        self.board.halfmove_clock()
    }

    pub fn hash(&self) -> u64 {
        self.board.hash()
    }

    /// Plain-text diagram, rank 8 at the top.
    pub fn ascii(&self) -> String {
        let mut out = String::new();
        for rank in (0..8).rev() {
            out.push_str(&format!("{} ", rank + 1));
            for file in 0..8 {
                let sq = Square::new(File::index(file), Rank::index(rank));
                let cell = match (self.board.piece_on(sq), self.board.color_on(sq)) {
                    (Some(piece), Some(color)) => piece_char(piece, color),
                    _ => '.',
                };
                out.push(cell);
                out.push(' ');
            }
            out.push('\n');
        }
        out.push_str("  a b c d e f g h\n");
        out
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board)
    }
}

fn is_dark(sq: Square) -> bool {
    (sq.file() as usize + sq.rank() as usize) % 2 == 0
}

fn piece_char(piece: Piece, color: Color) -> char {
    let c = match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    };
    if color == Color::White {
        c.to_ascii_uppercase()
    } else {
        c
    }
}
