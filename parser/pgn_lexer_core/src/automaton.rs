//! Finite-state classification of symbol runs.
//!
//! A symbol run is a maximal sequence of symbol characters (see
//! [`CharClass::is_symbol`](crate::CharClass::is_symbol)). One automaton
//! pass decides what the run is: a move number, a move, a tag name, a
//! castling move, or one of the three game-result markers. Runs that end
//! in a non-accepting state have no classification and are emitted as
//! unrecognized symbols.
//!
//! The transition function is a 2-D `const` table indexed by state and
//! symbol-class column; accepting-state membership is one test against a
//! `u64` bitmask (all states fit below 64).
//!
//! # Move shape
//!
//! The move grammar is the lenient SAN superset
//! `[KQRBNP]? [a-h]? [1-8]? x? [a-h][1-8] (=[KQRBN])? [+#]? [!?]{0,2}`
//! plus `O-O` and `O-O-O` with the same `[+#][!?]{0,2}` suffixes.
//! `O-O-O-O` dead-ends on the third dash and lexes as unrecognized.
//!
//! # Tag names and ambiguity
//!
//! A valid tag name is a letter followed by letters, digits, and
//! underscores. Many squares-and-letters moves (`e4`, `Nf3`, `exd5`) are
//! also valid tag names; those classify as [`Classification::Move`] with
//! `is_valid_tag_name` set so the parser can reinterpret them inside a
//! tag pair. Symbol runs that are tag-name-shaped but not move-shaped
//! (`Event`, `Nf3x`, single letters) classify as
//! [`Classification::TagName`].

use crate::char_class::{CharClass, SYMBOL_CLASS_COUNT};

/// What a completed symbol run is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// A run of digits.
    MoveNumber,
    /// A SAN-shaped move or castling move. `is_valid_tag_name` is set
    /// when the same characters also form a valid tag name.
    Move {
        /// The run is also a letter-led letters/digits/underscore run.
        is_valid_tag_name: bool,
    },
    /// A valid tag name that is not move-shaped.
    TagName,
    /// `1-0`
    WhiteWinMarker,
    /// `0-1`
    BlackWinMarker,
    /// `1/2-1/2`
    DrawMarker,
}

/// Automaton states. `Dead` traps; `Start` is the seed row and is never
/// re-entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
enum State {
    Dead = 0,
    Start = 1,
    /// `0` — move number, also `0-1` prefix.
    Num0 = 2,
    /// `1` — move number, also `1-0` and `1/2-1/2` prefix.
    Num1 = 3,
    /// Any other digit run.
    Num = 4,
    /// `1-`
    WinDash1 = 5,
    /// `0-`
    WinDash0 = 6,
    /// `1-0`
    WhiteWins = 7,
    /// `0-1`
    BlackWins = 8,
    /// `1/`
    Half1 = 9,
    /// `1/2`
    Half2 = 10,
    /// `1/2-`
    Half3 = 11,
    /// `1/2-1`
    Half4 = 12,
    /// `1/2-1/`
    Half5 = 13,
    /// `1/2-1/2`
    Draw = 14,
    /// `O`
    CastleO = 15,
    /// `O-`
    CastleDash1 = 16,
    /// `O-O`
    CastleShort = 17,
    /// `O-O-`
    CastleDash2 = 18,
    /// `O-O-O`
    CastleLong = 19,
    /// `P`
    PawnP = 20,
    /// `K` `Q` `R` `B` `N`
    Piece = 21,
    /// A file letter, optionally after a piece letter.
    File = 22,
    /// `x` seen; a target square must follow.
    Capture = 23,
    /// File letter of a forced target square (after `x`, a rank
    /// disambiguation, another file, or a full square).
    TargetFile = 24,
    /// Piece then rank digit (`N1`).
    RankDis = 25,
    /// A complete square — a well-formed move so far.
    Square = 26,
    /// `=` seen after a square.
    Promote = 27,
    /// Promotion piece seen.
    Promoted = 28,
    /// `+` or `#` suffix.
    Check = 29,
    /// First `!`/`?` suffix.
    Annot1 = 30,
    /// Second `!`/`?` suffix.
    Annot2 = 31,
    /// Valid tag name with no move interpretation left.
    TagName = 32,
}

const STATE_COUNT: usize = 33;

/// All states in discriminant order, for table construction.
const STATES: [State; STATE_COUNT] = [
    State::Dead,
    State::Start,
    State::Num0,
    State::Num1,
    State::Num,
    State::WinDash1,
    State::WinDash0,
    State::WhiteWins,
    State::BlackWins,
    State::Half1,
    State::Half2,
    State::Half3,
    State::Half4,
    State::Half5,
    State::Draw,
    State::CastleO,
    State::CastleDash1,
    State::CastleShort,
    State::CastleDash2,
    State::CastleLong,
    State::PawnP,
    State::Piece,
    State::File,
    State::Capture,
    State::TargetFile,
    State::RankDis,
    State::Square,
    State::Promote,
    State::Promoted,
    State::Check,
    State::Annot1,
    State::Annot2,
    State::TagName,
];

/// Symbol classes by column index (column 0 is never queried).
const COLUMNS: [CharClass; SYMBOL_CLASS_COUNT] = [
    CharClass::Illegal,
    CharClass::Digit0,
    CharClass::Digit1,
    CharClass::Digit2,
    CharClass::Digit3To8,
    CharClass::Digit9,
    CharClass::LetterO,
    CharClass::LetterP,
    CharClass::LetterPiece,
    CharClass::LetterUpper,
    CharClass::LetterFile,
    CharClass::LetterX,
    CharClass::LetterLower,
    CharClass::Dash,
    CharClass::Slash,
    CharClass::EqualsSign,
    CharClass::CheckSign,
    CharClass::Annotation,
];

/// `true` for letters, digits, and underscore (underscore shares the
/// lowercase class).
const fn is_name_char(class: CharClass) -> bool {
    matches!(
        class,
        CharClass::Digit0
            | CharClass::Digit1
            | CharClass::Digit2
            | CharClass::Digit3To8
            | CharClass::Digit9
            | CharClass::LetterO
            | CharClass::LetterP
            | CharClass::LetterPiece
            | CharClass::LetterUpper
            | CharClass::LetterFile
            | CharClass::LetterX
            | CharClass::LetterLower
    )
}

/// Fallthrough for states whose run is still a valid tag name: any
/// remaining name character keeps the tag-name interpretation alive,
/// everything else kills the run.
const fn tag_continue(class: CharClass) -> State {
    if is_name_char(class) {
        State::TagName
    } else {
        State::Dead
    }
}

const fn transition(state: State, class: CharClass) -> State {
    use CharClass as C;
    use State as S;
    match state {
        S::Dead => S::Dead,
        S::Start => match class {
            C::Digit0 => S::Num0,
            C::Digit1 => S::Num1,
            C::Digit2 | C::Digit3To8 | C::Digit9 => S::Num,
            C::LetterO => S::CastleO,
            C::LetterP => S::PawnP,
            C::LetterPiece => S::Piece,
            C::LetterFile => S::File,
            C::LetterX => S::Capture,
            C::LetterUpper | C::LetterLower => S::TagName,
            _ => S::Dead,
        },
        S::Num0 => match class {
            C::Digit0 | C::Digit1 | C::Digit2 | C::Digit3To8 | C::Digit9 => S::Num,
            C::Dash => S::WinDash0,
            _ => S::Dead,
        },
        S::Num1 => match class {
            C::Digit0 | C::Digit1 | C::Digit2 | C::Digit3To8 | C::Digit9 => S::Num,
            C::Dash => S::WinDash1,
            C::Slash => S::Half1,
            _ => S::Dead,
        },
        S::Num => match class {
            C::Digit0 | C::Digit1 | C::Digit2 | C::Digit3To8 | C::Digit9 => S::Num,
            _ => S::Dead,
        },
        S::WinDash1 => match class {
            C::Digit0 => S::WhiteWins,
            _ => S::Dead,
        },
        S::WinDash0 => match class {
            C::Digit1 => S::BlackWins,
            _ => S::Dead,
        },
        S::WhiteWins | S::BlackWins | S::Draw => S::Dead,
        S::Half1 => match class {
            C::Digit2 => S::Half2,
            _ => S::Dead,
        },
        S::Half2 => match class {
            C::Dash => S::Half3,
            _ => S::Dead,
        },
        S::Half3 => match class {
            C::Digit1 => S::Half4,
            _ => S::Dead,
        },
        S::Half4 => match class {
            C::Slash => S::Half5,
            _ => S::Dead,
        },
        S::Half5 => match class {
            C::Digit2 => S::Draw,
            _ => S::Dead,
        },
        S::CastleO => match class {
            C::Dash => S::CastleDash1,
            _ => tag_continue(class),
        },
        S::CastleDash1 => match class {
            C::LetterO => S::CastleShort,
            _ => S::Dead,
        },
        S::CastleShort => match class {
            C::Dash => S::CastleDash2,
            C::CheckSign => S::Check,
            C::Annotation => S::Annot1,
            _ => S::Dead,
        },
        S::CastleDash2 => match class {
            C::LetterO => S::CastleLong,
            _ => S::Dead,
        },
        // No dash transition here: O-O-O-O dead-ends.
        S::CastleLong => match class {
            C::CheckSign => S::Check,
            C::Annotation => S::Annot1,
            _ => S::Dead,
        },
        S::PawnP | S::Piece => match class {
            C::LetterFile => S::File,
            C::Digit1 | C::Digit2 | C::Digit3To8 => S::RankDis,
            C::LetterX => S::Capture,
            _ => tag_continue(class),
        },
        S::File => match class {
            C::Digit1 | C::Digit2 | C::Digit3To8 => S::Square,
            C::LetterX => S::Capture,
            C::LetterFile => S::TargetFile,
            _ => tag_continue(class),
        },
        S::Capture => match class {
            C::LetterFile => S::TargetFile,
            _ => tag_continue(class),
        },
        S::TargetFile => match class {
            C::Digit1 | C::Digit2 | C::Digit3To8 => S::Square,
            _ => tag_continue(class),
        },
        S::RankDis => match class {
            C::LetterFile => S::TargetFile,
            C::LetterX => S::Capture,
            _ => tag_continue(class),
        },
        S::Square => match class {
            C::EqualsSign => S::Promote,
            C::CheckSign => S::Check,
            C::Annotation => S::Annot1,
            C::LetterX => S::Capture,
            C::LetterFile => S::TargetFile,
            _ => tag_continue(class),
        },
        S::Promote => match class {
            C::LetterPiece => S::Promoted,
            _ => S::Dead,
        },
        S::Promoted => match class {
            C::CheckSign => S::Check,
            C::Annotation => S::Annot1,
            _ => S::Dead,
        },
        S::Check => match class {
            C::Annotation => S::Annot1,
            _ => S::Dead,
        },
        S::Annot1 => match class {
            C::Annotation => S::Annot2,
            _ => S::Dead,
        },
        S::Annot2 => S::Dead,
        S::TagName => tag_continue(class),
    }
}

/// The transition table, memoizing [`transition`] over every
/// (state, symbol column) pair.
static STEP: [[State; SYMBOL_CLASS_COUNT]; STATE_COUNT] = build_step_table();

const fn build_step_table() -> [[State; SYMBOL_CLASS_COUNT]; STATE_COUNT] {
    let mut table = [[State::Dead; SYMBOL_CLASS_COUNT]; STATE_COUNT];
    let mut s = 0;
    while s < STATE_COUNT {
        let mut c = 1;
        while c < SYMBOL_CLASS_COUNT {
            table[s][c] = transition(STATES[s], COLUMNS[c]);
            c += 1;
        }
        s += 1;
    }
    table
}

/// Accepting-state bitmask over state discriminants.
const ACCEPTING: u64 = (1 << State::Num0 as u8)
    | (1 << State::Num1 as u8)
    | (1 << State::Num as u8)
    | (1 << State::WhiteWins as u8)
    | (1 << State::BlackWins as u8)
    | (1 << State::Draw as u8)
    | (1 << State::CastleO as u8)
    | (1 << State::CastleShort as u8)
    | (1 << State::CastleLong as u8)
    | (1 << State::PawnP as u8)
    | (1 << State::Piece as u8)
    | (1 << State::File as u8)
    | (1 << State::Capture as u8)
    | (1 << State::TargetFile as u8)
    | (1 << State::RankDis as u8)
    | (1 << State::Square as u8)
    | (1 << State::Promoted as u8)
    | (1 << State::Check as u8)
    | (1 << State::Annot1 as u8)
    | (1 << State::Annot2 as u8)
    | (1 << State::TagName as u8);

/// One in-flight symbol run.
///
/// Seed with the run's first character class, [`step`](Self::step) the
/// rest, then read the [`classification`](Self::classification).
#[derive(Clone, Copy, Debug)]
pub struct SymbolAutomaton {
    state: State,
}

impl SymbolAutomaton {
    /// Start a run on its first character.
    #[inline]
    #[must_use]
    pub fn start(class: CharClass) -> Self {
        debug_assert!(class.is_symbol(), "symbol runs start on symbol characters");
        SymbolAutomaton {
            state: STEP[State::Start as usize][class.symbol_index()],
        }
    }

    /// Feed the next character of the run.
    #[inline]
    pub fn step(&mut self, class: CharClass) {
        debug_assert!(class.is_symbol(), "symbol runs contain symbol characters");
        self.state = STEP[self.state as usize][class.symbol_index()];
    }

    /// Classification of the completed run, or `None` when the run is
    /// not a recognized symbol.
    #[must_use]
    pub fn classification(self) -> Option<Classification> {
        use State as S;
        if (ACCEPTING & (1u64 << (self.state as u8))) == 0 {
            return None;
        }
        Some(match self.state {
            S::Num0 | S::Num1 | S::Num => Classification::MoveNumber,
            S::WhiteWins => Classification::WhiteWinMarker,
            S::BlackWins => Classification::BlackWinMarker,
            S::Draw => Classification::DrawMarker,
            S::CastleShort | S::CastleLong => Classification::Move {
                is_valid_tag_name: false,
            },
            // A bare square is letters and digits throughout, so it
            // doubles as a tag name; suffixed shapes never do.
            S::Square => Classification::Move {
                is_valid_tag_name: true,
            },
            S::Promoted | S::Check | S::Annot1 | S::Annot2 => Classification::Move {
                is_valid_tag_name: false,
            },
            S::CastleO | S::PawnP | S::Piece | S::File | S::Capture | S::TargetFile
            | S::RankDis | S::TagName => Classification::TagName,
            // Non-accepting states are filtered by the mask above.
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::char_class::classify;

    /// Run the automaton over a complete symbol string.
    fn run(symbol: &str) -> Option<Classification> {
        let mut chars = symbol.chars();
        let first = chars.next()?;
        let mut machine = SymbolAutomaton::start(classify(first));
        for c in chars {
            machine.step(classify(c));
        }
        machine.classification()
    }

    const MOVE_AND_NAME: Option<Classification> = Some(Classification::Move {
        is_valid_tag_name: true,
    });
    const MOVE_ONLY: Option<Classification> = Some(Classification::Move {
        is_valid_tag_name: false,
    });

    #[test]
    fn move_numbers() {
        for n in ["0", "1", "2", "9", "10", "37", "100", "999"] {
            assert_eq!(run(n), Some(Classification::MoveNumber), "{n:?}");
        }
    }

    #[test]
    fn game_result_markers() {
        assert_eq!(run("1-0"), Some(Classification::WhiteWinMarker));
        assert_eq!(run("0-1"), Some(Classification::BlackWinMarker));
        assert_eq!(run("1/2-1/2"), Some(Classification::DrawMarker));
    }

    #[test]
    fn marker_prefixes_are_not_markers() {
        for s in ["1-", "0-", "1/", "1/2", "1/2-", "1/2-1", "1/2-1/"] {
            assert_eq!(run(s), None, "{s:?}");
        }
    }

    #[test]
    fn marker_lookalikes_rejected() {
        for s in ["0-0", "2-0", "1-1", "1-00", "1/2-1/22", "1/2-0/2"] {
            assert_eq!(run(s), None, "{s:?}");
        }
    }

    #[test]
    fn castling() {
        assert_eq!(run("O-O"), MOVE_ONLY);
        assert_eq!(run("O-O-O"), MOVE_ONLY);
        assert_eq!(run("O-O+"), MOVE_ONLY);
        assert_eq!(run("O-O-O#!"), MOVE_ONLY);
    }

    #[test]
    fn four_castles_dead_ends() {
        assert_eq!(run("O-O-O-O"), None);
        assert_eq!(run("O-O-O-"), None);
        assert_eq!(run("O-"), None);
        assert_eq!(run("O-O-"), None);
    }

    #[test]
    fn pawn_moves() {
        for m in ["e4", "a1", "h8", "d5", "exd5", "ed5"] {
            assert_eq!(run(m), MOVE_AND_NAME, "{m:?}");
        }
        for m in ["e8=Q", "exd8=N", "e4+", "e4#", "e4!", "e4!?", "e8=Q+??"] {
            assert_eq!(run(m), MOVE_ONLY, "{m:?}");
        }
    }

    #[test]
    fn piece_moves() {
        for m in ["Nf3", "Qd1", "Kxe1", "Nbd2", "N1d2", "Rab1", "Qh4xe1", "Qh4e1", "Pe4"] {
            assert_eq!(run(m), MOVE_AND_NAME, "{m:?}");
        }
        for m in ["Nf3+", "Qd8#!", "Nxf3!?"] {
            assert_eq!(run(m), MOVE_ONLY, "{m:?}");
        }
    }

    #[test]
    fn bare_capture_square_is_a_move() {
        // Leading optionals make `x`-led captures legal move shapes.
        assert_eq!(run("xe5"), MOVE_AND_NAME);
    }

    #[test]
    fn invalid_ranks_fall_back_to_tag_names() {
        assert_eq!(run("e9"), Some(Classification::TagName));
        assert_eq!(run("e0"), Some(Classification::TagName));
    }

    #[test]
    fn tag_names() {
        for n in [
            "Event", "Site", "Date", "Round", "White", "BlackElo", "White_Elo", "a", "x", "O",
            "P", "N", "Nf3x", "e44", "OO", "annotator2", "Höfer",
        ] {
            assert_eq!(run(n), Some(Classification::TagName), "{n:?}");
        }
    }

    #[test]
    fn underscore_may_lead_a_tag_name() {
        // Underscore shares the lowercase class, a quirk the classifier
        // keeps: `_x` runs like any lowercase-led name.
        assert_eq!(run("_private"), Some(Classification::TagName));
    }

    #[test]
    fn unrecognized_symbols() {
        for s in [
            "-", "--", "1e4", "e8=", "e8=P", "e8=O", "e4++", "e4!?!", "Nf3-", "Event-1",
            "1/2-1/2x", "1-0x",
        ] {
            assert_eq!(run(s), None, "{s:?}");
        }
    }

    #[test]
    fn classification_is_copy_and_stable() {
        let first = run("Nf3");
        let second = run("Nf3");
        assert_eq!(first, second);
    }
}
