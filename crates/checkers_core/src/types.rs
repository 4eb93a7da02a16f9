use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Piece and arm colours. `None` doubles as "empty cell" and "no player".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Color {
    None,
    Red,
    Green,
    Blue,
    Yellow,
    Orange,
    Violet,
}

impl Color {
    /// The six player colours, in arm order.
    pub const PLAYERS: [Color; 6] = [
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::Yellow,
        Color::Orange,
        Color::Violet,
    ];

    pub fn is_none(self) -> bool {
        self == Color::None
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Color::None => "NONE",
            Color::Red => "RED",
            Color::Green => "GREEN",
            Color::Blue => "BLUE",
            Color::Yellow => "YELLOW",
            Color::Orange => "ORANGE",
            Color::Violet => "VIOLET",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NONE" => Ok(Color::None),
            "RED" => Ok(Color::Red),
            "GREEN" => Ok(Color::Green),
            "BLUE" => Ok(Color::Blue),
            "YELLOW" => Ok(Color::Yellow),
            "ORANGE" => Ok(Color::Orange),
            "VIOLET" => Ok(Color::Violet),
            other => Err(format!("unknown color: {other}")),
        }
    }
}

/// A 1-based (column, row) position on the board grid.
///
/// Components are signed so that protocol input such as `-1` parses into a
/// coordinate that is simply reported as off-board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Rows alternate their horizontal shift; even rows lean right.
    pub fn is_even_row(self) -> bool {
        self.y.rem_euclid(2) == 0
    }

    /// Straight-line distance in grid units.
    pub fn distance(self, other: Coord) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

/// Outcome of classifying a requested hop.
///
/// The discriminants are the hop distance: 0 illegal, 1 step, 2 jump.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MoveClass {
    #[default]
    Illegal = 0,
    Step = 1,
    Jump = 2,
}

impl MoveClass {
    pub fn is_legal(self) -> bool {
        self != MoveClass::Illegal
    }

    pub fn distance(self) -> u8 {
        self as u8
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Coord,
    pub to: Coord,
}

impl Move {
    pub fn new(from: Coord, to: Coord) -> Self {
        Self { from, to }
    }
}

/// Ruleset family. Picked once when a match is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Default,
    Diamond,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Default => "default",
            Variant::Diamond => "diamond",
        }
    }

    /// Whose pieces must end up in `arm`'s cells.
    pub fn target_of(self, arm: Color) -> Color {
        match self {
            Variant::Default => match arm {
                Color::Red => Color::Green,
                Color::Green => Color::Red,
                Color::Blue => Color::Orange,
                Color::Yellow => Color::Violet,
                Color::Orange => Color::Blue,
                Color::Violet => Color::Yellow,
                Color::None => Color::None,
            },
            Variant::Diamond => match arm {
                Color::Red => Color::Violet,
                Color::Green => Color::Orange,
                Color::Blue => Color::Yellow,
                Color::Yellow => Color::Blue,
                Color::Orange => Color::Green,
                Color::Violet => Color::Red,
                Color::None => Color::None,
            },
        }
    }

    /// The arm `color` is racing towards. Both pairings are involutions, so
    /// this is the same lookup as `target_of`.
    pub fn home_arm(self, color: Color) -> Color {
        self.target_of(color)
    }

    pub fn has_kings(self) -> bool {
        self == Variant::Diamond
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Variant::Default),
            "diamond" => Ok(Variant::Diamond),
            other => Err(format!("unknown variant: {other}")),
        }
    }
}

/// Colours in seat order for a given seat count, or `None` when the board has
/// no layout for that many players.
pub fn seat_colors(seats: usize) -> Option<&'static [Color]> {
    const ONE: [Color; 1] = [Color::Red];
    const TWO: [Color; 2] = [Color::Red, Color::Green];
    const THREE: [Color; 3] = [Color::Red, Color::Blue, Color::Yellow];
    const FOUR: [Color; 4] = [Color::Blue, Color::Yellow, Color::Violet, Color::Orange];
    const SIX: [Color; 6] = [
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::Orange,
        Color::Yellow,
        Color::Violet,
    ];
    match seats {
        1 => Some(&ONE),
        2 => Some(&TWO),
        3 => Some(&THREE),
        4 => Some(&FOUR),
        6 => Some(&SIX),
        _ => None,
    }
}
