/// Display colors for board occupants.
///
/// The sixteen classic console colors. Documents store them by name
/// (`"Cyan"`); older level files written with numeric console indices
/// (`0..=15`) are accepted on read as well.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr")]
pub enum ObjectColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkCyan,
    DarkRed,
    DarkMagenta,
    DarkYellow,
    Gray,
    DarkGray,
    Blue,
    Green,
    Cyan,
    Red,
    Magenta,
    Yellow,
    White,
}

/// Console index order (matches the classic 4-bit palette).
const PALETTE: [ObjectColor; 16] = [
    ObjectColor::Black,
    ObjectColor::DarkBlue,
    ObjectColor::DarkGreen,
    ObjectColor::DarkCyan,
    ObjectColor::DarkRed,
    ObjectColor::DarkMagenta,
    ObjectColor::DarkYellow,
    ObjectColor::Gray,
    ObjectColor::DarkGray,
    ObjectColor::Blue,
    ObjectColor::Green,
    ObjectColor::Cyan,
    ObjectColor::Red,
    ObjectColor::Magenta,
    ObjectColor::Yellow,
    ObjectColor::White,
];

impl ObjectColor {
    pub fn name(self) -> &'static str {
        match self {
            ObjectColor::Black       => "Black",
            ObjectColor::DarkBlue    => "DarkBlue",
            ObjectColor::DarkGreen   => "DarkGreen",
            ObjectColor::DarkCyan    => "DarkCyan",
            ObjectColor::DarkRed     => "DarkRed",
            ObjectColor::DarkMagenta => "DarkMagenta",
            ObjectColor::DarkYellow  => "DarkYellow",
            ObjectColor::Gray        => "Gray",
            ObjectColor::DarkGray    => "DarkGray",
            ObjectColor::Blue        => "Blue",
            ObjectColor::Green       => "Green",
            ObjectColor::Cyan        => "Cyan",
            ObjectColor::Red         => "Red",
            ObjectColor::Magenta     => "Magenta",
            ObjectColor::Yellow      => "Yellow",
            ObjectColor::White       => "White",
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        PALETTE.get(index as usize).copied()
    }

    /// Case-insensitive; `Grey` spellings are accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim().to_ascii_lowercase().replace("grey", "gray");
        PALETTE.iter()
            .copied()
            .find(|c| c.name().to_ascii_lowercase() == wanted)
    }
}

impl Default for ObjectColor {
    fn default() -> Self {
        ObjectColor::White
    }
}

impl std::fmt::Display for ObjectColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Wire representation (read side only) ──

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Index(u8),
    Name(String),
}

impl TryFrom<ColorRepr> for ObjectColor {
    type Error = String;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Index(i) => ObjectColor::from_index(i)
                .ok_or_else(|| format!("console color index {} out of range 0..=15", i)),
            ColorRepr::Name(name) => ObjectColor::from_name(&name)
                .ok_or_else(|| format!("unknown color '{}'", name)),
        }
    }
}
