/// Tab group color palette
use serde::{Deserialize, Serialize};
use std::fmt;

/// The nine colors Chrome accepts for a tab group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    Grey,
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
}

/// Palette in fallback order
pub const PALETTE: [GroupColor; 9] = [
    GroupColor::Grey,
    GroupColor::Blue,
    GroupColor::Red,
    GroupColor::Yellow,
    GroupColor::Green,
    GroupColor::Pink,
    GroupColor::Purple,
    GroupColor::Cyan,
    GroupColor::Orange,
];

impl GroupColor {
    pub fn name(self) -> &'static str {
        match self {
            GroupColor::Grey => "grey",
            GroupColor::Blue => "blue",
            GroupColor::Red => "red",
            GroupColor::Yellow => "yellow",
            GroupColor::Green => "green",
            GroupColor::Pink => "pink",
            GroupColor::Purple => "purple",
            GroupColor::Cyan => "cyan",
            GroupColor::Orange => "orange",
        }
    }

    /// Exact, case-sensitive match against the palette names
    pub fn from_name(name: &str) -> Option<GroupColor> {
        PALETTE.iter().copied().find(|color| color.name() == name)
    }

    /// Swatch color used by the popup
    pub fn hex(self) -> &'static str {
        match self {
            GroupColor::Grey => "#5f6368",
            GroupColor::Blue => "#1a73e8",
            GroupColor::Red => "#d93025",
            GroupColor::Yellow => "#f9ab00",
            GroupColor::Green => "#34a853",
            GroupColor::Pink => "#f538a0",
            GroupColor::Purple => "#a142f4",
            GroupColor::Cyan => "#24c1e0",
            GroupColor::Orange => "#fa903e",
        }
    }
}

impl fmt::Display for GroupColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pick the proposed color if it names a palette entry, otherwise
/// fall back to the palette slot for the proposal's position.
pub fn resolve_color(proposed: Option<&str>, index: usize) -> GroupColor {
    proposed
        .and_then(GroupColor::from_name)
        .unwrap_or(PALETTE[index % PALETTE.len()])
}
