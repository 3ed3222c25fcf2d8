//! Global keyboard shortcuts.

/// A key relevant to the annotation screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Toggle play-all.
    Space,
    /// Toggle repeat (`r` or `R`).
    Repeat,
    Other,
}

impl Key {
    /// Map a key name as reported by the input layer (`" "`, `"Space"`,
    /// `"r"`, `"R"`, ...).
    pub fn from_name(name: &str) -> Self {
        match name {
            " " | "Space" | "Spacebar" => Self::Space,
            "r" | "R" | "KeyR" => Self::Repeat,
            _ => Self::Other,
        }
    }
}
