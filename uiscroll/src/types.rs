/// Direction along the scroll axis.
///
/// `Backward` points toward lower indexes (above/left of the rendered window), `Forward`
/// toward higher indexes (below/right of it).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Backward,
    Forward,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Self::Backward => Self::Forward,
            Self::Forward => Self::Backward,
        }
    }
}

/// Who caused a scroll event observed by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollOrigin {
    /// Real user input (wheel, drag, keyboard).
    User,
    /// The tail of a write made by the engine itself; the workflow should skip it.
    Synthetic,
}
