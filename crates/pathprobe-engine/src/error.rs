use std::fmt;

/// Errors that abort an analyzer operation.
///
/// Per-measurement problems (an unavailable occlusion query, a zero-area
/// obstacle) are not errors; they degrade the affected entry of the result
/// instead. See [`crate::analyzer::PixelCount`] and
/// [`crate::analyzer::Assignment::ratio`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzerError {
    /// The render surface, device, or pixel counter could not be set up.
    Initialization(String),

    /// A lane's left and right boundaries have different station counts.
    ShapeMismatch {
        lane_id: i64,
        left: usize,
        right: usize,
    },

    /// A region has too few points to cover any area.
    DegenerateRegion { region_id: i64, reason: String },
}

impl AnalyzerError {
    pub(crate) fn init(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Returns `true` for errors that make the analyzer unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Initialization(_))
    }
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialization(msg) => write!(f, "initialization failed: {msg}"),
            Self::ShapeMismatch { lane_id, left, right } => write!(
                f,
                "lane {lane_id}: left boundary has {left} points but right boundary has {right}"
            ),
            Self::DegenerateRegion { region_id, reason } => {
                write!(f, "region {region_id} is degenerate: {reason}")
            }
        }
    }
}

impl std::error::Error for AnalyzerError {}

impl From<anyhow::Error> for AnalyzerError {
    fn from(err: anyhow::Error) -> Self {
        // `{:#}` keeps the context chain on one line.
        Self::Initialization(format!("{err:#}"))
    }
}

pub type Result<T, E = AnalyzerError> = std::result::Result<T, E>;
