/// Fatal level-loading failures. The simulation itself has no recoverable
/// error surface; everything that can go wrong is caught here at load time.
#[derive(Debug, Clone, PartialEq)]
pub enum LevelError {
    EmptyGrid,
    InvalidTileSize(f32),
    IrregularRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    MissingPortal,
    Io(String),
    Parse(String),
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "level grid has no cells"),
            Self::InvalidTileSize(size) => write!(f, "invalid tile size: {size}"),
            Self::IrregularRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {row} has {found} cells, expected {expected} (grid must be rectangular)"
            ),
            Self::MissingPortal => write!(f, "level has no portal anchor ('4')"),
            Self::Io(e) => write!(f, "failed to read level: {e}"),
            Self::Parse(e) => write!(f, "failed to parse level: {e}"),
        }
    }
}

impl std::error::Error for LevelError {}
