use thiserror::Error;

#[derive(Debug, Error)]
pub enum PiecesError {
    // Construction invariants
    #[error("negative {field} count: {value}")]
    NegativeCount { field: &'static str, value: i64 },

    #[error("tier ratios must be finite, non-negative and sum to 1.0 (got {0})")]
    RatioSum(f64),

    #[error("quota fields sum to {sum} but total is {total}")]
    QuotaSumMismatch { sum: u64, total: u64 },

    #[error("invalid position key {0}: must be finite and greater than zero")]
    InvalidPosition(f64),

    // Ordering
    #[error("ordering violation: before ({before}) must be less than after ({after})")]
    OrderingViolation { before: f64, after: f64 },

    #[error("item '{0}' cannot be its own neighbour")]
    SelfReference(String),

    #[error("neighbours are not consecutive: blocked by {}", .0.join(", "))]
    NotConsecutive(Vec<String>),

    #[error("no room for a new position between {before:?} and {after:?}: renumber the group")]
    PositionExhausted {
        before: Option<f64>,
        after: Option<f64>,
    },

    // Lookups
    #[error("item not found in group '{group}': {id}")]
    ItemNotFound { group: String, id: String },

    #[error("item {id} belongs to group '{found}', not '{expected}'")]
    GroupMismatch {
        expected: String,
        found: String,
        id: String,
    },

    #[error("piece not found: {0}")]
    PieceNotFound(String),

    #[error("piece already exists: {0}")]
    PieceExists(String),

    #[error("problem not found: {0}")]
    ProblemNotFound(String),

    #[error("problem already exists: {0}")]
    ProblemExists(String),

    #[error("problem '{0}' is already in this piece")]
    DuplicateMember(String),

    #[error("invalid slug '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("invalid tier: {0}")]
    InvalidTier(String),

    #[error("invalid skill profile: {0}")]
    InvalidProfile(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PiecesError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PiecesError::ItemNotFound { .. }
                | PiecesError::PieceNotFound(_)
                | PiecesError::ProblemNotFound(_)
        )
    }

    /// True for rejections caused by the requested order itself rather than
    /// by missing data or I/O.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            PiecesError::OrderingViolation { .. }
                | PiecesError::SelfReference(_)
                | PiecesError::NotConsecutive(_)
                | PiecesError::PositionExhausted { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PiecesError>;
