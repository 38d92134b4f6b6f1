pub mod catalog;
pub mod config;
pub mod distribution;
pub mod document;
pub mod error;
pub mod ordering;
pub mod paths;
pub mod piece;
pub mod position;
pub mod service;
pub mod store;
pub mod types;

pub use distribution::{plan_distribution, AvailableCounts, DistributionQuota};
pub use error::{PiecesError, Result};
pub use ordering::{OrderedItem, OrderedItemCollection, ReorderCoordinator};
pub use position::{between, PositionKey};
pub use service::{reorder, select_problems, ReorderOutcome, Selection};
pub use types::{SkillProfile, Tier};
