pub mod matcher;
pub mod report;
pub mod resolver;
pub(crate) mod similarity;

pub use matcher::{Association, MatchEngine, MatchStrategy, DEFAULT_FUZZY_THRESHOLD};
pub use report::{build_report, ReconciliationReport};
pub use resolver::{resolve, AmbiguousGroup, Decider, GroupKey, MapDecider, Resolution};
