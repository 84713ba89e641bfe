use thiserror::Error;

mod segment;
pub use segment::*;
mod metrics;
pub use metrics::*;
pub mod options;
mod commands;
pub use commands::*;
mod numbering;
pub use numbering::*;
mod spans;
pub use spans::*;
mod assets;
pub use assets::*;
mod history;
pub use history::*;
mod session;
pub use session::*;

/// Deepest indentation a segment can have. Numbering keeps one counter per level.
pub const MAX_LEVEL: u8 = 5;

/// Text given to segments created by [`EditCommand::Add`].
pub const NEW_SEGMENT_TEXT: &str = "New Segment";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoryboardError {
    #[error("{kind} span at segment {segment} would overlap the span started by {owner}")]
    MediaOverlap {
        kind: MediaKind,
        segment: SegmentId,
        owner: SegmentId,
    },
    #[error("metric key `{0}` collides with a segment field")]
    InvalidMetricKey(String),
}
