//! Clipline Playback - Driving a single media surface across many clips
//!
//! Playback presents the arrangement as one continuous piece of media even
//! though only one clip's source is loaded at a time. [`sync`] holds the
//! pure math mapping the global clock to per-clip local time; [`Player`]
//! applies it to an abstract [`MediaSurface`], sequencing loads, seeks, and
//! clip hand-offs off the surface's own events.

pub mod player;
pub mod sync;

pub use player::{MediaSurface, Player, PlayerSignal, SurfaceEvent};
pub use sync::{
    advance, global_time_of, plan_seek, resolve, Advance, PlaybackPosition, PlaybackRestriction,
    SeekPlan,
};
