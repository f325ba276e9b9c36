//! Clipline UI - Timeline surface geometry and pointer interaction
//!
//! Headless: this crate decides where clips land in pixels and what pointer
//! gestures mean, leaving the actual drawing and event plumbing to whatever
//! chrome embeds it.

pub mod interaction;
pub mod layout;
pub mod trim;

pub use interaction::{InteractionAction, InteractionState, TimelineInteraction};
pub use layout::{TimelineLayout, RESIZE_HANDLE_WIDTH};
pub use trim::hit_test_resize_handle;
