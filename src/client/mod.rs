//! Client-side cache synchronization.
//!
//! The web and desktop front ends keep paginated feed results and profile
//! snapshots in memory and patch them on mutation success instead of
//! refetching. These reducers are pure: they take an immutable snapshot and
//! an event and return the next snapshot, sharing every untouched page by
//! reference so view layers can skip redraws on pointer equality.
//!
//! The patches are a display-only approximation. They do not reconcile
//! against concurrent edits by other viewers and drift from server truth
//! until the next full page fetch.

pub mod feed_cache;
pub mod profile_cache;
