//! # Mink GC
//!
//! Slot-arena heap with stop-the-world mark/sweep collection.
//!
//! ## Design
//!
//! - **Arena storage**: objects live in a `Vec` of slots; handles are slot
//!   indices, so access is bounds-checked rather than pointer-based
//! - **Free list**: swept slots are reused before the arena grows
//! - **Advisory trigger**: collection runs when the embedder asks for it or
//!   when the allocation-count watermark is crossed

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod heap;

pub use heap::{GcConfig, GcStats, Handle, Heap, Trace};
