//! # multicrop
//!
//! Crop one photo into a fixed set of shapes: a square, a 16:9 landscape and a
//! 9:16 portrait. The square can additionally be delivered with a coloured
//! frame and as a circular PNG with transparent corners. Results are bundled
//! into one ZIP or saved one file at a time.
//!
//! # Pipeline
//!
//! ```text
//! image file ──source──▶ ImageSource
//!                          │
//!            crop controllers (one per aspect) ──▶ AppState.crops
//!                          │
//!            export: plan ──▶ render (Compositor) ──▶ deliver (archive | sequential)
//! ```
//!
//! Crop interactions update state synchronously; previews are a derived,
//! debounced render of the same crop. Export renders every enabled variant in
//! sequence and delivers nothing unless all of them succeeded.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`source`] | Load and decode the single input image, optional rotation/flip |
//! | [`crop`] | Pan/zoom crop controllers, debounced preview requests, CLI crop specs |
//! | [`imaging`] | Compositor trait and the tiny-skia backend: clip, draw, frame, encode |
//! | [`variant`] | Aspect ratios and the five output variants |
//! | [`state`] | Explicit application state and the events that change it |
//! | [`session`] | Top-level controller tying state, controllers and export together |
//! | [`export`] | Plan, render all-or-nothing, deliver through a [`SaveSink`](export::SaveSink) |
//! | [`archive`] | ZIP bundling for archive delivery |
//! | [`naming`] | Output file names from the custom or original name |
//! | [`config`] | `config.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//! | [`types`] | `OutputArtifact` and its report summary |
//!
//! # Design Decisions
//!
//! ## One Authoritative Crop
//!
//! Each controller keeps exactly one crop rectangle. The preview is computed
//! from it after a quiet period rather than tracked as a second value, so an
//! export always sees the crop the user last set, even if its preview has not
//! rendered yet.
//!
//! ## PNG Only Where Transparency Matters
//!
//! The circular variant is PNG so the corners outside the clip stay
//! transparent. Every other variant is JPEG, which flattens to an opaque
//! background.
//!
//! ## All or Nothing
//!
//! A failed render aborts the whole export with a single user-facing message.
//! There is no partial delivery and no retry.

pub mod archive;
pub mod config;
pub mod crop;
pub mod export;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod session;
pub mod source;
pub mod state;
pub mod types;
pub mod variant;

#[cfg(test)]
pub(crate) mod test_helpers;
