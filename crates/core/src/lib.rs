//! Domain building blocks shared by the LUS labeler server and client.
//!
//! - [`label`] -- the three classification tokens and their transition graph.
//! - [`sequence_id`] -- raw and display encodings of sequence identifiers.
//! - [`frames`] -- playback time to frame index mapping.
//! - [`wire`] -- request/response schemas of the REST surface.
//! - [`library`] -- the on-disk patient/class/video tree.

pub mod error;
pub mod frames;
pub mod label;
pub mod library;
pub mod sequence_id;
pub mod types;
pub mod wire;
