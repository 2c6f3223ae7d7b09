//! Ready-made implementations of the provider traits.
//!
//! - `fastembed`: local embedding generation via fastembed-rs
//! - `labeler`: HTTP labeling service client

pub mod fastembed;
pub mod labeler;

pub use fastembed::FastembedProvider;
pub use labeler::HttpLabelGenerator;
