//! Cover image normalization.
//!
//! Turns an arbitrary uploaded photograph into the canonical book-cover
//! thumbnail: upright, opaque, exactly 2:3, within the configured envelope,
//! encoded as an optimized JPEG. The pipeline is pure; callers persist the
//! result themselves.

pub mod cover;
pub mod orientation;
pub mod policy;

pub use cover::{CoverNormalizer, CoverSpec, InvalidImage, NormalizedCover};
pub use policy::UploadPolicy;
