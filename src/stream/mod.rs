//! Stream extraction and validation
//!
//! Episode pages carry their video servers in an inline script. The
//! [`StreamExtractor`] pulls raw [`CandidateStream`]s out of that script and
//! the [`StreamValidator`] turns the trustworthy ones into
//! [`StreamDescriptor`]s ready for playback.

pub mod candidate;
pub mod extract;
pub mod validate;

pub use candidate::{CandidateStream, StreamDescriptor};
pub use extract::StreamExtractor;
pub use validate::StreamValidator;
