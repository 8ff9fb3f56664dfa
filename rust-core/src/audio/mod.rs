//! Audio buffers, file codecs and per-session storage

pub mod buffer;
pub mod codec;
pub mod store;

pub use buffer::AudioBuffer;
pub use codec::{decode, encode, AudioFormat};
pub use store::{SignalSource, SignalStore, SpectrumResult};
