//! Audio filtering and spectral analysis engine
//!
//! Decodes audio files, designs IIR and Kaiser FIR filters, applies them
//! causally or with zero phase, and inspects or edits spectra. Optional
//! Python bindings are built with the `python` feature.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![allow(non_local_definitions)]

pub mod audio;
pub mod config;
pub mod error;
pub mod filters;
pub mod session;
pub mod spectrum;
pub mod worker;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use audio::{decode, encode, AudioBuffer, AudioFormat, SignalSource, SignalStore};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use filters::{apply, design, BandType, FilterCoefficients, FilterFamily, FilterSpec, WindowType};
pub use session::{Command, Session, SessionState};
pub use spectrum::{notch_remove, transform, SpectralAnalyzer, Spectrum};
