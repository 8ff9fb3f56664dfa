//! Filter design and application

pub mod spec;
pub mod windows;
pub mod elliptic;
pub mod bessel;
pub mod iir;
pub mod design;
pub mod apply;
pub mod fir;
pub mod fast_fir;

pub use spec::{BandType, FilterCoefficients, FilterFamily, FilterKind, FilterSpec};
pub use windows::{WindowType, generate_window};
pub use design::{design, design_fir, frequency_response, kaiser_beta, kaiser_order, magnitude_response_db};
pub use iir::design_iir;
pub use apply::{apply, apply_fir, apply_iir, filtfilt, lfilter, lfilter_zi, FilterApplier};
pub use fir::FirFilter;
pub use fast_fir::FastFirFilter;
