//! Command-line front-end: filter, inspect and notch audio files

use audiofilter::audio::{AudioFormat, SignalSource, SignalStore};
use audiofilter::filters::{BandType, FilterApplier, FilterFamily, FilterSpec, WindowType};
use audiofilter::spectrum::SpectralAnalyzer;
use audiofilter::{EngineConfig, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(version, about = "Audio filtering and spectral analysis", long_about = None)]
struct Cli {
    /// TOML file with engine defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Design a filter and apply it to a file
    Filter {
        input: PathBuf,
        output: PathBuf,

        #[arg(long, value_enum, default_value_t = Kind::Iir)]
        kind: Kind,

        /// lowpass, highpass, bandpass or bandstop
        #[arg(long, default_value = "lowpass")]
        band: BandType,

        /// Cutoff frequencies in Hz (two for band filters)
        #[arg(long, required = true, num_args = 1..=2)]
        cutoff: Vec<f64>,

        /// IIR order
        #[arg(long)]
        order: Option<usize>,

        /// butterworth, chebyshev1, chebyshev2, elliptic or bessel
        #[arg(long)]
        family: Option<FilterFamily>,

        /// Passband ripple in dB
        #[arg(long)]
        rp: Option<f64>,

        /// Stopband attenuation in dB (IIR)
        #[arg(long)]
        rs: Option<f64>,

        /// Stopband attenuation in dB (FIR)
        #[arg(long)]
        attenuation: Option<f64>,

        /// Transition width in Hz (FIR)
        #[arg(long)]
        transition: Option<f64>,

        /// Single forward pass instead of zero-phase filtering
        #[arg(long, default_value_t = false)]
        causal: bool,
    },

    /// Print the strongest spectral components of a file
    Spectrum {
        input: PathBuf,

        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Analysis window: hann, hamming, blackman or rectangular
        #[arg(long, default_value = "rectangular")]
        window: WindowType,
    },

    /// Remove a frequency band and write the result
    Notch {
        input: PathBuf,
        output: PathBuf,

        #[arg(long)]
        low: f64,

        #[arg(long)]
        high: f64,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    Iir,
    Fir,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over --log-level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Action::Filter {
            input,
            output,
            kind,
            band,
            cutoff,
            order,
            family,
            rp,
            rs,
            attenuation,
            transition,
            causal,
        } => {
            let mut store = SignalStore::open(&input)?
                .with_applier(FilterApplier::new(config.fft_block_threshold));
            let sample_rate = store.original().sample_rate();

            let spec = match kind {
                Kind::Iir => FilterSpec::iir(
                    sample_rate,
                    band,
                    cutoff,
                    order.unwrap_or(config.iir_order),
                    family.unwrap_or(config.iir_family),
                )
                .with_tolerances(
                    rp.unwrap_or(config.passband_ripple_db),
                    rs.unwrap_or(config.stopband_attenuation_db),
                ),
                Kind::Fir => FilterSpec::fir(
                    sample_rate,
                    band,
                    cutoff,
                    attenuation.unwrap_or(config.fir_attenuation_db),
                    transition.unwrap_or(config.fir_transition_width_hz),
                ),
            };

            let zero_phase = !causal && config.zero_phase;
            store.apply_filter(&spec, zero_phase)?;
            store.save(&output, output_format(&output, &config)?)?;
            log::info!("Wrote {}", output.display());
        }
        Action::Spectrum { input, top, window } => {
            let analyzer = SpectralAnalyzer::with_window(window);
            log::debug!("Analysis window: {:?}", analyzer.window());
            let store = SignalStore::open(&input)?.with_analyzer(analyzer);
            let result = store.transform(SignalSource::Original)?;
            for (frequency, magnitude) in result.spectrum.strongest(top) {
                println!("{:>10.2} Hz  {:>14.4}", frequency, magnitude);
            }
        }
        Action::Notch {
            input,
            output,
            low,
            high,
        } => {
            let mut store = SignalStore::open(&input)?;
            store.notch_remove(SignalSource::Original, low, high)?;
            store.save(&output, output_format(&output, &config)?)?;
            log::info!("Wrote {}", output.display());
        }
    }

    Ok(())
}

/// Format from the output extension, or the configured default when there is none
fn output_format(path: &Path, config: &EngineConfig) -> Result<AudioFormat> {
    match path.extension() {
        Some(_) => AudioFormat::from_path(path),
        None => Ok(config.output_format),
    }
}
