//! Caller-side session workflow
//!
//! Drives the engine through `Idle → Configuring → Applying → Reviewing → Saved`
//! with discrete commands. Rejected commands leave the state unchanged.

use crate::audio::{AudioBuffer, AudioFormat, SignalStore};
use crate::error::{EngineError, Result};
use crate::filters::{design, FilterApplier, FilterCoefficients, FilterSpec};
use crate::worker::{self, Task};
use std::path::PathBuf;

/// Where the session is in its workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing loaded
    Idle,
    /// Signal loaded, filter being chosen
    Configuring,
    /// Filter running
    Applying,
    /// Processed signal available
    Reviewing,
    /// Processed signal written to disk
    Saved,
}

/// Input driving the session
#[derive(Debug, Clone)]
pub enum Command {
    Load(PathBuf),
    Configure { spec: FilterSpec, zero_phase: bool },
    Apply,
    Save { path: PathBuf, format: AudioFormat },
    Reset,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Load(_) => "load",
            Command::Configure { .. } => "configure",
            Command::Apply => "apply",
            Command::Save { .. } => "save",
            Command::Reset => "reset",
        }
    }
}

struct Configured {
    coefficients: FilterCoefficients,
    zero_phase: bool,
}

/// One interactive session over a single signal
pub struct Session {
    state: SessionState,
    store: Option<SignalStore>,
    filter: Option<Configured>,
    applier: FilterApplier,
    pending: Option<Task<AudioBuffer>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(FilterApplier::default())
    }
}

impl Session {
    pub fn new(applier: FilterApplier) -> Self {
        Self {
            state: SessionState::Idle,
            store: None,
            filter: None,
            applier,
            pending: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn store(&self) -> Option<&SignalStore> {
        self.store.as_ref()
    }

    fn rejected(&self, command: &Command) -> EngineError {
        EngineError::invalid_spec(format!(
            "cannot {} while {:?}",
            command.name(),
            self.state
        ))
    }

    /// Apply a command, returning the new state
    pub fn handle(&mut self, command: Command) -> Result<SessionState> {
        use SessionState::*;

        match (&command, self.state) {
            (Command::Reset, _) => {
                if let Some(task) = self.pending.take() {
                    task.cancel();
                }
                self.store = None;
                self.filter = None;
                self.state = Idle;
            }
            (Command::Load(path), Idle | Configuring | Reviewing | Saved) => {
                let store = SignalStore::open(path)?.with_applier(self.applier);
                self.store = Some(store);
                self.filter = None;
                self.state = Configuring;
            }
            (Command::Configure { spec, zero_phase }, Configuring | Reviewing | Saved) => {
                let store = self.store.as_ref().ok_or_else(|| self.rejected(&command))?;
                if spec.sample_rate != store.original().sample_rate() {
                    return Err(EngineError::invalid_spec(format!(
                        "filter designed for {} Hz but the signal is {} Hz",
                        spec.sample_rate,
                        store.original().sample_rate()
                    )));
                }
                let coefficients = design(spec)?;
                self.filter = Some(Configured {
                    coefficients,
                    zero_phase: *zero_phase,
                });
                self.state = Configuring;
            }
            (Command::Apply, Configuring | Reviewing) => self.apply_now()?,
            (Command::Save { path, format }, Reviewing | Saved) => {
                let store = self.store.as_ref().ok_or_else(|| self.rejected(&command))?;
                store.save(path, *format)?;
                self.state = Saved;
            }
            _ => return Err(self.rejected(&command)),
        }

        log::debug!("Session: {} -> {:?}", command.name(), self.state);
        Ok(self.state)
    }

    fn apply_now(&mut self) -> Result<()> {
        let (Some(store), Some(filter)) = (self.store.as_mut(), self.filter.as_ref()) else {
            return Err(EngineError::invalid_spec("no filter configured"));
        };

        self.state = SessionState::Applying;
        match store.apply_coefficients(&filter.coefficients, filter.zero_phase) {
            Ok(_) => {
                self.state = SessionState::Reviewing;
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Configuring;
                Err(e)
            }
        }
    }

    /// Start applying the configured filter on a worker thread
    ///
    /// The session stays in `Applying` until [`Session::poll`] collects the
    /// result or [`Session::cancel`] abandons it.
    pub fn apply_in_background(&mut self) -> Result<SessionState> {
        if !matches!(self.state, SessionState::Configuring | SessionState::Reviewing) {
            return Err(self.rejected(&Command::Apply));
        }
        let (Some(store), Some(filter)) = (self.store.as_ref(), self.filter.as_ref()) else {
            return Err(EngineError::invalid_spec("no filter configured"));
        };

        self.pending = Some(worker::spawn_apply(
            self.applier,
            store.original().clone(),
            filter.coefficients.clone(),
            filter.zero_phase,
        ));
        self.state = SessionState::Applying;
        Ok(self.state)
    }

    /// Collect a finished background application, if any
    pub fn poll(&mut self) -> Result<SessionState> {
        let Some(task) = self.pending.as_ref() else {
            return Ok(self.state);
        };
        let Some(result) = task.try_result() else {
            return Ok(self.state);
        };
        self.pending = None;
        self.finish(result)
    }

    /// Block until a background application finishes
    pub fn wait(&mut self) -> Result<SessionState> {
        match self.pending.take() {
            Some(task) => self.finish(task.wait()),
            None => Ok(self.state),
        }
    }

    /// Abandon a background application and return to `Configuring`
    pub fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.cancel();
            self.state = SessionState::Configuring;
        }
    }

    fn finish(&mut self, result: Result<AudioBuffer>) -> Result<SessionState> {
        match (result, self.store.as_mut()) {
            (Ok(processed), Some(store)) => {
                store.set_processed(processed);
                self.state = SessionState::Reviewing;
                Ok(self.state)
            }
            (Err(e), _) => {
                self.state = SessionState::Configuring;
                Err(e)
            }
            (Ok(_), None) => {
                self.state = SessionState::Idle;
                Err(EngineError::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{encode, SignalSource};
    use crate::filters::{BandType, FilterFamily};
    use std::f64::consts::PI;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_tone(path: &Path, len: usize) {
        let samples = (0..len)
            .map(|i| (2.0 * PI * 300.0 * i as f64 / 8000.0).sin())
            .collect();
        encode(&AudioBuffer::new(8000, samples).unwrap(), path, AudioFormat::Wav).unwrap();
    }

    fn lowpass() -> Command {
        Command::Configure {
            spec: FilterSpec::iir(8000, BandType::Lowpass, vec![1000.0], 4, FilterFamily::Butterworth),
            zero_phase: true,
        }
    }

    #[test]
    fn test_full_workflow() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.flac");
        write_tone(&input, 4000);

        let mut session = Session::default();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.handle(Command::Load(input)).unwrap(), SessionState::Configuring);
        assert_eq!(session.handle(lowpass()).unwrap(), SessionState::Configuring);
        assert_eq!(session.handle(Command::Apply).unwrap(), SessionState::Reviewing);
        assert!(session.store().unwrap().processed().is_some());

        let save = Command::Save {
            path: output.clone(),
            format: AudioFormat::Flac,
        };
        assert_eq!(session.handle(save).unwrap(), SessionState::Saved);
        assert!(output.exists());

        assert_eq!(session.handle(Command::Reset).unwrap(), SessionState::Idle);
        assert!(session.store().is_none());
    }

    #[test]
    fn test_illegal_transitions_keep_state() {
        let mut session = Session::default();
        assert!(matches!(session.handle(Command::Apply), Err(EngineError::InvalidSpec(_))));
        assert!(matches!(session.handle(lowpass()), Err(EngineError::InvalidSpec(_))));
        assert_eq!(session.state(), SessionState::Idle);

        let dir = tempdir().unwrap();
        let input = dir.path().join("in.wav");
        write_tone(&input, 4000);
        session.handle(Command::Load(input)).unwrap();

        // Apply without a configured filter
        assert!(session.handle(Command::Apply).is_err());
        assert_eq!(session.state(), SessionState::Configuring);

        // Nothing processed yet
        let save = Command::Save {
            path: dir.path().join("out.wav"),
            format: AudioFormat::Wav,
        };
        assert!(matches!(session.handle(save), Err(EngineError::InvalidSpec(_))));
        assert_eq!(session.state(), SessionState::Configuring);
    }

    #[test]
    fn test_failed_load_and_configure_keep_state() {
        let mut session = Session::default();
        assert!(session.handle(Command::Load("missing.wav".into())).is_err());
        assert_eq!(session.state(), SessionState::Idle);

        let dir = tempdir().unwrap();
        let input = dir.path().join("in.wav");
        write_tone(&input, 4000);
        session.handle(Command::Load(input)).unwrap();

        let bad = Command::Configure {
            spec: FilterSpec::iir(8000, BandType::Bandpass, vec![2000.0, 1000.0], 4, FilterFamily::Butterworth),
            zero_phase: true,
        };
        assert!(matches!(session.handle(bad), Err(EngineError::InvalidSpec(_))));
        assert_eq!(session.state(), SessionState::Configuring);
    }

    #[test]
    fn test_failed_apply_returns_to_configuring() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("short.wav");
        write_tone(&input, 10);

        let mut session = Session::default();
        session.handle(Command::Load(input)).unwrap();
        session.handle(lowpass()).unwrap();

        assert!(matches!(
            session.handle(Command::Apply),
            Err(EngineError::InsufficientLength { .. })
        ));
        assert_eq!(session.state(), SessionState::Configuring);
        assert!(session.store().unwrap().processed().is_none());
    }

    #[test]
    fn test_background_apply() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.wav");
        write_tone(&input, 4000);

        let mut session = Session::default();
        session.handle(Command::Load(input)).unwrap();
        session.handle(lowpass()).unwrap();

        assert_eq!(session.apply_in_background().unwrap(), SessionState::Applying);
        // Commands other than reset are rejected while applying
        assert!(session.handle(Command::Apply).is_err());
        assert_eq!(session.state(), SessionState::Applying);

        assert_eq!(session.wait().unwrap(), SessionState::Reviewing);
        let store = session.store().unwrap();
        assert_eq!(store.signal(SignalSource::Processed).unwrap().len(), 4000);
    }

    #[test]
    fn test_cancel_background_apply() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.wav");
        write_tone(&input, 4000);

        let mut session = Session::default();
        session.handle(Command::Load(input)).unwrap();
        session.handle(lowpass()).unwrap();
        session.apply_in_background().unwrap();

        session.cancel();
        assert_eq!(session.state(), SessionState::Configuring);
        assert_eq!(session.poll().unwrap(), SessionState::Configuring);
        assert!(session.store().unwrap().processed().is_none());
    }
}
