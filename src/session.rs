//! Session façade
//!
//! Owns traces between `start` and `end`. Each session holds a precomputed
//! state sequence and a cursor; stepping is index movement over the recorded
//! snapshots, clamped at both ends. The registry is the one shared resource
//! and is guarded by a mutex; a held `Session` is only touched by the
//! request that looked it up.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::SystemTime;

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{EngineConfig, Limits};
use crate::error::EngineError;
use crate::state::State;
use crate::tracer::trace;
use crate::validator::{ToolchainValidator, Validate};

/// Languages the engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Cpp,
    C,
}

impl FromStr for Language {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpp" => Ok(Language::Cpp),
            "c" => Ok(Language::C),
            other => Err(EngineError::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// One stored trace with its cursor.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub source: String,
    pub states: Vec<State>,
    pub current_step: usize,
    pub created_at: SystemTime,
}

/// Successful `start` result.
#[derive(Debug, Clone)]
pub struct StartOutput {
    pub session_id: Uuid,
    pub total_steps: usize,
    pub initial_state: State,
}

/// Result of a step or random-access read.
#[derive(Debug, Clone)]
pub struct StepOutput {
    pub state: State,
    pub step: usize,
    pub total_steps: usize,
    pub at_start: bool,
    pub at_end: bool,
}

/// Process-wide registry mapping session ids to stored traces.
pub struct SessionRegistry {
    validator: Box<dyn Validate + Send + Sync>,
    limits: Limits,
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl SessionRegistry {
    /// Registry backed by the native toolchain validator.
    pub fn new(config: EngineConfig) -> Self {
        SessionRegistry {
            validator: Box::new(ToolchainValidator::new(config.validator)),
            limits: config.limits,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Registry with a caller-provided validator (tests, pre-validated input).
    pub fn with_validator(validator: Box<dyn Validate + Send + Sync>, limits: Limits) -> Self {
        SessionRegistry {
            validator,
            limits,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Validate, trace, and store a new session.
    pub fn start(&self, source: &str, language: Language) -> Result<StartOutput, EngineError> {
        debug!(?language, bytes = source.len(), "starting session");
        self.validator.validate(source)?;

        let states = trace(source, &self.limits);
        let session = Session {
            id: Uuid::new_v4(),
            source: source.to_string(),
            states,
            current_step: 0,
            created_at: SystemTime::now(),
        };

        let output = StartOutput {
            session_id: session.id,
            total_steps: session.states.len(),
            initial_state: session.states[0].clone(),
        };
        info!(session = %session.id, steps = output.total_steps, "session started");

        self.sessions
            .lock()
            .expect("session registry poisoned")
            .insert(session.id, session);
        Ok(output)
    }

    /// Advance the cursor, clamped at the last step.
    pub fn step_forward(&self, id: Uuid) -> Result<StepOutput, EngineError> {
        let mut sessions = self.sessions.lock().expect("session registry poisoned");
        let session = sessions
            .get_mut(&id)
            .ok_or(EngineError::SessionNotFound(id))?;
        let last = session.states.len() - 1;
        session.current_step = (session.current_step + 1).min(last);
        Ok(Self::output(session))
    }

    /// Retreat the cursor, clamped at step zero.
    pub fn step_backward(&self, id: Uuid) -> Result<StepOutput, EngineError> {
        let mut sessions = self.sessions.lock().expect("session registry poisoned");
        let session = sessions
            .get_mut(&id)
            .ok_or(EngineError::SessionNotFound(id))?;
        session.current_step = session.current_step.saturating_sub(1);
        Ok(Self::output(session))
    }

    /// Random-access read; does not move the cursor.
    pub fn get_state(&self, id: Uuid, step: usize) -> Result<StepOutput, EngineError> {
        let sessions = self.sessions.lock().expect("session registry poisoned");
        let session = sessions.get(&id).ok_or(EngineError::SessionNotFound(id))?;
        let total = session.states.len();
        if step >= total {
            return Err(EngineError::StepOutOfRange { step, total });
        }
        Ok(StepOutput {
            state: session.states[step].clone(),
            step,
            total_steps: total,
            at_start: step == 0,
            at_end: step == total - 1,
        })
    }

    /// Drop a session. Ending twice reports `SessionNotFound`.
    pub fn end(&self, id: Uuid) -> Result<(), EngineError> {
        let removed = self
            .sessions
            .lock()
            .expect("session registry poisoned")
            .remove(&id);
        match removed {
            Some(_) => {
                info!(session = %id, "session ended");
                Ok(())
            }
            None => Err(EngineError::SessionNotFound(id)),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session registry poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn output(session: &Session) -> StepOutput {
        let step = session.current_step;
        let total = session.states.len();
        StepOutput {
            state: session.states[step].clone(),
            step,
            total_steps: total,
            at_start: step == 0,
            at_end: step == total - 1,
        }
    }
}
