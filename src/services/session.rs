//! Scoring session actor
//!
//! One task owns the `ScoringEngine` and processes commands from an mpsc
//! mailbox in arrival order, so posterior updates and scoring never race.
//! Callers talk to it through a cloneable [`SessionHandle`].

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::core::engine::ScoringEngine;
use crate::core::sampler::score_neutral;
use crate::models::{
    Job, JobInteraction, ModelParameters, PerformanceMetrics, PerformanceSummary, ScoredJob, ThompsonScore,
    UserProfile,
};

const MAILBOX_CAPACITY: usize = 100;

/// Errors returned by a session handle
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Scoring session has stopped")]
    Closed,

    #[error("Scoring session dropped the response")]
    NoResponse(#[from] oneshot::error::RecvError),
}

/// Commands accepted by the session actor
#[derive(Debug)]
pub enum SessionCommand {
    ScoreJob {
        job: Job,
        profile: Option<UserProfile>,
        responder: oneshot::Sender<ThompsonScore>,
    },

    ScoreJobs {
        jobs: Vec<Job>,
        profile: UserProfile,
        responder: oneshot::Sender<Vec<ScoredJob>>,
    },

    ProcessInteraction {
        interaction: JobInteraction,
        responder: oneshot::Sender<()>,
    },

    SetOccupationalEnhancement {
        enabled: bool,
        responder: oneshot::Sender<()>,
    },

    ModelParameters {
        responder: oneshot::Sender<ModelParameters>,
    },

    PerformanceMetrics {
        responder: oneshot::Sender<PerformanceMetrics>,
    },

    PerformanceSummary {
        responder: oneshot::Sender<PerformanceSummary>,
    },

    RunMaintenance {
        responder: oneshot::Sender<()>,
    },
}

/// Actor owning one engine
pub struct ScoringSession {
    engine: ScoringEngine,
    rx: mpsc::Receiver<SessionCommand>,
}

impl ScoringSession {
    pub fn new(engine: ScoringEngine) -> (Self, mpsc::Sender<SessionCommand>) {
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
        (Self { engine, rx }, tx)
    }

    /// Process commands until every sender is dropped, then return the engine
    pub async fn run(mut self) -> ScoringEngine {
        tracing::info!("Scoring session started");
        while let Some(cmd) = self.rx.recv().await {
            self.process_command(cmd).await;
        }
        tracing::info!(parameters = ?self.engine.model_parameters(), "Scoring session stopped");
        self.engine
    }

    async fn process_command(&mut self, cmd: SessionCommand) {
        // A dropped responder only means the caller stopped waiting
        match cmd {
            SessionCommand::ScoreJob { job, profile, responder } => {
                let score = self.engine.score_job(&job, profile.as_ref()).await;
                let _ = responder.send(score);
            }
            SessionCommand::ScoreJobs { jobs, profile, responder } => {
                let scored = self.engine.score_jobs(jobs, &profile).await;
                let _ = responder.send(scored);
            }
            SessionCommand::ProcessInteraction { interaction, responder } => {
                self.engine.process_interaction(interaction);
                let _ = responder.send(());
            }
            SessionCommand::SetOccupationalEnhancement { enabled, responder } => {
                self.engine.set_occupational_enhancement(enabled);
                let _ = responder.send(());
            }
            SessionCommand::ModelParameters { responder } => {
                let _ = responder.send(self.engine.model_parameters());
            }
            SessionCommand::PerformanceMetrics { responder } => {
                let _ = responder.send(self.engine.performance_metrics());
            }
            SessionCommand::PerformanceSummary { responder } => {
                let _ = responder.send(self.engine.performance_summary());
            }
            SessionCommand::RunMaintenance { responder } => {
                self.engine.run_maintenance().await;
                let _ = responder.send(());
            }
        }
    }
}

/// Send a command and await its response
pub async fn send_command<T>(
    tx: &mpsc::Sender<SessionCommand>,
    f: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
) -> Result<T, SessionError> {
    let (responder_tx, responder_rx) = oneshot::channel();
    tx.send(f(responder_tx)).await.map_err(|_| SessionError::Closed)?;
    Ok(responder_rx.await?)
}

/// Cloneable handle to a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Spawn the actor on the current runtime
    ///
    /// The returned join handle resolves to the engine once every handle has
    /// been dropped.
    pub fn spawn(engine: ScoringEngine) -> (Self, tokio::task::JoinHandle<ScoringEngine>) {
        let (session, tx) = ScoringSession::new(engine);
        let task = tokio::spawn(session.run());
        (Self { tx }, task)
    }

    pub async fn score_job(&self, job: Job, profile: Option<UserProfile>) -> Result<ThompsonScore, SessionError> {
        send_command(&self.tx, |responder| SessionCommand::ScoreJob { job, profile, responder }).await
    }

    pub async fn score_jobs(&self, jobs: Vec<Job>, profile: UserProfile) -> Result<Vec<ScoredJob>, SessionError> {
        send_command(&self.tx, |responder| SessionCommand::ScoreJobs { jobs, profile, responder }).await
    }

    pub async fn process_interaction(&self, interaction: JobInteraction) -> Result<(), SessionError> {
        send_command(&self.tx, |responder| SessionCommand::ProcessInteraction { interaction, responder }).await
    }

    pub async fn set_occupational_enhancement(&self, enabled: bool) -> Result<(), SessionError> {
        send_command(&self.tx, |responder| SessionCommand::SetOccupationalEnhancement { enabled, responder }).await
    }

    pub async fn model_parameters(&self) -> Result<ModelParameters, SessionError> {
        send_command(&self.tx, |responder| SessionCommand::ModelParameters { responder }).await
    }

    pub async fn performance_metrics(&self) -> Result<PerformanceMetrics, SessionError> {
        send_command(&self.tx, |responder| SessionCommand::PerformanceMetrics { responder }).await
    }

    pub async fn performance_summary(&self) -> Result<PerformanceSummary, SessionError> {
        send_command(&self.tx, |responder| SessionCommand::PerformanceSummary { responder }).await
    }

    pub async fn run_maintenance(&self) -> Result<(), SessionError> {
        send_command(&self.tx, |responder| SessionCommand::RunMaintenance { responder }).await
    }

    /// Neutral-prior score computed on the caller's task, bypassing the mailbox
    pub fn score_job_now(&self, job: &Job) -> ThompsonScore {
        score_neutral(job)
    }
}
