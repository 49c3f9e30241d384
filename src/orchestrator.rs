use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::ai::{self, AiErrorKind, MathModel, Prompt};
use crate::config::Config;
use crate::extractor::{Extraction, ImageExtractor};
use crate::image::ImageInput;
use crate::markup;
use crate::quick_reply;
use crate::transcript::{Sender, Transcript};

pub const SOLVE_PROMPT: &str = "Solve this math problem step-by-step. Clearly show final answer at the end without LaTeX or special formatting:\n";
pub const INVALID_PROBLEM: &str = "Please enter a valid math problem to solve.";
pub const NO_SOLUTION: &str = "Sorry, I couldn't solve this.";
pub const EXTRACTION_MISS: &str =
    "<b>Unable to extract text from the image. Please try another image.</b>";
pub const WELCOME: &str = "<b>Welcome to MathSolver AI! 🎉</b><br><br>I can help you with:<br>• Solving math problems step by step<br>• Reading math problems from images<br>• Explaining concepts in detail<br><br>Just type your problem or attach an image to get started! 🚀";

const MIN_PROBLEM_CHARS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    AwaitingAi,
}

#[derive(Debug, Clone)]
pub enum RawInput {
    Text(String),
    Image(ImageInput),
}

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    QuickReply,
    Rejected,
    Solved,
    Failed(AiErrorKind),
    ExtractionMiss,
    /// Another request was in flight; nothing was recorded.
    Busy,
    /// Blank text; nothing was recorded.
    Empty,
}

struct Session {
    transcript: Transcript,
    state: RequestState,
}

/// Holds the in-flight slot; dropping it puts the session back to idle.
struct FlightGuard {
    session: Arc<Mutex<Session>>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        session.state = RequestState::Idle;
        debug!("request finished, solver idle");
    }
}

/// Runs submissions from raw input to transcript entries.
///
/// At most one request waits on the model at a time. The gate is claimed
/// before anything else happens and released by a drop guard, so the
/// solver returns to [`RequestState::Idle`] on every path, including an
/// aborted task.
#[derive(Clone)]
pub struct Orchestrator {
    session: Arc<Mutex<Session>>,
    model: Arc<dyn MathModel>,
    extractor: ImageExtractor,
    request_timeout: Duration,
    typing_delay: Option<Duration>,
}

impl Orchestrator {
    pub fn new(config: &Config, model: Arc<dyn MathModel>) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session {
                transcript: Transcript::new(),
                state: RequestState::Idle,
            })),
            extractor: ImageExtractor::new(model.clone(), config.request_timeout),
            model,
            request_timeout: config.request_timeout,
            typing_delay: config.typing_delay,
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> RequestState {
        self.session().state
    }

    pub fn is_busy(&self) -> bool {
        self.state() != RequestState::Idle
    }

    /// Borrow the transcript without cloning it.
    pub fn with_transcript<R>(&self, f: impl FnOnce(&Transcript) -> R) -> R {
        f(&self.session().transcript)
    }

    pub fn transcript(&self) -> Transcript {
        self.with_transcript(Transcript::clone)
    }

    pub fn render_plain_text(&self) -> String {
        self.with_transcript(Transcript::render_plain_text)
    }

    /// Drop the whole history. A request still in flight appends its answer
    /// to the emptied transcript.
    pub fn clear_transcript(&self) {
        self.session().transcript.clear();
        info!("transcript cleared");
    }

    pub fn greet(&self) {
        self.append(Sender::Ai, WELCOME);
    }

    fn append(&self, sender: Sender, text: impl Into<String>) {
        self.session().transcript.append(sender, text);
    }

    /// Claim the single in-flight slot, or `None` if it is taken.
    fn admit(&self) -> Option<FlightGuard> {
        let mut session = self.session();
        if session.state != RequestState::Idle {
            return None;
        }
        session.state = RequestState::AwaitingAi;
        Some(FlightGuard {
            session: self.session.clone(),
        })
    }

    /// Run one submission to completion. Never fails: every error ends up
    /// as an AI entry in the transcript.
    pub async fn submit(&self, input: RawInput) -> SubmitOutcome {
        let Some(_flight) = self.admit() else {
            info!("submission ignored, a request is already in flight");
            return SubmitOutcome::Busy;
        };

        let outcome = match input {
            RawInput::Text(text) => self.solve_text(&text).await,
            RawInput::Image(image) => self.solve_image(&image).await,
        };
        info!(?outcome, "submission finished");
        outcome
    }

    async fn solve_text(&self, text: &str) -> SubmitOutcome {
        let problem = text.trim();
        if problem.is_empty() {
            return SubmitOutcome::Empty;
        }
        self.append(Sender::User, problem);
        self.answer(problem).await
    }

    async fn solve_image(&self, image: &ImageInput) -> SubmitOutcome {
        match self.extractor.extract(image).await {
            Extraction::Text(problem) => {
                info!(%problem, "extracted problem from image");
                self.append(Sender::User, problem.as_str());
                self.answer(&problem).await
            }
            Extraction::Miss => {
                self.append(Sender::Ai, EXTRACTION_MISS);
                SubmitOutcome::ExtractionMiss
            }
            Extraction::Failed(e) => {
                self.append(Sender::Ai, e.user_message());
                SubmitOutcome::Failed(e.kind())
            }
        }
    }

    /// Quick reply, validation, then the model. `problem` is already trimmed.
    async fn answer(&self, problem: &str) -> SubmitOutcome {
        if let Some(reply) = quick_reply::match_reply(&problem.to_lowercase()) {
            self.append(Sender::Ai, reply);
            return SubmitOutcome::QuickReply;
        }

        if !is_valid_problem(problem) {
            self.append(Sender::Ai, INVALID_PROBLEM);
            return SubmitOutcome::Rejected;
        }

        if let Some(delay) = self.typing_delay {
            tokio::time::sleep(delay).await;
        }

        let prompt = Prompt::Text(format!("{}{}", SOLVE_PROMPT, problem));
        match ai::generate_with_timeout(self.model.as_ref(), prompt, self.request_timeout).await {
            Ok(reply) => {
                let reply = reply.trim();
                let reply = if reply.is_empty() { NO_SOLUTION } else { reply };
                self.append(Sender::Ai, markup::to_display(reply));
                SubmitOutcome::Solved
            }
            Err(e) => {
                warn!(error = %e, "solve request failed");
                self.append(Sender::Ai, e.user_message());
                SubmitOutcome::Failed(e.kind())
            }
        }
    }
}

/// Cheap plausibility check: at least five characters and one digit.
pub fn is_valid_problem(problem: &str) -> bool {
    problem.chars().count() >= MIN_PROBLEM_CHARS && problem.chars().any(|c| c.is_ascii_digit())
}
