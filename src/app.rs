use std::path::{Path, PathBuf};
use std::sync::Arc;

use mathsolver::{
    export_pdf, Config, ExportError, GeminiClient, ImageInput, MathModel, Orchestrator, RawInput,
    SubmitOutcome,
};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Problem,
    ImagePath,
    ExportPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

/// A dismissable popup message.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Input line (shared by all modes)
    pub input: String,
    pub cursor: usize, // cursor position in chars

    // Chat view
    pub scroll: u16,
    pub follow_tail: bool,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    pub animation_frame: u8,

    pub notice: Option<Notice>,

    pub orchestrator: Orchestrator,
    pub solve_task: Option<JoinHandle<SubmitOutcome>>,
    pub model_name: String,
    pub export_path: PathBuf,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self::with_model(config, Arc::new(GeminiClient::from_config(config)))
    }

    pub fn with_model(config: &Config, model: Arc<dyn MathModel>) -> Self {
        let orchestrator = Orchestrator::new(config, model);
        orchestrator.greet();

        Self {
            should_quit: false,
            input_mode: InputMode::Problem,
            input: String::new(),
            cursor: 0,
            scroll: 0,
            follow_tail: true,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            notice: None,
            orchestrator,
            solve_task: None,
            model_name: config.model.clone(),
            export_path: config.export_path.clone(),
        }
    }

    /// Whether a new problem may be submitted right now.
    pub fn input_enabled(&self) -> bool {
        self.solve_task.is_none() && !self.orchestrator.is_busy()
    }

    pub fn is_thinking(&self) -> bool {
        !self.input_enabled()
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
        self.cursor = self.input.chars().count();
    }

    pub fn take_input(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.input)
    }

    /// Submit the typed problem. Ignored while a request is in flight.
    pub fn submit_problem(&mut self) {
        if !self.input_enabled() || self.input.trim().is_empty() {
            return;
        }
        let problem = self.take_input();
        self.spawn_solve(RawInput::Text(problem));
    }

    pub async fn attach_image(&mut self, path: &Path) {
        if !self.input_enabled() {
            return;
        }
        match ImageInput::load(path).await {
            Ok(image) => {
                info!(path = %path.display(), ?image, "attaching image");
                self.spawn_solve(RawInput::Image(image));
            }
            Err(e) => {
                warn!(error = %e, "could not load image");
                self.show_notice(NoticeKind::Error, e.to_string());
            }
        }
    }

    fn spawn_solve(&mut self, input: RawInput) {
        let orchestrator = self.orchestrator.clone();
        self.follow_tail = true;
        self.solve_task = Some(tokio::spawn(async move { orchestrator.submit(input).await }));
    }

    /// Collect the solve task once it has finished.
    pub async fn poll_solve_task(&mut self) {
        let finished = self
            .solve_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }

        if let Some(task) = self.solve_task.take() {
            match task.await {
                Ok(SubmitOutcome::Busy) => {
                    self.show_notice(NoticeKind::Warning, "Still working on the previous problem.");
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "solve task panicked");
                    self.show_notice(NoticeKind::Error, format!("Request failed: {}", e));
                }
            }
            self.follow_tail = true;
        }
    }

    pub fn export_chat(&mut self, path: &Path) {
        let text = self.orchestrator.render_plain_text();
        match export_pdf(&text, path) {
            Ok(summary) => {
                self.export_path = path.to_path_buf();
                self.show_notice(
                    NoticeKind::Info,
                    format!(
                        "Chat history exported successfully to {} ({} page{}).",
                        path.display(),
                        summary.pages,
                        if summary.pages == 1 { "" } else { "s" }
                    ),
                );
            }
            Err(ExportError::EmptyTranscript) => {
                self.show_notice(NoticeKind::Warning, ExportError::EmptyTranscript.to_string());
            }
            Err(e) => {
                warn!(error = %e, "export failed");
                self.show_notice(
                    NoticeKind::Error,
                    format!("Failed to export chat history: {}", e),
                );
            }
        }
    }

    pub fn clear_chat(&mut self) {
        self.orchestrator.clear_transcript();
        self.scroll = 0;
        self.follow_tail = true;
    }

    pub fn show_notice(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notice = Some(Notice {
            kind,
            message: message.into(),
        });
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_thinking() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_tail = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
        let bottom = self.bottom_scroll();
        if self.scroll >= bottom {
            self.scroll = bottom;
            self.follow_tail = true;
        }
    }

    /// Keep the newest message visible while following the tail.
    pub fn update_scroll(&mut self) {
        if self.follow_tail {
            self.scroll = self.bottom_scroll();
        }
    }

    fn bottom_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };
        self.total_chat_lines().saturating_sub(visible_height)
    }

    /// Estimate of the wrapped line count of the chat view.
    pub fn total_chat_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = self.orchestrator.with_transcript(|transcript| {
            let mut total: u16 = 0;
            for entry in transcript.entries() {
                total = total.saturating_add(1); // Sender line ("You:" or "AI:")
                for line in entry.plain_text().lines() {
                    // Use character count, not byte length, for proper UTF-8 handling
                    let char_count = line.chars().count();
                    total = total.saturating_add((char_count / wrap_width + 1) as u16);
                }
                total = total.saturating_add(1); // Blank line after message
            }
            total
        });

        if self.is_thinking() {
            total_lines = total_lines.saturating_add(2); // "AI:" + "Thinking..."
        }
        total_lines
    }
}
