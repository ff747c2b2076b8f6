//! The chat widget controller.
//!
//! Owns the two input fields, the submit control state, and the transcript.
//! All drawing goes through an injected [`ChatView`]; all network traffic goes
//! through an injected [`Dispatcher`].

use std::time::Duration;

use tracing::{info, warn};

use crate::classifier::ToolClassifier;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::samples::Sample;
use crate::types::{AssistRequest, AssistResponse, ChatMessage, ToolCategory};

pub const SEND_LABEL: &str = "Send";
pub const BUSY_LABEL: &str = "Processing";
pub const EMPTY_QUESTION_NOTICE: &str = "Please enter a question";
pub const FALLBACK_MESSAGE: &str = "Sorry, I couldn't process your request. Please try again.";
pub const CONNECTED_MESSAGE: &str = "✓ Connected to backend API";

/// Shown when the assist call fails at the transport level.
pub fn connection_error_message(base_url: &str) -> String {
    format!(
        "Sorry, there was an error connecting to the server. \
         Please make sure the backend is running on {}",
        base_url
    )
}

/// Shown when the startup health probe fails.
pub fn backend_offline_message(base_url: &str) -> String {
    format!(
        "⚠️ **Note:** Backend API is not connected. \
         Please make sure the server is running on {}",
        base_url
    )
}

/// The two text inputs of the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Question,
    City,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other,
}

/// A key event delivered to one of the fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
}

impl KeyPress {
    pub const ENTER: KeyPress = KeyPress {
        key: Key::Enter,
        shift: false,
    };

    pub const SHIFT_ENTER: KeyPress = KeyPress {
        key: Key::Enter,
        shift: true,
    };
}

/// Whether a request is outstanding. The submit control is enabled only when `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    InFlight,
}

/// What a call to [`ChatController::submit`] ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank question; nothing sent.
    Invalid,
    /// A request was already in flight; nothing sent.
    Busy,
    /// The backend answered; the answer was attributed to this tool.
    Answered(ToolCategory),
    /// The backend replied with `success: false`.
    Declined,
    /// Network error, non-2xx status, or unparseable body.
    TransportFailed,
}

/// The display surface the controller drives.
pub trait ChatView {
    /// Append a message to the bottom of the message list.
    fn append(&mut self, message: &ChatMessage);
    fn show_loading(&mut self);
    fn hide_loading(&mut self);
    fn set_submit(&mut self, enabled: bool, label: &str);
    /// A blocking validation notice.
    fn alert(&mut self, notice: &str);
    fn focus(&mut self, field: Field);
    fn set_field(&mut self, field: Field, value: &str);
}

pub struct ChatController<D, V> {
    dispatcher: D,
    view: V,
    classifier: ToolClassifier,
    health_delay: Duration,
    question: String,
    city: String,
    focus: Field,
    state: SubmitState,
    transcript: Vec<ChatMessage>,
}

impl<D: Dispatcher, V: ChatView> ChatController<D, V> {
    /// Create a controller. `health_delay` is how long the "connected" banner waits
    /// after a successful probe.
    pub fn new(dispatcher: D, view: V, health_delay: Duration) -> Self {
        Self {
            dispatcher,
            view,
            classifier: ToolClassifier::new(),
            health_delay,
            question: String::new(),
            city: String::new(),
            focus: Field::Question,
            state: SubmitState::Idle,
            transcript: Vec::new(),
        }
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    pub fn focused(&self) -> Field {
        self.focus
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Question => &self.question,
            Field::City => &self.city,
        }
    }

    /// Everything appended so far, oldest first.
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Forget the transcript. Only the local record is affected.
    pub fn clear_transcript(&mut self) {
        self.transcript.clear();
    }

    /// Replace a field's value, as if the user had typed it.
    pub fn set_field(&mut self, field: Field, value: &str) {
        match field {
            Field::Question => self.question = value.to_string(),
            Field::City => self.city = value.to_string(),
        }
        self.view.set_field(field, value);
    }

    pub fn focus(&mut self, field: Field) {
        self.focus = field;
        self.view.focus(field);
    }

    /// Fill the inputs from a sample. A sample without a city keeps the current one.
    pub fn load_sample(&mut self, sample: &Sample) {
        self.set_field(Field::Question, sample.question);
        if let Some(city) = sample.city {
            self.set_field(Field::City, city);
        }
        self.focus(Field::Question);
    }

    /// Route a key event. Returns the submission outcome if the key triggered one.
    pub async fn handle_key(&mut self, field: Field, key: KeyPress) -> Option<SubmitOutcome> {
        match (field, key) {
            (Field::Question, KeyPress { key: Key::Enter, shift: false }) => {
                Some(self.submit().await)
            }
            (Field::City, KeyPress { key: Key::Enter, .. }) => {
                self.focus(Field::Question);
                None
            }
            _ => None,
        }
    }

    /// Send the current question. Always returns to `Idle` before returning.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.state == SubmitState::InFlight {
            return SubmitOutcome::Busy;
        }
        let Some(request) = AssistRequest::from_fields(&self.question, &self.city) else {
            self.view.alert(EMPTY_QUESTION_NOTICE);
            return SubmitOutcome::Invalid;
        };

        self.push(ChatMessage::user(request.question.clone()));
        self.set_field(Field::Question, "");
        self.enter_in_flight();

        let result = self.dispatcher.assist(&request).await;

        self.view.hide_loading();
        let outcome = self.settle(result);
        self.exit_in_flight();
        outcome
    }

    /// Probe the backend and post a status message. Never fails.
    pub async fn check_health(&mut self) -> bool {
        let base = self.dispatcher.base_url().to_string();
        match self.dispatcher.probe().await {
            Ok(()) => {
                info!("Backend at {} is healthy", base);
                if !self.health_delay.is_zero() {
                    tokio::time::sleep(self.health_delay).await;
                }
                self.push(ChatMessage::system(CONNECTED_MESSAGE));
                true
            }
            Err(e) => {
                warn!("Could not reach backend at {}: {}", base, e);
                self.push(ChatMessage::notice(backend_offline_message(&base)));
                false
            }
        }
    }

    fn enter_in_flight(&mut self) {
        self.state = SubmitState::InFlight;
        self.view.set_submit(false, BUSY_LABEL);
        self.view.show_loading();
    }

    fn exit_in_flight(&mut self) {
        self.state = SubmitState::Idle;
        self.view.set_submit(true, SEND_LABEL);
        self.focus(Field::Question);
    }

    /// Turn the dispatcher's result into exactly one assistant message.
    fn settle(&mut self, result: Result<AssistResponse>) -> SubmitOutcome {
        match result {
            Ok(AssistResponse {
                success: true,
                answer: Some(answer),
                tool_used,
            }) => {
                let category = self.classifier.classify(&answer, tool_used.as_deref());
                self.push(ChatMessage::answer(answer, category));
                SubmitOutcome::Answered(category)
            }
            Ok(resp) => {
                if resp.success {
                    warn!("Backend reported success without an answer");
                }
                self.push(ChatMessage::notice(FALLBACK_MESSAGE));
                SubmitOutcome::Declined
            }
            Err(e) => {
                warn!("Assist request failed: {}", e);
                let base = self.dispatcher.base_url().to_string();
                self.push(ChatMessage::notice(connection_error_message(&base)));
                SubmitOutcome::TransportFailed
            }
        }
    }

    fn push(&mut self, message: ChatMessage) {
        self.view.append(&message);
        self.transcript.push(message);
    }
}
