pub mod classifier;
pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod render;
pub mod samples;
pub mod types;

pub use classifier::ToolClassifier;
pub use config::AppConfig;
pub use controller::{ChatController, ChatView, Field, Key, KeyPress, SubmitOutcome, SubmitState};
pub use dispatcher::{Dispatcher, HttpDispatcher};
pub use error::ChatError;
pub use render::Renderer;
pub use types::{AssistRequest, AssistResponse, Author, ChatMessage, ToolCategory};
