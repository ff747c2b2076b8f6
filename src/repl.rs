use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::{Config as RlConfig, DefaultEditor};
use std::io::Write;
use std::path::PathBuf;
use travel_core::config::AppConfig;
use travel_core::controller::{ChatController, ChatView, Field, KeyPress};
use travel_core::dispatcher::{Dispatcher, HttpDispatcher};
use travel_core::render::{self, Badge, Renderer};
use travel_core::samples::{self, SAMPLES};
use travel_core::types::ChatMessage;

const BANNER: &str = r#"
  ╔═══════════════════════════════════════════╗
  ║          travel-chat v0.1.0               ║
  ║   Weather, words, and travel questions    ║
  ╚═══════════════════════════════════════════╝

  Type your question and press Enter to ask.
  Commands:
    /city [name]   - Set the city (no name: edit it at the prompt)
    /examples      - List example questions
    /example <n>   - Load example question n
    /tools         - List the backend's tools
    /export <path> - Save the conversation as HTML
    /config        - Show current config
    /clear         - Clear the conversation
    /help          - Show this help
    /exit          - Quit
"#;

/// Draws the conversation in the terminal.
pub struct TerminalView {
    renderer: Renderer,
    color: bool,
    /// Print user messages. Off in the REPL, where the prompt line already shows them.
    echo_user: bool,
}

impl TerminalView {
    pub fn new(color: bool, echo_user: bool) -> Self {
        Self {
            renderer: Renderer::terminal(color),
            color,
            echo_user,
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }
}

impl ChatView for TerminalView {
    fn append(&mut self, message: &ChatMessage) {
        if message.is_user() {
            if self.echo_user {
                println!("{} {}", self.paint("1;32", "you ❯"), message.content);
            }
            return;
        }
        if let Some(badge) = Badge::for_message(message) {
            println!(
                "{}",
                self.paint("1;33", &format!("{} {}", badge.glyph, badge.label))
            );
        }
        println!("{}\n", self.renderer.format(&message.content));
    }

    fn show_loading(&mut self) {
        let badge = Badge::THINKING;
        print!("{}", self.paint("0;35", &format!("{} {}", badge.glyph, badge.label)));
        let _ = std::io::stdout().flush();
    }

    fn hide_loading(&mut self) {
        if self.color {
            print!("\r\x1b[2K");
        } else {
            println!();
        }
        let _ = std::io::stdout().flush();
    }

    fn set_submit(&mut self, enabled: bool, label: &str) {
        tracing::trace!(enabled, label, "Submit control changed");
    }

    fn alert(&mut self, notice: &str) {
        eprintln!("{}", self.paint("1;31", &format!("⚠  {}", notice)));
    }

    // The prompt is redrawn from controller state on every iteration.
    fn focus(&mut self, _field: Field) {}

    fn set_field(&mut self, _field: Field, _value: &str) {}
}

/// A slash command typed at the question prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    City(Option<String>),
    Examples,
    Example(usize),
    Tools,
    Export(PathBuf),
    Config,
    Clear,
    Help,
    /// Recognized command with bad or missing arguments.
    Usage(&'static str),
    Unknown(String),
}

/// Parse a line starting with `/`. Returns `None` for ordinary questions.
pub fn parse_command(input: &str) -> Option<Command> {
    let input = input.trim();
    if !input.starts_with('/') {
        return None;
    }
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    let command = match cmd {
        "/exit" | "/quit" | "/q" => Command::Exit,
        "/city" => Command::City((!arg.is_empty()).then(|| arg.to_string())),
        "/examples" => Command::Examples,
        "/example" => match arg.parse::<usize>() {
            Ok(n) if samples::sample(n).is_some() => Command::Example(n),
            _ => Command::Usage("Usage: /example <n>  (see /examples)"),
        },
        "/tools" => Command::Tools,
        "/export" => {
            if arg.is_empty() {
                Command::Usage("Usage: /export <path>")
            } else {
                Command::Export(PathBuf::from(arg))
            }
        }
        "/config" => Command::Config,
        "/clear" => Command::Clear,
        "/help" | "/?" => Command::Help,
        other => Command::Unknown(other.to_string()),
    };
    Some(command)
}

/// Run the interactive REPL.
pub async fn run(config: AppConfig, city: Option<String>) -> Result<()> {
    println!("{}", BANNER);
    println!("  Backend: {}", config.backend.base());
    println!();

    let dispatcher = HttpDispatcher::new(config.backend.clone())?;
    let view = TerminalView::new(config.ui.color, false);
    let mut controller =
        ChatController::new(dispatcher, view, config.ui.health_banner_delay());
    if let Some(city) = city {
        controller.set_field(Field::City, &city);
    }

    controller.check_health().await;

    // Set up rustyline.
    let rl_config = RlConfig::builder().auto_add_history(true).build();
    let history_path = AppConfig::data_dir().join("repl_history.txt");
    let mut rl = DefaultEditor::with_config(rl_config)?;
    let _ = rl.load_history(&history_path);

    loop {
        let field = controller.focused();
        let prompt = prompt_for(field, controller.field(Field::City), config.ui.color);
        let initial = controller.field(field).to_string();

        match rl.readline_with_initial(&prompt, (initial.as_str(), "")) {
            Ok(line) => {
                if field == Field::Question {
                    if let Some(command) = parse_command(&line) {
                        if !handle_command(command, &mut controller, &config).await? {
                            break; // /exit
                        }
                        continue;
                    }
                }
                controller.set_field(field, &line);
                controller.handle_key(field, KeyPress::ENTER).await;
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                if field == Field::Question {
                    controller.set_field(field, "");
                }
                controller.focus(Field::Question);
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    // Save history.
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = rl.save_history(&history_path);

    Ok(())
}

fn prompt_for(field: Field, city: &str, color: bool) -> String {
    let (label, code) = match field {
        Field::Question if city.trim().is_empty() => ("ask".to_string(), "1;36"),
        Field::Question => (format!("ask @ {}", city.trim()), "1;36"),
        Field::City => ("city".to_string(), "1;35"),
    };
    if color {
        format!("\x1b[{}m{}\x1b[0m \x1b[1;32m❯\x1b[0m ", code, label)
    } else {
        format!("{} ❯ ", label)
    }
}

/// Handle a slash command. Returns `true` to continue the loop, `false` to exit.
async fn handle_command(
    command: Command,
    controller: &mut ChatController<HttpDispatcher, TerminalView>,
    config: &AppConfig,
) -> Result<bool> {
    match command {
        Command::Exit => {
            println!("Goodbye!");
            return Ok(false);
        }
        Command::City(Some(city)) => {
            controller.set_field(Field::City, &city);
            println!("  City set to {}.", city);
        }
        Command::City(None) => {
            controller.focus(Field::City);
        }
        Command::Examples => {
            for (i, sample) in SAMPLES.iter().enumerate() {
                match sample.city {
                    Some(city) => println!("  {}. {}  [{}]", i + 1, sample.question, city),
                    None => println!("  {}. {}", i + 1, sample.question),
                }
            }
        }
        Command::Example(n) => {
            if let Some(sample) = samples::sample(n) {
                controller.load_sample(sample);
            }
        }
        Command::Tools => match controller.dispatcher().list_tools().await {
            Ok(tools) if tools.is_empty() => println!("  The backend reports no tools."),
            Ok(tools) => {
                println!("  Available tools ({}):", tools.len());
                for tool in tools {
                    println!("    • {}: {}", tool.name, tool.description);
                }
            }
            Err(e) => eprintln!("  Could not list tools: {}", e),
        },
        Command::Export(path) => {
            let html = render::transcript_html(controller.transcript());
            match std::fs::write(&path, html) {
                Ok(()) => println!(
                    "  Saved {} messages to {}",
                    controller.transcript().len(),
                    path.display()
                ),
                Err(e) => eprintln!("  Could not export: {}", e),
            }
        }
        Command::Config => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{}", toml_str);
        }
        Command::Clear => {
            controller.clear_transcript();
            println!("Cleared conversation.");
        }
        Command::Help => {
            println!("{}", BANNER);
        }
        Command::Usage(text) => println!("  {}", text),
        Command::Unknown(cmd) => {
            println!(
                "Unknown command: {}. Type /help for available commands.",
                cmd
            );
        }
    }

    Ok(true)
}
