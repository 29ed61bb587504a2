use anyhow::Result;
use console::{style, Term};
use std::io::IsTerminal;

use super::{FetchStatus, Shell};
use crate::summarize::ChatClient;
use crate::transcript::TranscriptSource;
use crate::utils;

/// Picker entry that asks for a free-form model name
pub const CUSTOM_MODEL: &str = "custom...";

/// Lines of transcript shown right after a fetch
const PREVIEW_LINES: usize = 20;

/// YouTube hosts accepted without a scheme
const BARE_HOSTS: &[&str] = &["youtube.com/", "www.youtube.com/", "youtu.be/"];

/// A line of user input, interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Url(String),
    Models,
    Model(String),
    Summarize,
    Transcript,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_lowercase().as_str() {
        "url" | "u" if !rest.is_empty() => Command::Url(with_scheme(rest)),
        "models" | "m" if rest.is_empty() => Command::Models,
        "model" | "m" if !rest.is_empty() => Command::Model(rest.to_string()),
        "model" => Command::Models,
        "summarize" | "summary" | "s" => Command::Summarize,
        "transcript" | "t" => Command::Transcript,
        "help" | "h" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ if rest.is_empty() && looks_like_url(line) => Command::Url(with_scheme(line)),
        _ => Command::Unknown(line.to_string()),
    }
}

fn is_bare_youtube_link(input: &str) -> bool {
    BARE_HOSTS.iter().any(|host| input.starts_with(host))
}

fn looks_like_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://") || is_bare_youtube_link(input)
}

/// `youtu.be/ID` becomes `https://youtu.be/ID`; anything else is left alone
fn with_scheme(input: &str) -> String {
    if is_bare_youtube_link(input) {
        format!("https://{}", input)
    } else {
        input.to_string()
    }
}

/// Line editing through `Term` reads the controlling terminal, so it is only
/// used when both ends are attached to one.
fn reads_from_terminal(stdin_is_term: bool, stdout_is_term: bool) -> bool {
    stdin_is_term && stdout_is_term
}

/// Result of picking from the model list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelChoice {
    Named(String),
    Custom,
}

/// Interpret a model argument: a 1-based index into `candidates`, the custom
/// entry, or a literal model name.
pub fn resolve_model_choice(arg: &str, candidates: &[String]) -> ModelChoice {
    let arg = arg.trim();

    if let Ok(index) = arg.parse::<usize>() {
        if index == candidates.len() + 1 {
            return ModelChoice::Custom;
        }
        if let Some(model) = index.checked_sub(1).and_then(|i| candidates.get(i)) {
            return ModelChoice::Named(model.clone());
        }
    }

    if arg.eq_ignore_ascii_case(CUSTOM_MODEL) || arg.eq_ignore_ascii_case("custom") {
        return ModelChoice::Custom;
    }

    ModelChoice::Named(arg.to_string())
}

/// First `max_lines` lines of a text, and how many were left out
pub fn preview(text: &str, max_lines: usize) -> (String, usize) {
    let total = text.lines().count();
    let shown = text.lines().take(max_lines).collect::<Vec<_>>().join("\n");
    (shown, total.saturating_sub(max_lines))
}

/// Terminal front end for a [`Shell`]
pub struct Repl<S, C> {
    shell: Shell<S, C>,
    models: Vec<String>,
    term: Term,
    quiet: bool,
}

impl<S: TranscriptSource, C: ChatClient> Repl<S, C> {
    pub fn new(shell: Shell<S, C>, models: Vec<String>, quiet: bool) -> Self {
        Self {
            shell,
            models,
            term: Term::stdout(),
            quiet,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.print_banner()?;

        loop {
            self.term.write_str(&format!("{} ", style("ytsum>").cyan().bold()))?;
            let Some(line) = self.read_input()? else {
                break;
            };

            match parse_command(&line) {
                Command::Url(url) => self.handle_url(&url).await?,
                Command::Models => self.print_models()?,
                Command::Model(arg) => self.handle_model(&arg)?,
                Command::Summarize => self.handle_summarize().await?,
                Command::Transcript => self.print_transcript(None)?,
                Command::Help => self.print_help()?,
                Command::Quit => break,
                Command::Empty => {}
                Command::Unknown(input) => self.error(&format!(
                    "Unknown command: {}. Type `help` for a list of commands.",
                    input
                ))?,
            }
        }

        Ok(())
    }

    /// Read one line; `None` once piped input is exhausted
    fn read_input(&self) -> Result<Option<String>> {
        if reads_from_terminal(std::io::stdin().is_terminal(), self.term.is_term()) {
            return Ok(Some(self.term.read_line()?));
        }

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    async fn handle_url(&mut self, url: &str) -> Result<()> {
        let progress = utils::spinner("Fetching transcript...", self.quiet);
        let result = self.shell.submit_url(url).await;
        progress.finish_and_clear();

        match result {
            Ok(FetchStatus::Fetched) => {
                self.heading("📝 Fetched Transcript")?;
                self.print_transcript(Some(PREVIEW_LINES))?;
                self.term.write_line(&format!(
                    "Model: {}. Type `summarize` to summarize, `models` to choose another model.",
                    style(self.shell.session().selected_model()).bold()
                ))?;
            }
            Ok(FetchStatus::Unchanged) => {
                self.info("Transcript already loaded for this URL.")?;
            }
            Err(e) => self.error(&format!("⚠️  {}", e))?,
        }

        Ok(())
    }

    fn handle_model(&mut self, arg: &str) -> Result<()> {
        let model = match resolve_model_choice(arg, &self.models) {
            ModelChoice::Named(model) => model,
            ModelChoice::Custom => {
                self.term.write_str("Ollama model name: ")?;
                self.read_input()?.unwrap_or_default().trim().to_string()
            }
        };

        if model.is_empty() {
            return self.error("Please enter an Ollama Model Name.");
        }

        self.shell.select_model(model);
        self.info(&format!("Using model: {}", self.shell.session().selected_model()))
    }

    async fn handle_summarize(&mut self) -> Result<()> {
        let model = self.shell.session().selected_model().to_string();
        let progress = utils::spinner(
            format!(
                "Sending transcript to local Ollama model '{}'... This may take a moment.",
                model
            ),
            self.quiet,
        );
        let result = self.shell.summarize().await;
        progress.finish_and_clear();

        match result {
            Ok(summary) => {
                self.heading(&format!("Summary from Ollama Model: {}", model))?;
                self.term.write_line(&summary)?;
                self.term
                    .write_line(&style("Summarization complete!").green().to_string())?;
            }
            Err(e) => self.error(&e.to_string())?,
        }

        Ok(())
    }

    fn print_transcript(&self, max_lines: Option<usize>) -> Result<()> {
        let Some(transcript) = self.shell.session().transcript() else {
            return self.info("No transcript available or fetched yet. Paste a YouTube URL first.");
        };
        if transcript.is_empty() {
            return self.info("The transcript has no text.");
        }

        let (text, hidden) = match max_lines {
            Some(max) => preview(transcript.text(), max),
            None => (transcript.text().to_string(), 0),
        };

        self.term.write_line(&text)?;
        if hidden > 0 {
            self.term.write_line(
                &style(format!(
                    "... {} more lines (type `transcript` to show all)",
                    hidden
                ))
                .dim()
                .to_string(),
            )?;
        }
        self.term.write_line(
            &style(format!(
                "{} fragments, {}",
                transcript.fragments.len(),
                utils::format_duration(transcript.duration())
            ))
            .dim()
            .to_string(),
        )?;

        Ok(())
    }

    fn print_models(&self) -> Result<()> {
        let selected = self.shell.session().selected_model();

        self.heading("Choose Ollama Model")?;
        for (i, model) in self.models.iter().enumerate() {
            let marker = if model == selected { "*" } else { " " };
            self.term.write_line(&format!("{} {}. {}", marker, i + 1, model))?;
        }
        self.term
            .write_line(&format!("  {}. {}", self.models.len() + 1, CUSTOM_MODEL))?;
        self.term
            .write_line("Select with `model <number>` or `model <name>`.")?;

        Ok(())
    }

    fn print_banner(&self) -> Result<()> {
        self.term.write_line(
            &style("📼 YouTube Transcript & Local Ollama Summarizer")
                .bold()
                .to_string(),
        )?;
        self.term.write_line(
            "Paste a YouTube video URL to fetch its transcript, then summarize it using your local Ollama model.",
        )?;
        self.term.write_line(
            &style("Requires a running Ollama instance with the chosen model downloaded (e.g. `ollama run llama2`).")
                .dim()
                .to_string(),
        )?;
        self.print_help()
    }

    fn print_help(&self) -> Result<()> {
        self.term.write_line("Commands:")?;
        self.term.write_line("  <url> | url <url>     fetch the transcript of a YouTube video")?;
        self.term.write_line("  transcript            show the full transcript")?;
        self.term.write_line("  models                list models")?;
        self.term.write_line("  model <number|name>   choose the model used for summaries")?;
        self.term.write_line("  summarize             summarize the transcript")?;
        self.term.write_line("  help                  show this help")?;
        self.term.write_line("  quit                  exit")?;
        Ok(())
    }

    fn heading(&self, text: &str) -> Result<()> {
        self.term.write_line("")?;
        self.term.write_line(&style(text).bold().underlined().to_string())?;
        Ok(())
    }

    fn info(&self, text: &str) -> Result<()> {
        self.term.write_line(&style(text).blue().to_string())?;
        Ok(())
    }

    fn error(&self, text: &str) -> Result<()> {
        self.term.write_line(&style(text).red().to_string())?;
        Ok(())
    }
}
