use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ytsum",
    about = "YouTube Transcript & Local Ollama Summarizer",
    version,
    long_about = "Fetch the transcript of a YouTube video and summarize it with a model served by a local Ollama instance. Run without a command to start the interactive shell."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Ollama server URL (overrides the config file)
    #[arg(long, global = true, env = "OLLAMA_HOST", value_name = "URL")]
    pub ollama_host: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive shell (default)
    Shell,

    /// Fetch and print the transcript of a video
    Transcript {
        /// YouTube URL (youtube.com/watch?v=... or youtu.be/...)
        #[arg(value_name = "URL")]
        url: String,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Caption language code; repeat to give fallbacks (default: from config)
        #[arg(short, long = "language", value_name = "LANG")]
        languages: Vec<String>,
    },

    /// Fetch a transcript and summarize it with an Ollama model
    Summarize {
        /// YouTube URL (youtube.com/watch?v=... or youtu.be/...)
        #[arg(value_name = "URL")]
        url: String,

        /// Ollama model name (default: from config)
        #[arg(short, long, value_name = "MODEL")]
        model: Option<String>,

        /// Write the summary as Markdown to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Caption language code; repeat to give fallbacks (default: from config)
        #[arg(short, long = "language", value_name = "LANG")]
        languages: Vec<String>,
    },

    /// List the caption tracks available for a video
    Languages {
        /// YouTube URL (youtube.com/watch?v=... or youtu.be/...)
        #[arg(value_name = "URL")]
        url: String,
    },

    /// List configured and installed Ollama models
    Models,

    /// Show or locate the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text, one caption per line
    Text,
    /// JSON with timestamps
    Json,
    /// SRT subtitle format
    Srt,
    /// WebVTT format
    Vtt,
}
