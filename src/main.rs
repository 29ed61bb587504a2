use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yt_summarizer::cli::{Cli, Commands};
use yt_summarizer::config::Config;
use yt_summarizer::output;
use yt_summarizer::shell::{Repl, Session, Shell};
use yt_summarizer::summarize::OllamaClient;
use yt_summarizer::transcript::{TranscriptFetcher, YtDlpSource};
use yt_summarizer::utils;
use yt_summarizer::{parse_video_id, FetchError, Summarizer, VideoId};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "yt_summarizer=debug,ytsum=debug"
    } else {
        "yt_summarizer=warn,ytsum=info"
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load().await?;
    if let Some(host) = &cli.ollama_host {
        config.override_host(host)?;
    }

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            warn_missing_dependencies(&config).await;

            let source = transcript_source(&config, &[]);
            let client = ollama_client(&config)?;
            let session = Session::new(config.ollama.default_model.clone());

            let mut repl = Repl::new(
                Shell::new(source, client, session),
                config.model_candidates(),
                cli.quiet,
            );
            repl.run().await?;
        }
        Commands::Transcript {
            url,
            output,
            format,
            languages,
        } => {
            warn_missing_dependencies(&config).await;

            let video_id = video_id(&url)?;
            let fetcher = TranscriptFetcher::new(transcript_source(&config, &languages));

            let progress = utils::spinner("Fetching transcript...", cli.quiet);
            let transcript = fetcher.fetch_transcript(&video_id).await;
            progress.finish_and_clear();
            let transcript = transcript?;

            let content = output::render_transcript(&transcript, &format)?;
            match output {
                Some(path) => {
                    output::save_to_file(&content, &path)?;
                    println!("Transcript saved to: {}", path.display());
                }
                None => output::print_to_console(&content),
            }
        }
        Commands::Summarize {
            url,
            model,
            output,
            languages,
        } => {
            warn_missing_dependencies(&config).await;

            let video_id = video_id(&url)?;
            let model = model.unwrap_or_else(|| config.ollama.default_model.clone());
            let fetcher = TranscriptFetcher::new(transcript_source(&config, &languages));
            let summarizer = Summarizer::new(ollama_client(&config)?);

            let progress = utils::spinner("Fetching transcript...", cli.quiet);
            let transcript = fetcher.fetch_transcript(&video_id).await;
            progress.finish_and_clear();
            let transcript = transcript?;

            tracing::info!("Summarizing with model: {}", model);
            let progress = utils::spinner(
                format!(
                    "Sending transcript to local Ollama model '{}'... This may take a moment.",
                    model
                ),
                cli.quiet,
            );
            let summary = summarizer.summarize(transcript.text(), &model).await;
            progress.finish_and_clear();
            let summary = summary?;

            match output {
                Some(path) => {
                    let document = output::format_summary(&summary, &model, &video_id.watch_url());
                    output::save_to_file(&document, &path)?;
                    println!("Summary saved to: {}", path.display());
                }
                None => output::print_to_console(&summary),
            }
        }
        Commands::Languages { url } => {
            warn_missing_dependencies(&config).await;

            let video_id = video_id(&url)?;
            let fetcher = TranscriptFetcher::new(transcript_source(&config, &[]));

            let progress = utils::spinner("Listing transcripts...", cli.quiet);
            let tracks = fetcher.list_tracks(&video_id).await;
            progress.finish_and_clear();
            let tracks = tracks?;

            if tracks.is_empty() {
                println!("No transcripts available for {}", video_id);
            }
            for track in tracks {
                println!(
                    "  • {:<10} {}{}",
                    track.language_code,
                    track.language,
                    if track.is_generated { " (auto-generated)" } else { "" }
                );
            }
        }
        Commands::Models => {
            println!("Configured models:");
            for model in config.model_candidates() {
                let marker = if model == config.ollama.default_model { " (default)" } else { "" };
                println!("  • {}{}", model, marker);
            }

            let client = ollama_client(&config)?;
            match client.list_models().await {
                Ok(installed) => {
                    println!("Installed in Ollama ({}):", client.base_url());
                    for model in installed {
                        match model.size {
                            Some(bytes) => {
                                println!("  • {} ({})", model.name, utils::format_file_size(bytes))
                            }
                            None => println!("  • {}", model.name),
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Could not list installed models: {}", e);
                    eprintln!("⚠️  Could not reach Ollama at {}", client.base_url());
                }
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Configuration file: {}", Config::config_path()?.display());
                println!("Edit it to change the Ollama host, models or caption languages.");
            }
        }
    }

    Ok(())
}

fn video_id(url: &str) -> Result<VideoId> {
    parse_video_id(url)
        .ok_or_else(|| FetchError::UnrecognizedUrl(url.to_string()))
        .context("Expected a youtube.com/watch?v=... or youtu.be/... URL")
}

fn transcript_source(config: &Config, languages: &[String]) -> YtDlpSource {
    YtDlpSource::new()
        .with_binary(config.transcripts.yt_dlp_path.clone())
        .with_preference(config.track_preference(languages))
}

fn ollama_client(config: &Config) -> Result<OllamaClient> {
    let client = OllamaClient::new(config.ollama.host.clone());
    match config.request_timeout() {
        Some(timeout) => Ok(client.with_timeout(timeout)?),
        None => Ok(client),
    }
}

/// Check for required external tools (non-fatal)
async fn warn_missing_dependencies(config: &Config) {
    let missing = utils::check_dependencies(&config.transcripts.yt_dlp_path).await;
    if !missing.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - tools may be available)");
    }
}
