//! chatpipe - pipe text and images into a chat-completion model.
//!
//! Reads standard input, drops it into a user prompt template, sends the
//! result to an OpenAI-compatible chat-completions endpoint and prints the
//! model's reply.

mod config;
mod error;
mod llm;
mod prompt;
mod protocol;

use anyhow::{Context, Result};
use clap::Parser;
use config::Config;
use error::ChatpipeError;
use llm::OpenAIClient;
use protocol::{build_request, Image, ImageDetail, RequestOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::AsyncRead;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "chatpipe")]
#[command(author, version, about = "Pipe text and images into a chat-completion model")]
#[command(long_about = "Reads standard input, substitutes it for {{contents}} in the user prompt \
and prints the model's reply.\n\nExample:\n  git diff | chatpipe --system-prompt 'You review code.' \
--user-prompt 'Review this diff:\\n{{contents}}'")]
struct Cli {
    /// System prompt sent as the first message
    #[arg(long, value_name = "TEXT")]
    system_prompt: String,

    /// User prompt template; {{contents}} is replaced by standard input
    #[arg(long, value_name = "TEXT")]
    user_prompt: String,

    /// API key (falls back to OPENAI_API_KEY, then the config file)
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    /// Ask the model for a JSON object response
    #[arg(long)]
    json_mode: bool,

    /// Local image files to attach (sent inline as base64)
    #[arg(long, value_name = "PATH", num_args = 1..)]
    images: Vec<PathBuf>,

    /// Remote image URLs to attach
    #[arg(long, value_name = "URL", num_args = 1..)]
    image_urls: Vec<String>,

    /// Model identifier [default: gpt-4o]
    #[arg(short = 'm', long, value_name = "MODEL")]
    model: Option<String>,

    /// Image detail level
    #[arg(long, value_enum, default_value_t = ImageDetail::Auto)]
    detail: ImageDetail,

    /// Maximum tokens in the completion [default: 4000]
    #[arg(long, value_name = "N")]
    max_tokens: Option<u32>,

    /// API base URL [default: https://api.openai.com/v1]
    #[arg(long, value_name = "URL", env = "OPENAI_BASE_URL")]
    api_base: Option<String>,

    /// Use this config file instead of ~/.config/chatpipe/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging();

    let env_key = std::env::var(config::API_KEY_ENV).ok();
    let code = run(cli, env_key, tokio::io::stdin()).await?;
    Ok(ExitCode::from(code))
}

/// Run one invocation and return the process exit code.
///
/// A missing credential prints its message and yields 1 before `stdin` is
/// touched. Any HTTP response, including an error status, yields 0.
async fn run<R>(cli: Cli, env_key: Option<String>, stdin: R) -> Result<u8>
where
    R: AsyncRead + Unpin,
{
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let api_key = match config::resolve_api_key(cli.api_key.as_deref(), env_key.as_deref(), &config)
    {
        Ok(key) => key,
        Err(e @ ChatpipeError::MissingApiKey) => {
            println!("{}", e);
            return Ok(1);
        }
        Err(e) => return Err(e.into()),
    };

    let input = prompt::read_input(stdin).await?;
    debug!(bytes = input.len(), "Read standard input");
    let user_text = prompt::render(&cli.user_prompt, &input);

    let images = collect_images(&cli.images, &cli.image_urls)?;

    let options = RequestOptions {
        model: cli.model.unwrap_or(config.model),
        max_tokens: cli.max_tokens.unwrap_or(config.max_tokens),
        json_mode: cli.json_mode,
        detail: cli.detail,
    };
    let request = build_request(&options, &cli.system_prompt, user_text, &images);
    info!(
        model = %options.model,
        images = images.len(),
        json_mode = options.json_mode,
        "Built request"
    );

    let api_base = cli.api_base.unwrap_or(config.api_base);
    let client = OpenAIClient::new(
        &api_base,
        api_key,
        Duration::from_secs(config.timeout_secs),
    )?;
    debug!(endpoint = client.endpoint(), "HTTP client ready");

    let completion = client.complete(&request).await?;
    println!("{}", completion.render());

    Ok(0)
}

/// Initialize logging on stderr so stdout carries only the reply.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("chatpipe=warn,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Local files first, then remote URLs, each in argument order.
fn collect_images(paths: &[PathBuf], urls: &[String]) -> Result<Vec<Image>> {
    let mut images = Vec::with_capacity(paths.len() + urls.len());
    for path in paths {
        images.push(Image::from_path(path)?);
        debug!(path = %path.display(), "Attached image file");
    }
    images.extend(urls.iter().cloned().map(Image::from_url));
    Ok(images)
}
