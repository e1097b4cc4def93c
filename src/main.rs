use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Result, bail};
use log::{debug, info};

mod cli;

use cli::{Cli, Command, OutputFormat};
use ytbrief::captions::CaptionsApi;
use ytbrief::config::{Config, Credentials};
use ytbrief::error::TranscriptError;
use ytbrief::llm::GeminiGenerator;
use ytbrief::oauth::GoogleOAuth;
use ytbrief::server::{self, AppState};
use ytbrief::youtube::{InnerTube, TranscriptProvider};
use ytbrief::{Summary, Transcript, output, summarize};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytbrief.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytbrief")
        .join("logs")
}

fn video_id_from(url: &str) -> Result<String> {
    ytbrief::extract_video_id(url).ok_or_else(|| {
        eyre::eyre!(
            "could not extract video ID from: {url}\n\nSupported formats:\n  https://www.youtube.com/watch?v=ID\n  https://youtu.be/ID"
        )
    })
}

async fn fetch_transcript(client: &reqwest::Client, url: &str, lang: &str) -> Result<Transcript> {
    let video_id = video_id_from(url)?;
    let transcript = match InnerTube::new(client.clone(), lang).fetch(&video_id).await {
        Ok(t) if !t.segments.is_empty() => t,
        Ok(_) | Err(TranscriptError::Unavailable(_)) => bail!("no transcript available for video {video_id}"),
        Err(e) => return Err(e.into()),
    };
    debug!("Fetched {} segments for {video_id}", transcript.segments.len());
    Ok(transcript)
}

async fn run_serve(config: &Config, credentials: &Credentials, bind: Option<String>, port: Option<u16>) -> Result<()> {
    let client = reqwest::Client::new();

    let gemini_key = credentials.gemini_key.as_deref();
    let summarizer = GeminiGenerator::new(client.clone(), config.summary_model(), gemini_key)?;
    let responder = GeminiGenerator::new(client.clone(), config.chat_model(), gemini_key)?;

    let oauth = credentials
        .google
        .as_ref()
        .map(|google| Arc::new(GoogleOAuth::new(client.clone(), google)));

    let captions = match (&oauth, credentials.google.as_ref().and_then(|g| g.refresh_token.clone())) {
        (Some(oauth), Some(refresh_token)) => Some(Arc::new(CaptionsApi::new(client.clone(), oauth.clone(), refresh_token))),
        _ => None,
    };

    let state = AppState {
        transcripts: Arc::new(InnerTube::new(client.clone(), config.lang())),
        summarizer: Arc::new(summarizer),
        responder: Arc::new(responder),
        oauth,
        captions,
    };

    let bind = bind.unwrap_or_else(|| config.bind().to_string());
    let port = port.unwrap_or_else(|| config.port());
    let addr: SocketAddr = format!("{bind}:{port}")
        .parse()
        .map_err(|e| eyre::eyre!("invalid bind address {bind}:{port}: {e}"))?;

    eprintln!("Listening on: http://{addr}");
    server::serve(addr, state).await
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    setup_logging()?;

    let cli = Cli::parse();

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_default();
    let credentials = Credentials::from_env();

    if cli.verbose {
        let config_path = ytbrief::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
        eprintln!(
            "Models: summary={} chat={}",
            config.summary_model(),
            config.chat_model()
        );
    }

    match cli.command {
        Command::Serve { bind, port } => run_serve(&config, &credentials, bind, port).await,

        Command::Summarize {
            url,
            format,
            lang,
            model,
        } => {
            let client = reqwest::Client::new();
            let lang = lang.as_deref().unwrap_or(config.lang());
            let model = model.as_deref().unwrap_or(config.summary_model());
            let generator = GeminiGenerator::new(client.clone(), model, credentials.gemini_key.as_deref())?;

            let transcript = fetch_transcript(&client, &url, lang).await?;
            let text = transcript.text();
            let summary = summarize::summarize(&generator, &text).await?;

            let summary = Summary {
                video_id: transcript.video_id,
                title: transcript.title,
                summary,
                transcript: text,
            };
            let rendered = match format {
                OutputFormat::Text => output::render_text(&summary),
                OutputFormat::Json => output::render_json(&summary),
            };
            println!("{rendered}");
            Ok(())
        }

        Command::Ask {
            url,
            question,
            lang,
            model,
        } => {
            let client = reqwest::Client::new();
            let lang = lang.as_deref().unwrap_or(config.lang());
            let model = model.as_deref().unwrap_or(config.chat_model());
            let generator = GeminiGenerator::new(client.clone(), model, credentials.gemini_key.as_deref())?;

            let transcript = fetch_transcript(&client, &url, lang).await?;
            let answer = summarize::answer(&generator, &transcript.text(), &question).await?;
            println!("{answer}");
            Ok(())
        }

        Command::AuthUrl => {
            let Some(google) = credentials.google.as_ref() else {
                bail!("GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET and GOOGLE_REDIRECT_URI must be set");
            };
            let oauth = GoogleOAuth::new(reqwest::Client::new(), google);
            println!("{}", oauth.authorization_url()?);
            Ok(())
        }
    }
}
