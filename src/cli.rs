use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "ytbrief",
    about = "Summarize YouTube videos and ask questions about them",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Show config and model details on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the web app and JSON API
    Serve {
        /// Address to bind (default from config, else 127.0.0.1)
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on (default from config, else 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Fetch a transcript and print its summary
    Summarize {
        /// YouTube video URL
        url: String,

        /// Output format: text (default), json
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Preferred caption language
        #[arg(short, long)]
        lang: Option<String>,

        /// Model used for the summary
        #[arg(long)]
        model: Option<String>,
    },

    /// Ask a question about a video's transcript
    Ask {
        /// YouTube video URL
        url: String,

        /// The question to answer
        question: String,

        /// Preferred caption language
        #[arg(short, long)]
        lang: Option<String>,

        /// Model used for the answer
        #[arg(long)]
        model: Option<String>,
    },

    /// Print the Google consent URL for the captions API
    AuthUrl,
}
