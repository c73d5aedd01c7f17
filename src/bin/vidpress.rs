//! vidpress CLI
//!
//! Sends a media file to the processing server and saves the result.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use vidpress::{
    JsonConfigFile, PemFileKeySource, ProcessingClient, ProcessingParams, ProcessingRequest,
};

/// vidpress CLI
#[derive(Parser, Debug)]
#[command(name = "vidpress")]
#[command(about = "Upload media to a processing server and save the result")]
#[command(version)]
struct Args {
    /// Client config (server_address, server_port, stream_rate)
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Stored PEM public key sent during the key exchange
    #[arg(short, long, default_value = "public.pem")]
    key: PathBuf,

    /// Directory to write the processed file into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Output file name (without extension)
    #[arg(short, long)]
    name: Option<String>,

    /// Source media file
    file: PathBuf,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Compress the file
    Compress,

    /// Change the resolution
    Resolution {
        /// Target resolution, e.g. 720p
        resolution: String,
    },

    /// Change the aspect ratio
    AspectRatio {
        /// Target aspect ratio, e.g. 16:9
        aspect_ratio: String,
    },

    /// Extract the audio track
    Audio,

    /// Cut a time range and convert it
    Clip {
        /// Start of the range in seconds
        start: u64,

        /// End of the range in seconds
        end: u64,

        /// Output format extension, e.g. gif
        extension: String,
    },
}

impl Action {
    fn into_params(self) -> vidpress::Result<ProcessingParams> {
        match self {
            Action::Compress => Ok(ProcessingParams::compress()),
            Action::Resolution { resolution } => ProcessingParams::resolution(resolution),
            Action::AspectRatio { aspect_ratio } => ProcessingParams::aspect_ratio(aspect_ratio),
            Action::Audio => Ok(ProcessingParams::audio_extract()),
            Action::Clip {
                start,
                end,
                extension,
            } => ProcessingParams::clip_to_format(start, end, extension),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vidpress=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    tracing::info!("vidpress v{}", vidpress::VERSION);

    let params = match args.action.into_params() {
        Ok(params) => params,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(2);
        }
    };

    let mut request = ProcessingRequest::new(&args.file, params);
    if let Some(name) = args.name {
        request = request.with_output_file_name(name);
    }

    let client = ProcessingClient::new(
        JsonConfigFile::new(&args.config),
        PemFileKeySource::new(&args.key),
    );

    let processed = match client.submit(&request).await {
        Ok(processed) => processed,
        Err(e) => {
            tracing::error!("Processing failed: {}", e);
            std::process::exit(1);
        }
    };

    let extension = &processed.file_extension;
    let output = match output_path(&args.output_dir, &processed.file_name, extension) {
        Ok(output) => output,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = tokio::fs::write(&output, &processed.file_bytes).await {
        tracing::error!("Failed to write {}: {}", output.display(), e);
        std::process::exit(1);
    }

    tracing::info!(
        "Saved {} ({} bytes)",
        output.display(),
        processed.file_bytes.len()
    );
}

/// Build `<dir>/<name>.<extension>`, refusing extensions that leave `dir`
fn output_path(dir: &Path, name: &str, extension: &str) -> Result<PathBuf, String> {
    if extension.contains(['/', '\\']) || extension.contains("..") {
        return Err(format!("Server returned an unsafe file extension: {:?}", extension));
    }
    Ok(dir.join(format!("{}.{}", name, extension)))
}
