//! gif-probe
//!
//! Feeds a GIF file to the incremental parser in fixed-size chunks and prints
//! what it learned about the stream, optionally decoding every frame.

use std::fs;
use std::io;
use std::process::ExitCode;

use clap::Parser;
use gif_stream::config::{CliArgs, OutputFormat, ProbeConfig};
use gif_stream::error::Result;
use gif_stream::frames::decode_frame;
use gif_stream::parser::{GifReader, ParseQuery, ParseStatus};
use gif_stream::report::{DecodeOutcome, StreamReport};

use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = CliArgs::parse();

    match run(&args) {
        Ok(report) => {
            if report.has_decode_failures() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        },
        Err(e) => {
            error!(%e, "probe failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}

fn run(args: &CliArgs) -> Result<StreamReport> {
    let config = ProbeConfig::load_with_args(args)?;
    debug!(?config, "configuration loaded");

    let data = fs::read(&args.input)?;
    info!(path = %args.input.display(), bytes = data.len(), "read input");

    let mut reader = GifReader::streaming(config.reader.clone());
    let mut status = ParseStatus::InsufficientData;
    for chunk in data.chunks(config.chunk_size) {
        reader.push_data(chunk);
        status = reader.parse(ParseQuery::FrameCount)?;
    }
    if status == ParseStatus::InsufficientData {
        warn!(state = ?reader.state(), "stream ended before the trailer");
    }

    let mut report = StreamReport::from_reader(&reader);

    if config.decode_frames {
        for index in 0..reader.images_count() {
            let outcome = match decode_frame(&mut reader, index, config.max_frame_pixels) {
                Ok(Some(frame)) => DecodeOutcome::Complete {
                    rows: frame.rows_written,
                },
                Ok(None) => DecodeOutcome::Incomplete,
                Err(e) => {
                    warn!(frame = index, %e, "decode failed");
                    DecodeOutcome::Failed {
                        error: e.to_string(),
                    }
                },
            };
            report.set_decode_outcome(index, outcome);
        }
    }

    match config.format {
        OutputFormat::Text => print!("{}", report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(report)
}
