use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use audio_playback::device::{Devices, Output};
use audio_playback::{Playback, PlaybackOptions, PlaybackError, Position, Sound};

/// Play audio files through an output device.
#[derive(Parser, Debug)]
#[command(name = "audio-playback", version)]
struct Cli {
    /// Audio files to play; several files are mixed into one stream
    files: Vec<PathBuf>,

    /// List the available output devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Output device for playback, by name or id
    #[arg(short, long)]
    output: Option<String>,

    /// Frames per callback buffer
    #[arg(short, long)]
    buffer_size: Option<usize>,

    /// Direct audio to the given output channel(s), e.g. -c 0,1
    #[arg(short, long, value_delimiter = ',')]
    channels: Option<Vec<usize>>,

    /// Start playback at the given position, e.g. 1:20.5
    #[arg(short, long)]
    seek: Option<String>,

    /// Play for the given length of time
    #[arg(short, long)]
    duration: Option<String>,

    /// Stop playback at the given position
    #[arg(short, long)]
    end_position: Option<String>,

    /// Output latency in seconds
    #[arg(short, long)]
    latency: Option<f64>,

    /// Loop playback until interrupted
    #[arg(long = "loop")]
    is_looping: bool,

    /// Run verbosely
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), PlaybackError> {
    let devices = Devices::new()?;

    if cli.list_devices {
        for output in devices.outputs() {
            println!("{}. {}", output.id(), output.name());
        }
        return Ok(());
    }
    if cli.files.is_empty() {
        eprintln!("no files given; nothing to play");
        return Ok(());
    }

    let output = select_output(&devices, cli.output.as_deref())?;

    let sounds = cli
        .files
        .iter()
        .map(Sound::load)
        .collect::<Result<Vec<_>, _>>()?;

    let options = PlaybackOptions {
        buffer_size: cli.buffer_size,
        channels: cli.channels,
        seek: parse_position(cli.seek.as_deref())?,
        duration: parse_position(cli.duration.as_deref())?,
        end_position: parse_position(cli.end_position.as_deref())?,
        is_looping: cli.is_looping,
        latency: cli.latency,
    };

    let mut playback = Playback::new(sounds, output, options)?;
    if cli.verbose {
        report(&playback);
    }
    playback.start()?;
    playback.block()
}

fn select_output<'a>(
    devices: &'a Devices,
    request: Option<&str>,
) -> Result<&'a Output, PlaybackError> {
    match request {
        None => devices.default_output(),
        Some(request) => devices
            .by_name(request)
            .or_else(|| {
                request
                    .parse()
                    .ok()
                    .and_then(|id| devices.by_id(id))
            })
            .ok_or(PlaybackError::DeviceNotFound),
    }
}

fn parse_position(text: Option<&str>) -> Result<Option<Position>, PlaybackError> {
    Ok(text.map(Position::parse).transpose()?)
}

fn report(playback: &Playback) {
    for sound in playback.sounds() {
        if let Some(file) = sound.file() {
            println!("Sound report for {}", file.path().display());
            println!("  Sample rate: {}", sound.sample_rate());
            println!("  Channels: {}", sound.num_channels());
            println!("  File size: {}", file.size());
        }
    }
    println!("Playback report ({})", playback.id());
    println!("  Number of channels: {}", playback.num_channels());
    if let Some(channels) = playback.channels() {
        println!("  Direct audio to channels: {channels:?}");
    }
    if let Some(truncation) = playback.truncation() {
        println!(
            "  Frames: {}..{}",
            truncation.start_frame, truncation.end_frame
        );
    }
    println!("  Buffer size: {}", playback.buffer_size());
    println!("  Latency: {}", playback.output().latency());
    println!("  Data size: {} bytes", playback.data_size());
}
