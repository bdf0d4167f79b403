use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use pipeport_frame::{Codec, DEFAULT_PTIME_MS};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod info;
pub mod mkfifo;
pub mod transcode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pump audio frames from one pipe to another, converting the codec.
    Transcode(TranscodeArgs),
    /// Print the frame geometry of an audio format.
    Info(InfoArgs),
    /// Create a named pipe.
    Mkfifo(MkfifoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Transcode(args) => transcode::run(args, format),
        Command::Info(args) => info::run(args, format),
        Command::Mkfifo(args) => mkfifo::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Transport codec as spelled on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum CodecArg {
    /// 16-bit linear PCM, native byte order.
    Linear,
    /// G.711 A-law.
    Alaw,
}

impl From<CodecArg> for Codec {
    fn from(arg: CodecArg) -> Self {
        match arg {
            CodecArg::Linear => Codec::Linear16,
            CodecArg::Alaw => Codec::ALaw,
        }
    }
}

/// Parameters shared by every command that builds an audio format.
#[derive(Args, Debug, Clone)]
pub struct FormatArgs {
    /// Sample clock rate in Hz.
    #[arg(long, default_value = "8000", env = "PIPEPORT_RATE")]
    pub rate: u32,
    /// Channel count (1 or 2).
    #[arg(long, default_value = "1", env = "PIPEPORT_CHANNELS")]
    pub channels: u16,
    /// Frame duration in milliseconds.
    #[arg(long, default_value_t = DEFAULT_PTIME_MS, env = "PIPEPORT_PTIME")]
    pub ptime: u32,
}

#[derive(Args, Debug)]
pub struct TranscodeArgs {
    /// Pipe or file to read frames from.
    pub input: PathBuf,
    /// Existing pipe or file to write frames to.
    pub output: PathBuf,
    #[command(flatten)]
    pub format: FormatArgs,
    /// Codec of the input stream.
    #[arg(long, value_enum, default_value = "alaw")]
    pub from: CodecArg,
    /// Codec of the output stream.
    #[arg(long, value_enum, default_value = "linear")]
    pub to: CodecArg,
    /// Stop after N frames.
    #[arg(long)]
    pub frames: Option<u64>,
    /// Treat a partially written frame as an error.
    #[arg(long)]
    pub strict_writes: bool,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub format: FormatArgs,
    /// Transport codec.
    #[arg(long, value_enum, default_value = "alaw")]
    pub codec: CodecArg,
}

#[derive(Args, Debug)]
pub struct MkfifoArgs {
    /// Path of the FIFO to create.
    pub path: PathBuf,
    /// Permission bits, in octal.
    #[arg(long, default_value = "600", value_parser = parse_octal_mode)]
    pub mode: u32,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn parse_octal_mode(value: &str) -> Result<u32, String> {
    let digits = value.trim_start_matches("0o");
    let mode = u32::from_str_radix(digits, 8).map_err(|err| format!("invalid octal mode: {err}"))?;
    if mode > 0o7777 {
        return Err(format!("mode {value} is out of range"));
    }
    Ok(mode)
}
