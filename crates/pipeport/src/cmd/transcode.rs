use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pipeport_frame::{
    AudioFormat, AudioFrame, FrameError, FrameReader, FrameWriter, MediaPort, PortConfig,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::cmd::TranscodeArgs;
use crate::exit::{format_error, frame_error, CliError, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct PumpStats {
    pub frames: u64,
    pub bytes_written: u64,
    pub short_writes: u64,
    pub end_of_stream: bool,
    pub interrupted: bool,
}

#[derive(Serialize)]
struct TranscodeSummary {
    input: String,
    output: String,
    from: &'static str,
    to: &'static str,
    #[serde(flatten)]
    stats: PumpStats,
}

pub fn run(args: TranscodeArgs, format: OutputFormat) -> CliResult<i32> {
    let fmt = &args.format;
    let input_format = AudioFormat::with_ptime(fmt.rate, fmt.channels, fmt.ptime, args.from.into())
        .map_err(format_error)?;
    let output_format = AudioFormat::with_ptime(fmt.rate, fmt.channels, fmt.ptime, args.to.into())
        .map_err(format_error)?;

    // A FIFO open blocks until the peer end appears; the input side goes first.
    let mut reader = FrameReader::open(input_format, &args.input)
        .map_err(|err| frame_error("open input failed", err))?;
    reader.set_eof_callback(|port| {
        info!(port = %port.name, format = %port.format, "input reached end of stream");
    });
    let config = PortConfig {
        strict_writes: args.strict_writes,
        ..PortConfig::default()
    };
    let mut writer = FrameWriter::open_with_config(output_format, &args.output, config)
        .map_err(|err| frame_error("open output failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let stats = pump(&mut reader, &mut writer, args.frames, &running)
        .map_err(|err| frame_error("transcode failed", err))?;

    reader
        .close()
        .map_err(|err| frame_error("close input failed", err))?;
    writer
        .close()
        .map_err(|err| frame_error("close output failed", err))?;

    let out = TranscodeSummary {
        input: args.input.display().to_string(),
        output: args.output.display().to_string(),
        from: input_format.codec().name(),
        to: output_format.codec().name(),
        stats,
    };
    let rows = [
        ("input", format!("{} ({})", out.input, out.from)),
        ("output", format!("{} ({})", out.output, out.to)),
        ("frames", stats.frames.to_string()),
        ("bytes written", stats.bytes_written.to_string()),
        ("short writes", stats.short_writes.to_string()),
        ("end of stream", stats.end_of_stream.to_string()),
        ("interrupted", stats.interrupted.to_string()),
    ];
    print_record(&out, &rows, format);
    Ok(SUCCESS)
}

/// Move frames from `source` to `sink` until end of stream, `limit` frames,
/// or `running` is cleared. The flag is checked between frames.
pub(crate) fn pump(
    source: &mut dyn MediaPort,
    sink: &mut dyn MediaPort,
    limit: Option<u64>,
    running: &AtomicBool,
) -> Result<PumpStats, FrameError> {
    let mut stats = PumpStats::default();
    let mut frame = AudioFrame::for_format(&source.info().format);
    let expected = sink.info().format.transport_frame_bytes();

    loop {
        if !running.load(Ordering::SeqCst) {
            stats.interrupted = true;
            break;
        }
        if limit.is_some_and(|limit| stats.frames >= limit) {
            break;
        }

        match source.get_frame(&mut frame) {
            Ok(()) => {}
            Err(err) if err.is_end_of_stream() => {
                stats.end_of_stream = true;
                break;
            }
            Err(err) => return Err(err),
        }

        let written = sink.put_frame(&frame)?;
        if written < expected {
            stats.short_writes += 1;
        }
        stats.frames += 1;
        stats.bytes_written += written as u64;
    }

    debug!(
        frames = stats.frames,
        bytes = stats.bytes_written,
        end_of_stream = stats.end_of_stream,
        "pump finished"
    );
    Ok(stats)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
