use pipeport_frame::{AudioFormat, Codec};
use serde::Serialize;

use crate::cmd::InfoArgs;
use crate::exit::{format_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct FormatInfo {
    codec: &'static str,
    clock_rate: u32,
    channels: u16,
    ptime_ms: u32,
    samples_per_frame: u32,
    frame_samples: usize,
    pipeline_frame_bytes: usize,
    transport_frame_bytes: usize,
    frame_duration_us: u64,
    transport_bits_per_second: u64,
}

pub fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let codec = Codec::from(args.codec);
    let audio = AudioFormat::with_ptime(
        args.format.rate,
        args.format.channels,
        args.format.ptime,
        codec,
    )
    .map_err(format_error)?;

    let out = describe(&audio, args.format.ptime);
    let rows = [
        ("codec", out.codec.to_string()),
        ("clock rate", format!("{} Hz", out.clock_rate)),
        ("channels", out.channels.to_string()),
        ("ptime", format!("{} ms", out.ptime_ms)),
        ("samples/frame", out.samples_per_frame.to_string()),
        ("pipeline frame", format!("{} bytes", out.pipeline_frame_bytes)),
        ("transport frame", format!("{} bytes", out.transport_frame_bytes)),
        (
            "transport rate",
            format!("{} bit/s", out.transport_bits_per_second),
        ),
    ];
    print_record(&out, &rows, format);
    Ok(SUCCESS)
}

fn describe(audio: &AudioFormat, ptime_ms: u32) -> FormatInfo {
    let transport_bits_per_second = match audio.codec() {
        Codec::Linear16 => audio.avg_bits_per_second(),
        Codec::ALaw => audio.avg_bits_per_second() / 2,
    };
    FormatInfo {
        codec: audio.codec().name(),
        clock_rate: audio.clock_rate(),
        channels: audio.channel_count(),
        ptime_ms,
        samples_per_frame: audio.samples_per_frame(),
        frame_samples: audio.frame_samples(),
        pipeline_frame_bytes: audio.pipeline_frame_bytes(),
        transport_frame_bytes: audio.transport_frame_bytes(),
        frame_duration_us: u64::try_from(audio.frame_duration().as_micros()).unwrap_or(u64::MAX),
        transport_bits_per_second,
    }
}
