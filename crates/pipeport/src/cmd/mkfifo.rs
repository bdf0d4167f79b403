use serde::Serialize;

use crate::cmd::MkfifoArgs;
use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct FifoCreated {
    path: String,
    mode: String,
}

pub fn run(args: MkfifoArgs, format: OutputFormat) -> CliResult<i32> {
    pipeport_transport::create_fifo(&args.path, args.mode)
        .map_err(|err| transport_error("mkfifo failed", err))?;
    tracing::info!(path = %args.path.display(), mode = %format!("{:o}", args.mode), "created fifo");

    let out = FifoCreated {
        path: args.path.display().to_string(),
        mode: format!("{:04o}", args.mode),
    };
    let rows = [("path", out.path.clone()), ("mode", out.mode.clone())];
    print_record(&out, &rows, format);
    Ok(SUCCESS)
}
