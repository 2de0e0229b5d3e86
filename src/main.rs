use std::io::{self, Read};
use std::process::ExitCode;

use log::info;

use ramanprep::dispatch::{self, TransformRequest};

/// Read one JSON transform request from stdin, apply it, and write the
/// JSON response to stdout. Rejected requests are reported on stderr
/// with a non-zero exit status.
fn main() -> io::Result<ExitCode> {
    env_logger::init();

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let request: TransformRequest = match serde_json::from_str(&buffer) {
        Ok(request) => request,
        Err(err) => {
            eprintln!("malformed input: {err}");
            return Ok(ExitCode::from(2));
        }
    };
    info!("Applying {}", request.operation());

    match dispatch::apply(request) {
        Ok(response) => {
            let stdout = io::stdout().lock();
            if let Err(err) = serde_json::to_writer(stdout, &response) {
                eprintln!("failed to serialize response: {err}");
                return Ok(ExitCode::FAILURE);
            }
            println!();
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{err}");
            Ok(ExitCode::FAILURE)
        }
    }
}
