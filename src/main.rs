use std::process::ExitCode;

fn main() -> ExitCode {
    match peer_oracle_vcn::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        // Already reported through tracing
        Err(_) => ExitCode::FAILURE,
    }
}
