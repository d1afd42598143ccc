use std::process::ExitCode;

fn main() -> ExitCode {
    match annotd::run_stdio() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("annotd: {error}");
            ExitCode::FAILURE
        }
    }
}
