use std::process::ExitCode;

fn main() -> ExitCode {
    omegapick_cli::run()
}
