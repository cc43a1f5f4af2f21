use std::process::ExitCode;

fn main() -> ExitCode {
    tube_fetch::run()
}
