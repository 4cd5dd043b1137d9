use std::process::ExitCode;

fn main() -> ExitCode {
    mailduet_cli::run()
}
