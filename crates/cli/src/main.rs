use std::process::ExitCode;

fn main() -> ExitCode {
    renewlens_cli::run()
}
