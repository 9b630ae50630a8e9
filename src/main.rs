use std::{io, process::ExitCode};

use execution_agent::{cli, diagnostics};

fn main() -> ExitCode {
    diagnostics::init();
    cli::run(std::env::args_os(), io::stdin().lock(), io::stdout().lock()).into()
}
