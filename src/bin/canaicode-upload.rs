use canaicode::cli::UploadCli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = UploadCli::parse();
    if cli.execute() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
