use energy_dashboard::dashboard::{parse_cli, print_output, run};
use energy_dashboard::observability::init_tracing;
use energy_dashboard::report::Banner;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = parse_cli();
    init_tracing(args.verbose);
    tracing::debug!(?args, "dashboard settings");

    match run(&args) {
        Ok(output) => {
            print_output(&output, &args.currency);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "dashboard run aborted");
            println!("{}", Banner::Error(e.to_string()));
            ExitCode::FAILURE
        }
    }
}
