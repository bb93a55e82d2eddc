use std::process::ExitCode;

use log::error;

use fs2laynii::cli::help_text;
use fs2laynii::{parse_args, run, AppConfig, Invocation};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let request = match parse_args(std::env::args_os()) {
        Ok(Invocation::Run(request)) => request,
        Ok(Invocation::Help) => {
            println!("{}", help_text());
            return ExitCode::from(1);
        }
        // Flags desconocidos o valores mal formados: clap imprime y sale con 2.
        Err(e) => e.exit(),
    };

    let config = AppConfig::from_env();
    match run(&request, &config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(1)
        }
    }
}
