use clap::Parser;
use snafu::Report;

use crate::cli::Opts;

mod cli;
mod commands;
mod logging;

const LOG_ENV: &str = "K8S_MANIFEST_LOG";

fn main() -> Report<commands::Error> {
    Report::capture(|| {
        let opts = Opts::parse();
        logging::initialize_logging(LOG_ENV, opts.log_format);

        commands::run(opts, &mut std::io::stdout().lock(), &mut std::io::stderr())
    })
}
