pub mod cli;
pub mod config;
pub mod downloader;
pub mod logging;
pub mod server;

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use cli::{Cli, Command};
use downloader::tools::ToolManager;

/// Parse arguments, start the runtime and dispatch to a surface
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.as_ref();
    logging::init(cli.global.log_level(Command::default_log_level(command)));
    let settings = cli.global.settings(Command::default_save_dir(command));

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start runtime: {}", e);
            return ExitCode::from(1);
        }
    };

    let code = match cli.command {
        None => runtime.block_on(cli::run_interactive(settings)),
        Some(Command::Serve { bind }) => {
            let settings = settings.with_bind(bind);
            match runtime.block_on(server::start_server(settings)) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    error!("server failed: {:#}", e);
                    eprintln!("error: {:#}", e);
                    ExitCode::from(1)
                }
            }
        }
        Some(Command::Tools) => {
            let manager: ToolManager = settings.tool_manager();
            cli::print_tools(&manager.get_all_tools());
            ExitCode::SUCCESS
        }
    };

    // A prompt may still be parked in a blocking read after Ctrl-C
    runtime.shutdown_background();
    code
}
