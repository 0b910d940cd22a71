use crate::demo::{run_demo, run_salary_report, DemoArgs, SalaryReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use medcomp::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Medical Compensation Explorer",
    about = "Serve and explore aggregated medical compensation data from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Aggregate a salary CSV export and print the report
    Report(SalaryReportArgs),
    /// Run an end-to-end demo covering the report and the submission form
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_salary_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
