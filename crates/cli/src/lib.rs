pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::route::RouteRequest;

#[derive(Debug, Parser)]
#[command(
    name = "helpdesk",
    about = "Helpdesk router operator CLI",
    long_about = "Prepare the helpdesk record store and route requests through the agents in-process.",
    after_help = "Examples:\n  helpdesk seed\n  helpdesk route \"Get customer information for ID 5\"\n  helpdesk route \"escalate this\" --intent escalate --customer-id 2"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Migrate, load the demo customers and tickets, then verify them")]
    Seed,
    #[command(about = "Route one request against the configured database and print the envelope")]
    Route {
        #[arg(help = "Free-text request to classify and route")]
        text: String,
        #[arg(long, help = "Customer id to use when the text does not name one")]
        customer_id: Option<i64>,
        #[arg(long, help = "New email address for update requests")]
        new_email: Option<String>,
        #[arg(long, help = "Force a route label (DATA, SUPPORT, MULTI_*); unknown labels fall back to support")]
        intent: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Route { text, customer_id, new_email, intent } => {
            commands::route::run(RouteRequest { text, customer_id, new_email, intent })
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
