use anyhow::Result;
use clap::{Parser, Subcommand};
use config::{Config, ConfigArgs};
use dispatcher::NotificationDispatcher;
use logging::init_logging;
use model::SendNotificationRequest;
use server::serve;

mod assertion;
mod config;
mod database;
mod dispatcher;
mod error;
mod fcm;
mod logging;
mod model;
mod server;

#[derive(Parser)]
struct Opts {
    #[clap(subcommand)]
    subcmd: SubCommand,
}

#[derive(Subcommand)]
enum SubCommand {
    /// Serve the notification endpoint over HTTP.
    Serve {
        #[clap(short, long)]
        port: Option<u16>,

        #[clap(flatten)]
        config: ConfigArgs,
    },
    /// Send the status notification to one user and exit.
    #[clap(name = "send")]
    Dispatch {
        #[clap(long)]
        user_id: String,

        #[clap(flatten)]
        config: ConfigArgs,
    },
}

fn load_dispatcher(args: ConfigArgs) -> Result<NotificationDispatcher> {
    let config = Config::from_args(args)?;

    Ok(NotificationDispatcher::from_config(config))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let opts = Opts::parse();

    match opts.subcmd {
        SubCommand::Serve { port, config } => {
            serve(port, load_dispatcher(config)?).await?;
        }
        SubCommand::Dispatch { user_id, config } => {
            let request = SendNotificationRequest {
                user_id: Some(user_id),
            };
            if let Err(error) = load_dispatcher(config)?.dispatch(request).await {
                tracing::error!(kind = error.kind(), ?error, "Error: {}", error);

                return Err(error.into());
            }
            tracing::info!("Notification dispatched.");
        }
    }

    Ok(())
}
