use clap::Parser;
use overlay_live::config::{Cli, Command};
use overlay_live::{demo, session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Watch(args) => {
            let shutdown = async {
                let _ = tokio::signal::ctrl_c().await;
            };
            let outcome = session::run_overlay(&args, shutdown).await?;
            log::info!("overlay stopped: {:?}", outcome);
            Ok(())
        }
        Command::Demo(args) => {
            println!("Demo feed on ws://{}/dota-gsi/live/<auth>", args.bind);
            demo::run_demo(args.bind.clone(), args.interval()).await
        }
    }
}
