mod opt;
mod command;

use crate::command::Commands;
use crate::opt::Opt;
use clap::Parser;
use shared::success_err;

const CONFIG_PATH_ENV: &str = "TUNCTL_CONFIG";
const LOG_DIR: &str = "logs";
const LOG_PREFIX: &str = "tunctl.log";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let opt = Opt::parse();
    let _guard = match opt.init_logging() {
        Ok(guard) => guard,
        Err(err) => {
            success_err!("{}\n", err);
            std::process::exit(1);
        }
    };

    let config = match opt.load_config(true) {
        Ok(config) => config,
        Err(err) => {
            success_err!("load config: {}\n", err);
            std::process::exit(1);
        }
    };

    match opt.cmd {
        Commands::Alloc(cmd) => cmd.exec(config).await,
        Commands::Show => command::show::exec(&opt.config, &config),
    }
}
