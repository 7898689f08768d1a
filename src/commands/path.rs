use clap::Args;

use daylog::{config::LogConfig, rotation::PartitionKey};

#[derive(Args, Debug)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cmd {}

impl Cmd {
    pub fn run(&self, config: &LogConfig) -> eyre::Result<()> {
        let path = PartitionKey::today().file_path(&config.root);

        println!("{}", path.display());
        Ok(())
    }
}
