use clap::{Parser, Subcommand};

mod cart;
mod db;

#[derive(Debug, Parser)]
#[command(name = "orderly-app", about = "Orderly CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Cart(cart::CartCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Cart(command) => cart::run(command).await,
        }
    }
}
