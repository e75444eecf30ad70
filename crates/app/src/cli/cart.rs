use clap::{Args, Subcommand};
use orderly_app::{
    database::{self, Db, PoolOptions},
    domain::carts::{
        models::CartUuid,
        store::{CartStore, CartTransaction, PgCartStore},
    },
};

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Delete a cart with its items and shipment details
    Remove(RemoveArgs),
}

#[derive(Debug, Args)]
struct RemoveArgs {
    /// Cart reference
    #[arg(long)]
    cart: CartUuid,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(command: CartCommand) -> Result<(), String> {
    match command.command {
        CartSubcommand::Remove(args) => remove(args).await,
    }
}

async fn remove(args: RemoveArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url, PoolOptions::default())
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let store = PgCartStore::new(Db::new(pool));

    let mut tx = store
        .begin()
        .await
        .map_err(|error| format!("failed to start transaction: {error}"))?;

    let removed = tx
        .delete_cart(args.cart)
        .await
        .map_err(|error| format!("failed to delete cart: {error}"))?;

    if removed == 0 {
        return Err(format!("cart {} not found", args.cart));
    }

    tx.commit()
        .await
        .map_err(|error| format!("failed to commit: {error}"))?;

    println!("removed cart {}", args.cart);

    Ok(())
}
