use clap::{Args, Subcommand};
use rediscart::context::AppContext;

use super::output;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Print a cart as JSON
    Show(CodeArgs),

    /// Delete a cart, its index entries and its promotion and voucher results
    Delete(CodeArgs),

    /// List a user's active carts on a site, newest first
    List(ListArgs),
}

#[derive(Debug, Args)]
struct CodeArgs {
    /// Cart code
    code: String,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Site id
    #[arg(long)]
    site: String,

    /// User id
    #[arg(long)]
    user: String,
}

pub(crate) async fn run(context: &AppContext, command: CartCommand) -> Result<(), String> {
    match command.command {
        CartSubcommand::Show(args) => show(context, args).await,
        CartSubcommand::Delete(args) => delete(context, args).await,
        CartSubcommand::List(args) => list(context, args).await,
    }
}

async fn show(context: &AppContext, args: CodeArgs) -> Result<(), String> {
    let cart = context
        .queries
        .cart_for_code(&args.code)
        .await
        .map_err(|error| format!("failed to load cart: {error}"))?
        .ok_or_else(|| format!("cart not found: {}", args.code))?;

    output::cart_json(&cart)
}

async fn delete(context: &AppContext, args: CodeArgs) -> Result<(), String> {
    let removed = context
        .carts
        .delete_cart(&args.code)
        .await
        .map_err(|error| format!("failed to delete cart: {error}"))?;

    match removed {
        Some(cart) => output::line(&format!("deleted: {}", cart.code)),
        None => output::line(&format!("not found: {}", args.code)),
    }
}

async fn list(context: &AppContext, args: ListArgs) -> Result<(), String> {
    let carts = context
        .queries
        .carts_for_site_and_user(&args.site, &args.user)
        .await
        .map_err(|error| format!("failed to list carts: {error}"))?;

    output::cart_lines(&carts)
}
