use clap::{Args, Subcommand};
use jiff::{Span, Timestamp, Zoned};
use rediscart::{
    context::AppContext,
    domain::carts::{RemovalFilter, records::CartRecord},
};
use tracing::info;

use super::output;

#[derive(Debug, Args)]
pub(crate) struct SweepCommand {
    #[command(subcommand)]
    command: SweepSubcommand,
}

#[derive(Debug, Subcommand)]
enum SweepSubcommand {
    /// Delete active carts untouched for longer than a given age
    Active(ActiveArgs),

    /// Delete saved carts whose expiration time has passed
    Saved(SavedArgs),
}

#[derive(Debug, Args)]
struct ActiveArgs {
    /// Site id
    #[arg(long)]
    site: String,

    /// Only sweep this user's carts
    #[arg(long)]
    user: Option<String>,

    /// Minimum age since last modification, e.g. "30d" or "PT12H"
    #[arg(long)]
    older_than: Span,

    /// List matching carts without deleting them
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct SavedArgs {
    /// Site id
    #[arg(long)]
    site: String,

    /// List matching carts without deleting them
    #[arg(long)]
    dry_run: bool,
}

pub(crate) async fn run(context: &AppContext, command: SweepCommand) -> Result<(), String> {
    match command.command {
        SweepSubcommand::Active(args) => active(context, args).await,
        SweepSubcommand::Saved(args) => saved(context, args).await,
    }
}

async fn active(context: &AppContext, args: ActiveArgs) -> Result<(), String> {
    let cutoff = removal_cutoff(&Zoned::now(), args.older_than)?;

    let carts = context
        .queries
        .carts_for_removal(&RemovalFilter {
            site_id: args.site,
            user_id: args.user,
            modified_before: cutoff,
        })
        .await
        .map_err(|error| format!("failed to find carts: {error}"))?;

    sweep(context, &carts, args.dry_run).await
}

/// The instant `older_than` before `now`, with calendar units such as days
/// measured in `now`'s time zone.
fn removal_cutoff(now: &Zoned, older_than: Span) -> Result<Timestamp, String> {
    if older_than.is_negative() {
        return Err("--older-than cannot be negative".to_string());
    }

    now.checked_sub(older_than)
        .map(|cutoff| cutoff.timestamp())
        .map_err(|error| format!("invalid --older-than: {error}"))
}

async fn saved(context: &AppContext, args: SavedArgs) -> Result<(), String> {
    let carts = context
        .queries
        .saved_carts_for_removal(&args.site, Timestamp::now())
        .await
        .map_err(|error| format!("failed to find carts: {error}"))?;

    sweep(context, &carts, args.dry_run).await
}

async fn sweep(context: &AppContext, carts: &[CartRecord], dry_run: bool) -> Result<(), String> {
    output::cart_lines(carts)?;

    if dry_run {
        info!(matched = carts.len(), "dry run, nothing deleted");

        return Ok(());
    }

    for cart in carts {
        context
            .carts
            .remove_cart(cart)
            .await
            .map_err(|error| format!("failed to delete cart {}: {error}", cart.code))?;
    }

    info!(deleted = carts.len(), "sweep complete");

    Ok(())
}
