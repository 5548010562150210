//! Command output on stdout.

use std::io::{self, Write};

use rediscart::domain::carts::records::CartRecord;

fn stdout_error(error: &io::Error) -> String {
    format!("failed to write output: {error}")
}

/// One tab-separated summary line per cart.
pub(crate) fn cart_lines(carts: &[CartRecord]) -> Result<(), String> {
    let mut out = io::stdout().lock();

    for cart in carts {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            cart.code,
            cart.user_id,
            cart.site_id,
            cart.modified_at,
            cart.name.as_deref().unwrap_or("-"),
        )
        .map_err(|error| stdout_error(&error))?;
    }

    Ok(())
}

/// The full record as pretty-printed JSON.
pub(crate) fn cart_json(cart: &CartRecord) -> Result<(), String> {
    let json = serde_json::to_string_pretty(cart)
        .map_err(|error| format!("failed to encode cart: {error}"))?;

    writeln!(io::stdout().lock(), "{json}").map_err(|error| stdout_error(&error))
}

pub(crate) fn line(text: &str) -> Result<(), String> {
    writeln!(io::stdout().lock(), "{text}").map_err(|error| stdout_error(&error))
}
