//! Convert command implementation

use crate::cli::output::{format_conversion, format_json};
use crate::cli::ConvertArgs;
use crate::currency::{convert, Currency};
use serde_json::json;

/// Handle `breakeven convert` command
pub fn handle_convert(args: &ConvertArgs) -> Result<String, Box<dyn std::error::Error>> {
    let to = match args.from {
        Currency::Usd => Currency::Jpy,
        Currency::Jpy => Currency::Usd,
    };
    let result = convert(args.amount, args.from, to, args.rate)?;

    if args.json {
        return Ok(format_json(&json!({
            "amount": args.amount,
            "from": args.from,
            "to": to,
            "exchange_rate": args.rate,
            "result": result,
        }))?);
    }

    Ok(format_conversion(args.amount, args.from, result, to, args.rate))
}
