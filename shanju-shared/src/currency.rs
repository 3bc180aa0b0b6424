// Copyright (C) 2025 Michael Herstine <sp1ff@pobox.com>
//
// This file is part of shanju.
//
// shanju is free software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// shanju is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
// even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with shanju.  If not,
// see <http://www.gnu.org/licenses/>.

//! # smallest-unit currency handling
//!
//! Wallet amounts travel as integers in the smallest unit of their currency: cents for fiat (two
//! decimal places), satoshis/wei-equivalents for crypto (eight). This module is the one place
//! that knows which is which. Note this is *unit* conversion within a currency, not conversion
//! between currencies-- the latter is explicitly not this application's business.

use crate::{AmountSnafu, Error, entities::Currency};

type Result<T> = std::result::Result<T, Error>;

/// Decimal places in the smallest unit of `currency`
///
/// Unknown ("other") currencies default to fiat-style two places.
pub fn decimals(currency: &Currency) -> u32 {
    match currency {
        Currency::Usd | Currency::Bdt | Currency::Other(_) => 2,
        Currency::Btc | Currency::Eth | Currency::Usdt(_) => 8,
    }
}

/// The user-facing currency code, e.g. "USD" or "USDT-ETH"
pub fn code(currency: &Currency) -> String {
    match currency {
        Currency::Usd => "USD".to_string(),
        Currency::Bdt => "BDT".to_string(),
        Currency::Btc => "BTC".to_string(),
        Currency::Eth => "ETH".to_string(),
        Currency::Usdt(network) => format!("USDT-{}", format!("{network:?}").to_uppercase()),
        Currency::Other(code) => code.to_uppercase(),
    }
}

/// The user-facing currency label, e.g. "US Dollar"
pub fn label(currency: &Currency) -> String {
    match currency {
        Currency::Usd => "US Dollar".to_string(),
        Currency::Bdt => "Bangladeshi Taka".to_string(),
        Currency::Btc => "Bitcoin".to_string(),
        Currency::Eth => "Ethereum".to_string(),
        Currency::Usdt(network) => format!("USDT ({})", format!("{network:?}").to_uppercase()),
        Currency::Other(code) => code.clone(),
    }
}

/// Map a user-entered code back to a [Currency]
///
/// USDT without an explicit network defaults to the ETH network.
pub fn from_code(code: &str) -> Currency {
    let upper = code.to_uppercase();
    match upper.as_str() {
        "USD" => Currency::Usd,
        "BDT" => Currency::Bdt,
        "BTC" => Currency::Btc,
        "ETH" => Currency::Eth,
        _ if upper.starts_with("USDT") => Currency::Usdt(crate::entities::UsdtNetwork::Eth),
        _ => Currency::Other(code.to_string()),
    }
}

/// Parse a user-entered decimal amount ("12.34") into the smallest unit of `currency`
///
/// Rejects empty input, non-numeric input, negative & zero amounts, and more fractional digits
/// than the currency carries-- all before any remote call gets made.
pub fn parse_amount(text: &str, currency: &Currency) -> Result<u64> {
    let text = text.trim();
    let err = || AmountSnafu { text }.build();
    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    let places = decimals(currency) as usize;
    if whole.is_empty() && frac.is_empty()
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !frac.bytes().all(|b| b.is_ascii_digit())
        || frac.len() > places
    {
        return Err(err());
    }
    let scale = 10u64.pow(places as u32);
    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| err())?
    };
    // Right-pad the fractional part out to `places` digits: "5" in a 2-place currency is 50
    let frac: u64 = if frac.is_empty() {
        0
    } else {
        frac.parse::<u64>().map_err(|_| err())? * 10u64.pow((places - frac.len()) as u32)
    };
    let amount = whole.checked_mul(scale).and_then(|w| w.checked_add(frac)).ok_or_else(err)?;
    if amount == 0 {
        return Err(err());
    }
    Ok(amount)
}

/// Render a smallest-unit amount for display, e.g. `USD 12.34` or `0.00100000 BTC`
///
/// Fiat reads code-first, crypto amount-first, matching common convention.
pub fn format_amount(amount: u64, currency: &Currency) -> String {
    let places = decimals(currency) as usize;
    let scale = 10u64.pow(places as u32);
    let (whole, frac) = (amount / scale, amount % scale);
    match places {
        2 => format!("{} {whole}.{frac:02}", code(currency)),
        _ => format!("{whole}.{frac:08} {}", code(currency)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::UsdtNetwork;

    #[test]
    fn units() {
        assert_eq!(decimals(&Currency::Usd), 2);
        assert_eq!(decimals(&Currency::Bdt), 2);
        assert_eq!(decimals(&Currency::Btc), 8);
        assert_eq!(decimals(&Currency::Usdt(UsdtNetwork::Bnb)), 8);
        assert_eq!(decimals(&Currency::Other("XYZ".to_string())), 2);
    }

    #[test]
    fn parsing() {
        assert_eq!(parse_amount("5", &Currency::Usd).unwrap(), 500);
        assert_eq!(parse_amount("5.00", &Currency::Usd).unwrap(), 500);
        assert_eq!(parse_amount("5.5", &Currency::Usd).unwrap(), 550);
        assert_eq!(parse_amount("0.01", &Currency::Usd).unwrap(), 1);
        assert_eq!(parse_amount(".5", &Currency::Usd).unwrap(), 50);
        assert_eq!(parse_amount("0.00000001", &Currency::Btc).unwrap(), 1);
        assert_eq!(parse_amount("1", &Currency::Btc).unwrap(), 100_000_000);
        // Three places in a two-place currency
        assert!(parse_amount("5.001", &Currency::Usd).is_err());
        assert!(parse_amount("", &Currency::Usd).is_err());
        assert!(parse_amount(".", &Currency::Usd).is_err());
        assert!(parse_amount("0", &Currency::Usd).is_err());
        assert!(parse_amount("0.00", &Currency::Usd).is_err());
        assert!(parse_amount("-5", &Currency::Usd).is_err());
        assert!(parse_amount("12,34", &Currency::Usd).is_err());
        assert!(parse_amount("abc", &Currency::Usd).is_err());
    }

    #[test]
    fn formatting() {
        assert_eq!(format_amount(500, &Currency::Usd), "USD 5.00");
        assert_eq!(format_amount(1, &Currency::Usd), "USD 0.01");
        assert_eq!(format_amount(100_000_000, &Currency::Btc), "1.00000000 BTC");
        assert_eq!(format_amount(1, &Currency::Btc), "0.00000001 BTC");
        assert_eq!(
            format_amount(250, &Currency::Other("xyz".to_string())),
            "XYZ 2.50"
        );
    }

    #[test]
    fn codes() {
        assert_eq!(code(&Currency::Usdt(UsdtNetwork::Eth)), "USDT-ETH");
        assert_eq!(from_code("usd"), Currency::Usd);
        assert_eq!(from_code("USDT"), Currency::Usdt(UsdtNetwork::Eth));
        assert_eq!(from_code("xyz"), Currency::Other("xyz".to_string()));
    }
}
