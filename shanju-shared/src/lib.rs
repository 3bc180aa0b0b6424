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

//! # shanju-shared
//!
//! Types shared between the shanju frontend, the client-side core, and the service worker. The
//! backend (a separate service; not in this repository) owns all of the persisted state described
//! by these types-- the crates in this workspace only render them and forward user intent.
//!
//! The general pattern, which I've come to like: a handful of validated newtypes at the bottom
//! (things the *client* must get right before ever going to the network), plain
//! serialize/deserialize entities above them ([entities]), and the request/response contracts on
//! top ([api]). Everything here must build for wasm32 as well as the host, so no heavyweight
//! dependencies.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use snafu::{Backtrace, prelude::*};

use std::{fmt::Display, ops::Deref, str::FromStr};

pub mod api;
pub mod currency;
pub mod entities;

type StdResult<T, E> = std::result::Result<T, E>;

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                       module Error type                                        //
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("{text} is not a valid amount"))]
    Amount { text: String, backtrace: Backtrace },
    #[snafu(display("{text} is not a six-digit OTP code"))]
    Otp { text: String, backtrace: Backtrace },
    #[snafu(display("{text} is not a valid phone number"))]
    Phone { text: String, backtrace: Backtrace },
    #[snafu(display("{text} is not a valid identity reference"))]
    Principal { text: String, backtrace: Backtrace },
}

type Result<T> = std::result::Result<T, Error>;

fn mk_serde_de_err<'de, D: serde::Deserializer<'de>>(err: impl std::error::Error) -> D::Error {
    <D::Error as serde::de::Error>::custom(format!("{:?}", err))
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          Identifiers                                           //
////////////////////////////////////////////////////////////////////////////////////////////////////

// The backend hands out plain numeric identifiers (it owns the counter; we never mint these
// client-side), so simple aliases suffice-- no need for the newtype treatment I gave the
// validated strings below.

/// Server-issued payment identifier
pub type PaymentId = u64;
/// Server-issued transaction identifier
pub type TransactionId = u64;
/// Server-issued platform-connection identifier
pub type ConnectionId = u64;
/// Server-issued handle correlating a funding request's start/verify/resend calls
pub type ReferenceId = u64;

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                           Principal                                            //
////////////////////////////////////////////////////////////////////////////////////////////////////

lazy_static! {
    // Dash-separated groups of base32 characters; we check *shape* only. Whether the principal
    // exists is the backend's business.
    static ref PRINCIPAL_RE: Regex =
        Regex::new("^[a-z0-9]{1,5}(-[a-z0-9]{1,5})+$").unwrap(/* known good */);
}

/// An opaque identity reference, as issued by the identity provider
///
/// The client treats these as almost entirely opaque: the only thing we know (and the only thing
/// we check, before a transfer leaves the form) is the textual shape-- lowercase base32 groups
/// joined by dashes. Everything else about a principal is the backend's concern.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Correct-by-construction [Principal] constructor
    pub fn new(text: &str) -> Result<Principal> {
        PRINCIPAL_RE
            .is_match(text)
            .then_some(Principal(text.to_string()))
            .ok_or(
                PrincipalSnafu {
                    text: text.to_string(),
                }
                .build(),
            )
    }
}

impl AsRef<str> for Principal {
    fn as_ref(&self) -> &str {
        self.deref()
    }
}

impl Deref for Principal {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Principal> for String {
    fn from(value: Principal) -> Self {
        value.0
    }
}

impl FromStr for Principal {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Principal::new(s)
    }
}

impl TryFrom<String> for Principal {
    type Error = Error;

    fn try_from(text: String) -> std::result::Result<Self, Self::Error> {
        if PRINCIPAL_RE.is_match(&text) {
            Ok(Principal(text))
        } else {
            PrincipalSnafu { text }.fail()
        }
    }
}

// Implement `Deserialize` by hand to fail if the serialized value isn't a legit `Principal`
impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D>(deserializer: D) -> StdResult<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Principal::try_from(s).map_err(mk_serde_de_err::<'de, D>)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          PhoneNumber                                           //
////////////////////////////////////////////////////////////////////////////////////////////////////

lazy_static! {
    // E.164-ish: optional leading '+', seven to fifteen digits. The backend maintains the
    // phone-to-principal mapping; a "duplicate phone mapping" is its error to report, not ours to
    // predict.
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9]{7,15}$").unwrap(/* known good */);
}

/// A phone number suitable for addressing a transfer or payment
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Correct-by-construction [PhoneNumber] constructor
    pub fn new(text: &str) -> Result<PhoneNumber> {
        PHONE_RE
            .is_match(text)
            .then_some(PhoneNumber(text.to_string()))
            .ok_or(
                PhoneSnafu {
                    text: text.to_string(),
                }
                .build(),
            )
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl FromStr for PhoneNumber {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        PhoneNumber::new(s)
    }
}

impl<'de> Deserialize<'de> for PhoneNumber {
    fn deserialize<D>(deserializer: D) -> StdResult<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        PhoneNumber::new(&s).map_err(mk_serde_de_err::<'de, D>)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                              Otp                                               //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A one-time password, as entered by the user: exactly six ASCII digits
///
/// This type is a pure input-shape guard. The *authoritative* OTP check happens on the backend;
/// constructing an [Otp] proves only that we have something worth sending. Note that leading
/// zeros are perfectly legal OTPs ("012345"), which is why this wraps the string the user typed
/// rather than a number-- the conversion to the backend's numeric wire type happens at the last
/// possible moment, in [Otp::as_u64].
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Otp(String);

impl Otp {
    /// Correct-by-construction [Otp] constructor
    pub fn new(text: &str) -> Result<Otp> {
        (text.len() == 6 && text.bytes().all(|b| b.is_ascii_digit()))
            .then_some(Otp(text.to_string()))
            .ok_or(
                OtpSnafu {
                    text: text.to_string(),
                }
                .build(),
            )
    }
    /// The backend takes OTPs as integers on the wire
    pub fn as_u64(&self) -> u64 {
        self.0.parse().unwrap(/* six ASCII digits, by construction */)
    }
}

impl AsRef<str> for Otp {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Otp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Otp {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Otp::new(s)
    }
}

impl<'de> Deserialize<'de> for Otp {
    fn deserialize<D>(deserializer: D) -> StdResult<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Otp::new(&s).map_err(mk_serde_de_err::<'de, D>)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn principal() {
        assert!(Principal::new("").is_err());
        assert!(Principal::new("w7x7r-cok77-xa").is_ok());
        assert!(Principal::new("rrkah-fqaaa-aaaaa-aaaaq-cai").is_ok());
        assert!(Principal::new("UPPER-CASE").is_err());
        assert!(Principal::new("nodashes").is_err());
        assert!(Principal::new("spa ce-oops").is_err());
    }

    #[test]
    fn phone() {
        assert!(PhoneNumber::new("+8801712345678").is_ok());
        assert!(PhoneNumber::new("01712345678").is_ok());
        assert!(PhoneNumber::new("123").is_err());
        assert!(PhoneNumber::new("not-a-phone").is_err());
        assert!(PhoneNumber::new("+880 171 234").is_err());
    }

    #[test]
    fn otp() {
        assert!(Otp::new("123456").is_ok());
        assert!(Otp::new("012345").is_ok()); // leading zeros are legal
        assert_eq!(Otp::new("012345").unwrap().as_u64(), 12345);
        assert!(Otp::new("12345").is_err());
        assert!(Otp::new("1234567").is_err());
        assert!(Otp::new("12345a").is_err());
        assert!(Otp::new("").is_err());
    }
}
