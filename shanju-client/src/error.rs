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

//! # client-core error taxonomy
//!
//! Three species of failure reach this layer: the network died under us, the backend answered
//! with an error of its own, or the user typed something malformed (which we catch *before* any
//! remote call). None of them is retried automatically-- recovery is always either "serve from
//! cache" (the offline manager's department) or "let the user re-submit the form".

use snafu::{Backtrace, Snafu};

use shanju_shared::ReferenceId;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// A failure the *backend* reported; `message` is its text, verbatim
    #[snafu(display("{message}"))]
    Backend { message: String, backtrace: Backtrace },
    #[snafu(display("Failed to deserialize the backend's response: {source}"))]
    De {
        source: serde_json::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("{source}"))]
    Input {
        source: shanju_shared::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Network error: {message}"))]
    Net { message: String, backtrace: Backtrace },
    #[snafu(display("There is no funding request in progress"))]
    NoFundingInProgress { backtrace: Backtrace },
    #[snafu(display(
        "Reference id {given} does not match the in-progress funding request ({current})"
    ))]
    ReferenceMismatch {
        given: ReferenceId,
        current: ReferenceId,
        backtrace: Backtrace,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                    user-facing classification                                  //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Derive user-facing copy from a backend error message
///
/// Yes, this is substring matching against the backend's prose, and yes, that couples our copy to
/// its wording-- if the backend ever rephrases "Insufficient funds" we silently fall through to
/// the raw message. The backend exposes no structured error codes, so this is what we can do;
/// I've kept the behavior exactly as observed rather than inventing a contract the server doesn't
/// honor. `action` is spliced into the sign-in & funds messages ("send money", "add money",
/// "cash out", "transfer", ...).
pub fn user_message(raw: &str, action: &str) -> String {
    if raw.contains("Unauthorized") || raw.contains("not authenticated") {
        return format!("You need to be signed in to {action}");
    }
    if raw.contains("Insufficient funds") {
        return format!("Insufficient funds for this {action}");
    }
    if raw.contains("Invalid OTP") {
        return "Invalid OTP code; check the code your bank sent and try again".to_string();
    }
    if raw.contains("expired") {
        return "This funding request has expired; start over to receive a fresh code".to_string();
    }
    raw.to_string()
}

impl Error {
    /// Convenience: [user_message] applied to whatever text this error carries
    pub fn user_message(&self, action: &str) -> String {
        match self {
            Error::Backend { message, .. } => user_message(message, action),
            other => format!("{other}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn classification() {
        assert_eq!(
            user_message("Unauthorized: only the payee may do that", "send money"),
            "You need to be signed in to send money"
        );
        assert_eq!(
            user_message("caller is not authenticated", "add money"),
            "You need to be signed in to add money"
        );
        assert_eq!(
            user_message("Insufficient funds: balance is 100", "transfer"),
            "Insufficient funds for this transfer"
        );
        assert!(user_message("Invalid OTP", "add money").starts_with("Invalid OTP code"));
        assert!(user_message("reference 42 has expired", "add money").contains("expired"));
        // No known phrase: raw text passes through
        assert_eq!(
            user_message("duplicate phone mapping", "send money"),
            "duplicate phone mapping"
        );
    }
}
