//! Request payloads and their validated counterparts.
//! A `Deser*` struct is whatever the client sent; the matching validated
//! struct can only be obtained through `TryFrom`, so handlers never touch
//! unchecked input.

use lazy_regex::regex_is_match;
use serde::Deserialize;
use unicode_segmentation::UnicodeSegmentation;

// ###################################
// ->   STRUCTS
// ###################################

/// A subscription request as it comes off the wire. Fields are optional so
/// that a missing field maps to our own validation message instead of a
/// deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeserSubscribeReq {
    pub email: Option<String>,
    pub lead_magnet: Option<String>,
    pub first_name: Option<String>,
}

/// A subscription request with all the fields validated.
#[derive(Debug)]
pub struct ValidSubscribeReq {
    pub email: ValidEmail,
    pub lead_magnet: String,
    pub first_name: String,
}

/// A support-form request as it comes off the wire.
#[derive(Debug, Deserialize)]
pub struct DeserSupportReq {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// A support-form request with all the fields validated.
#[derive(Debug)]
pub struct ValidSupportReq {
    pub name: String,
    pub email: ValidEmail,
    pub subject: String,
    pub message: String,
}

/// Validated email address.
#[derive(Debug, Clone)]
pub struct ValidEmail(String);

// ###################################
// ->   IMPLS
// ###################################

impl TryFrom<DeserSubscribeReq> for ValidSubscribeReq {
    type Error = DataParsingError;

    fn try_from(deser: DeserSubscribeReq) -> Result<Self, Self::Error> {
        let email = deser.email.unwrap_or_default();
        let lead_magnet = deser.lead_magnet.unwrap_or_default();
        if email.is_empty() || lead_magnet.is_empty() {
            return Err(DataParsingError::SubscribeFieldsMissing);
        }

        Ok(ValidSubscribeReq {
            email: ValidEmail::parse(email)?,
            lead_magnet,
            first_name: deser.first_name.unwrap_or_default(),
        })
    }
}

impl TryFrom<DeserSupportReq> for ValidSupportReq {
    type Error = DataParsingError;

    fn try_from(deser: DeserSupportReq) -> Result<Self, Self::Error> {
        let name = deser.name.unwrap_or_default();
        let email = deser.email.unwrap_or_default();
        let subject = deser.subject.unwrap_or_default();
        let message = deser.message.unwrap_or_default();
        if name.trim().is_empty()
            || email.is_empty()
            || subject.trim().is_empty()
            || message.trim().is_empty()
        {
            return Err(DataParsingError::SupportFieldsMissing);
        }

        Ok(ValidSupportReq {
            name,
            email: ValidEmail::parse(email)?,
            subject,
            message,
        })
    }
}

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ValidEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValidEmail {
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();

        if value.graphemes(true).count() > 256 {
            return Err(DataParsingError::EmailTooLong);
        }

        // The same shape rule both capture forms use: something@something.tld,
        // no whitespace, no second '@'.
        if regex_is_match!(r"^[^\s@]+@[^\s@]+\.[^\s@]+$", value) {
            Ok(ValidEmail(value.to_owned()))
        } else {
            Err(DataParsingError::EmailInvalid)
        }
    }
}

// ###################################
// ->   ERROR
// ###################################
/// Validation failures. The `Display` output doubles as the client-facing
/// message, so the wording is deliberate.
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("Email and lead magnet are required")]
    SubscribeFieldsMissing,
    #[error("All fields are required")]
    SupportFieldsMissing,
    #[error("Invalid email address")]
    EmailInvalid,
    #[error("Email address is too long")]
    EmailTooLong,
}
