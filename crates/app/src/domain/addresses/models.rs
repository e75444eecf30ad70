//! Address Models

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const FIELD_SEPARATOR: char = '\u{1f}';

/// Shipping address as supplied by a customer or read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub name: String,
    pub mobile: String,
    pub street: String,
    pub city: String,
    pub pincode: String,
    pub state: String,
    pub email: Option<String>,
    pub landmark: Option<String>,
}

impl Address {
    /// Canonical form used for content addressing.
    ///
    /// Whitespace runs collapse to a single space, the email is lowercased and the mobile
    /// number keeps only digits and a leading `+`. Blank optional fields become `None`.
    #[must_use]
    pub fn normalize(&self) -> NormalizedAddress {
        NormalizedAddress(Self {
            name: collapse_whitespace(&self.name),
            mobile: normalize_mobile(&self.mobile),
            street: collapse_whitespace(&self.street),
            city: collapse_whitespace(&self.city),
            pincode: collapse_whitespace(&self.pincode),
            state: collapse_whitespace(&self.state),
            email: normalize_optional(self.email.as_deref()).map(|email| email.to_lowercase()),
            landmark: normalize_optional(self.landmark.as_deref()),
        })
    }
}

/// An [`Address`] in canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAddress(Address);

impl NormalizedAddress {
    #[must_use]
    pub fn as_address(&self) -> &Address {
        &self.0
    }

    #[must_use]
    pub fn into_address(self) -> Address {
        self.0
    }

    /// Deterministic content hash over every field.
    #[must_use]
    pub fn hash(&self) -> AddressHash {
        let address = &self.0;

        let fields = [
            address.name.as_str(),
            address.mobile.as_str(),
            address.street.as_str(),
            address.city.as_str(),
            address.pincode.as_str(),
            address.state.as_str(),
            address.email.as_deref().unwrap_or_default(),
            address.landmark.as_deref().unwrap_or_default(),
        ];

        let mut hasher = Sha256::new();

        for (index, field) in fields.iter().enumerate() {
            if index > 0 {
                hasher.update(FIELD_SEPARATOR.to_string().as_bytes());
            }

            hasher.update(field.as_bytes());
        }

        AddressHash(format!("{:x}", hasher.finalize()))
    }
}

/// Hex-encoded SHA-256 of a [`NormalizedAddress`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressHash(String);

impl AddressHash {
    #[must_use]
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AddressHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(collapse_whitespace)
        .filter(|value| !value.is_empty())
}

fn normalize_mobile(value: &str) -> String {
    let trimmed = value.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    if trimmed.starts_with('+') {
        format!("+{digits}")
    } else {
        digits
    }
}
