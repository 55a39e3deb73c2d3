// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validated URL newtypes.
//!
//! The original implementation asserts `Url::isValid()` at nearly every
//! constructor boundary (e.g. `machine_process.cpp`'s
//! `TU_ASSERT(m_machineUrl.isValid())`). Rust's type system lets us make
//! that invariant unrepresentable instead: construction is fallible and
//! returns `Status::invalid_configuration`, never a panic.

use crate::status::Status;
use serde::{Deserialize, Serialize};
use std::fmt;

fn validate(raw: &str) -> Result<(), Status> {
    if raw.is_empty() {
        return Err(Status::invalid_configuration("url must not be empty"));
    }
    if !raw.contains(':') {
        return Err(Status::invalid_configuration(format!("url missing scheme: {raw}")));
    }
    Ok(())
}

macro_rules! url_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn parse(raw: impl Into<String>) -> Result<Self, Status> {
                let raw = raw.into();
                validate(&raw)?;
                Ok(Self(raw))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = Status;
            fn try_from(raw: String) -> Result<Self, Self::Error> {
                Self::parse(raw)
            }
        }
    };
}

url_newtype!(MachineUrl);
url_newtype!(ProtocolUrl);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty() {
        assert!(MachineUrl::parse("").is_err());
    }

    #[test]
    fn rejects_missing_scheme() {
        assert!(ProtocolUrl::parse("not-a-url").is_err());
    }

    #[test]
    fn accepts_scheme() {
        let url = MachineUrl::parse("dev.zuri.machine:foo").unwrap();
        assert_eq!(url.as_str(), "dev.zuri.machine:foo");
    }
}
