/*
 * Copyright Cedar Contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use smol_str::SmolStr;
use std::str::FromStr;

/// An identifier that may not be the reserved word `in` (spec.md §4.2:
/// "Only `in` is a reserved identifier that may not be used as an entity,
/// namespace, type, action, attribute, or enum-variant identifier").
///
/// Used for entity/namespace/action/common-type names and for bare (unquoted)
/// record attribute names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(SmolStr);

/// An identifier with no reserved words at all — contextual keywords like
/// `entity` or `tags` are accepted. Used for annotation keys, which spec.md
/// never lists among the positions `in` is forbidden from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnyId(SmolStr);

#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentParseError {
    #[error("invalid identifier `{0}`")]
    InvalidFormat(SmolStr),
    #[error("`in` is a reserved identifier and cannot be used here")]
    ReservedWord,
}

fn is_valid_ident_text(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && s.is_ascii()
}

impl AnyId {
    pub fn new_unchecked(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }
}

impl FromStr for AnyId {
    type Err = IdentParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_valid_ident_text(s) {
            Ok(Self(s.into()))
        } else {
            Err(IdentParseError::InvalidFormat(s.into()))
        }
    }
}

impl FromStr for Id {
    type Err = IdentParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "in" {
            return Err(IdentParseError::ReservedWord);
        }
        if is_valid_ident_text(s) {
            Ok(Self(s.into()))
        } else {
            Err(IdentParseError::InvalidFormat(s.into()))
        }
    }
}

impl TryFrom<AnyId> for Id {
    type Error = IdentParseError;
    fn try_from(value: AnyId) -> Result<Self, Self::Error> {
        value.0.parse()
    }
}

impl From<Id> for AnyId {
    fn from(value: Id) -> Self {
        Self(value.0)
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
impl AsRef<str> for AnyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for AnyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl smol_str::ToSmolStr for Id {
    fn to_smolstr(&self) -> SmolStr {
        self.0.clone()
    }
}
impl smol_str::ToSmolStr for AnyId {
    fn to_smolstr(&self) -> SmolStr {
        self.0.clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_in() {
        assert!(matches!("in".parse::<Id>(), Err(IdentParseError::ReservedWord)));
        assert!("in".parse::<AnyId>().is_ok());
    }

    #[test]
    fn rejects_non_ascii() {
        assert!("用户".parse::<Id>().is_err());
        assert!("用户".parse::<AnyId>().is_err());
    }

    #[test]
    fn rejects_leading_digit() {
        assert!("1abc".parse::<Id>().is_err());
    }

    #[test]
    fn accepts_underscore_leading() {
        assert!("_foo123".parse::<Id>().is_ok());
    }
}
