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

//! Shared error plumbing. Every stage (scanner, parser, JSON codec, resolver)
//! ultimately produces a [`PositionedError`]; [`crate::error::SchemaError`]
//! composes those into the single error type the facade returns.

use super::{AsLocRef, MaybeLoc};
use miette::Diagnostic;
use thiserror::Error;

/// A single error with an optional source position, as required by
/// spec.md §6 ("Error messages carry, at minimum, the offending position").
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("{}{reason}", self.render_pos())]
pub struct PositionedError {
    pub reason: String,
    pub loc: MaybeLoc,
}

impl PositionedError {
    pub fn new(reason: impl Into<String>, loc: MaybeLoc) -> Self {
        Self {
            reason: reason.into(),
            loc,
        }
    }

    fn render_pos(&self) -> String {
        match self.loc.as_loc_ref() {
            Some(loc) => format!("{loc}: "),
            None => String::new(),
        }
    }
}
