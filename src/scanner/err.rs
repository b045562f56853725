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

use crate::parser::{Loc, MaybeLoc};
use miette::Diagnostic;
use thiserror::Error;

/// Errors produced while tokenizing Cedar schema text (spec.md §4.1, §7).
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum ScanError {
    #[error("invalid character `{ch}`")]
    InvalidChar { ch: char, loc: MaybeLoc },
    #[error("invalid UTF-8 in input")]
    InvalidUtf8 { loc: MaybeLoc },
    #[error("embedded NUL byte in input")]
    EmbeddedNul { loc: MaybeLoc },
    #[error("string not terminated")]
    UnterminatedString { loc: MaybeLoc },
    #[error("block comment not terminated")]
    UnterminatedBlockComment { loc: MaybeLoc },
    #[error("invalid escape sequence `\\{ch}`")]
    InvalidEscape { ch: char, loc: MaybeLoc },
    #[error("invalid hex-byte escape")]
    InvalidHexEscape { loc: MaybeLoc },
}

impl ScanError {
    pub fn loc(&self) -> MaybeLoc {
        match self {
            Self::InvalidChar { loc, .. }
            | Self::InvalidUtf8 { loc }
            | Self::EmbeddedNul { loc }
            | Self::UnterminatedString { loc }
            | Self::UnterminatedBlockComment { loc }
            | Self::InvalidEscape { loc, .. }
            | Self::InvalidHexEscape { loc } => loc.clone(),
        }
    }
}

/// Render a [`ScanError`] as a [`crate::parser::PositionedError`].
impl From<ScanError> for crate::parser::PositionedError {
    fn from(e: ScanError) -> Self {
        let loc = e.loc();
        crate::parser::PositionedError::new(e.to_string(), loc)
    }
}

pub(crate) fn loc_at(filename: Option<std::sync::Arc<str>>, pos: crate::parser::Position, off: usize) -> MaybeLoc {
    Some(std::sync::Arc::new(Loc::new(filename, pos, off)))
}
