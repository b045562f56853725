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

//! The crate-wide error type, composed from each layer's own error (spec.md
//! §7): scanning, Cedar-text parsing, JSON parsing, and resolution.

use miette::Diagnostic;
use thiserror::Error;

use crate::json_schema::JsonSchemaError;
use crate::parser::MaybeLoc;
use crate::scanner::err::ScanError;
use crate::validator::cedar_schema::{CedarParseError, EmitError};
use crate::validator::ResolveError;

/// Anything that can go wrong loading, parsing, or resolving a schema.
#[derive(Debug, Error, Diagnostic)]
pub enum SchemaError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    CedarParse(#[from] CedarParseError),
    #[error(transparent)]
    Json(#[from] JsonSchemaError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Emit(#[from] EmitError),
    #[error("failed to read `{path}`")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SchemaError {
    /// The source location, when the underlying error carries one.
    pub fn loc(&self) -> MaybeLoc {
        match self {
            Self::Scan(e) => e.loc(),
            Self::CedarParse(e) => e.loc(),
            Self::Json(_) | Self::Resolve(_) | Self::Emit(_) | Self::Io { .. } => None,
        }
    }
}
