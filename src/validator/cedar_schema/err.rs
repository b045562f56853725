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

//! Errors raised by the Cedar-syntax parser: syntax violations and
//! duplicate-key violations (spec.md §4.2, §7).

use crate::ast::AnyId;
use crate::parser::MaybeLoc;
use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Clone, Error, Diagnostic)]
pub enum SyntaxError {
    #[error("unexpected token `{found}`, expected {expected}")]
    UnexpectedToken {
        found: SmolStr,
        expected: String,
        loc: MaybeLoc,
    },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String, loc: MaybeLoc },
    #[error("`in` is a reserved identifier and cannot be used here")]
    ReservedIdentifier { loc: MaybeLoc },
    #[error("comma-headed `entity` declarations cannot use `enum`")]
    EnumCannotBeCommaHeaded { loc: MaybeLoc },
    #[error("entity type names cannot be paths; write a single identifier")]
    EntityNameIsPath { loc: MaybeLoc },
    #[error("leading comma is not allowed here")]
    LeadingComma { loc: MaybeLoc },
    #[error("doubled comma is not allowed here")]
    DoubledComma { loc: MaybeLoc },
    #[error("trailing comma must be followed by another name")]
    TrailingComma { loc: MaybeLoc },
    #[error("unmatched `{0}`")]
    UnmatchedBrace(char, MaybeLoc),
    #[error("empty statement `;` is not allowed here")]
    EmptyStatement { loc: MaybeLoc },
    #[error("`{field}` may only be specified once in `appliesTo`")]
    DuplicateAppliesToField { field: &'static str, loc: MaybeLoc },
}

impl SyntaxError {
    pub fn loc(&self) -> MaybeLoc {
        match self {
            Self::UnexpectedToken { loc, .. }
            | Self::UnexpectedEof { loc, .. }
            | Self::ReservedIdentifier { loc }
            | Self::EnumCannotBeCommaHeaded { loc }
            | Self::EntityNameIsPath { loc }
            | Self::LeadingComma { loc }
            | Self::DoubledComma { loc }
            | Self::TrailingComma { loc }
            | Self::UnmatchedBrace(_, loc)
            | Self::EmptyStatement { loc }
            | Self::DuplicateAppliesToField { loc, .. } => loc.clone(),
        }
    }
}

#[derive(Debug, Clone, Error, Diagnostic)]
pub enum DuplicateKeyError {
    #[error("duplicate annotation `@{key}`")]
    Annotation { key: AnyId, loc: MaybeLoc },
    #[error("duplicate entity type `{name}`")]
    EntityType { name: SmolStr, loc: MaybeLoc },
    #[error("duplicate action `{name}`")]
    Action { name: SmolStr, loc: MaybeLoc },
    #[error("duplicate common type `{name}`")]
    CommonType { name: SmolStr, loc: MaybeLoc },
    #[error("duplicate namespace `{name}`")]
    Namespace { name: SmolStr, loc: MaybeLoc },
    #[error("duplicate attribute `{name}`")]
    Attribute { name: SmolStr, loc: MaybeLoc },
    #[error("entity type and enum type `{name}` collide in the same namespace")]
    EntityEnumCollision { name: SmolStr, loc: MaybeLoc },
}

impl DuplicateKeyError {
    pub fn loc(&self) -> MaybeLoc {
        match self {
            Self::Annotation { loc, .. }
            | Self::EntityType { loc, .. }
            | Self::Action { loc, .. }
            | Self::CommonType { loc, .. }
            | Self::Namespace { loc, .. }
            | Self::Attribute { loc, .. }
            | Self::EntityEnumCollision { loc, .. } => loc.clone(),
        }
    }
}

impl From<crate::ast::DuplicateAnnotationError> for DuplicateKeyError {
    fn from(e: crate::ast::DuplicateAnnotationError) -> Self {
        Self::Annotation {
            key: e.key,
            loc: e.second,
        }
    }
}

/// The parser's single error type: either a syntax violation or a
/// duplicate-key violation (spec.md §7 keeps these as distinct *kinds* but
/// both abort the same parse).
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum CedarParseError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Duplicate(#[from] DuplicateKeyError),
    #[error(transparent)]
    Scan(#[from] crate::scanner::err::ScanError),
}

impl CedarParseError {
    pub fn loc(&self) -> MaybeLoc {
        match self {
            Self::Syntax(e) => e.loc(),
            Self::Duplicate(e) => e.loc(),
            Self::Scan(e) => e.loc(),
        }
    }
}

impl From<crate::ast::DuplicateAnnotationError> for CedarParseError {
    fn from(e: crate::ast::DuplicateAnnotationError) -> Self {
        Self::Duplicate(e.into())
    }
}
