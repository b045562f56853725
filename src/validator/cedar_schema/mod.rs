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

//! The human-readable Cedar schema syntax: [`ast`] (the shared in-memory
//! model), [`parser`] (text -> AST), and [`fmt`] (AST -> text).

pub mod ast;
pub mod err;
pub mod fmt;
pub mod parser;

pub use err::CedarParseError;
pub use fmt::{emit_cedar, EmitError};
pub use parser::parse_schema;
