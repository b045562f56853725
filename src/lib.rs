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

//! A schema front-end for the Cedar authorization language: a tokenizer and
//! recursive-descent parser for the human-readable Cedar schema syntax, a
//! bidirectional JSON codec, a deterministic Cedar-text emitter, and a
//! resolver that qualifies names, inlines common types, and computes
//! entity-membership closures.
//!
//! [`Schema`] is the entry point: parse with [`Schema::from_cedar_str`] or
//! [`Schema::from_json_str`], emit with [`Schema::to_cedar_string`] or
//! [`Schema::to_json_string`], and call [`Schema::resolve`] to get a
//! [`ResolvedSchema`](validator::ResolvedSchema) with fully qualified names.

pub mod ast;
pub mod builder;
pub mod error;
pub mod json_schema;
pub mod parser;
pub mod schema;
pub mod scanner;
pub mod validator;

pub use builder::SchemaBuilder;
pub use error::SchemaError;
pub use schema::Schema;
