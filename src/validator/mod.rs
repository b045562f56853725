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

//! Schema validation: the human-readable syntax ([`cedar_schema`]) and the
//! reference-qualification / inlining / closure pass that turns either
//! syntax's AST into a [`ResolvedSchema`](resolve::ResolvedSchema).

pub mod cedar_schema;
pub mod resolve;

pub use resolve::{resolve, ResolveError, ResolvedAction, ResolvedEntityType, ResolvedSchema};
