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

//! Position tracking and the shared error type threaded through the scanner,
//! the Cedar-syntax parser, and the resolver. See [`loc`] and [`err`].

pub mod err;
mod loc;

pub use err::PositionedError;
pub use loc::{AsLocRef, IntoMaybeLoc, Loc, MaybeLoc, Node, Position};
