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

//! [`Schema`]: the crate's single externally-visible entry point, wrapping a
//! parsed [`cedar_schema::ast::Schema`] with the filename it came from
//! (spec.md §4.6 — parse from either syntax, emit either syntax, resolve).

use std::path::Path as FsPath;
use std::sync::Arc;

use crate::error::SchemaError;
use crate::json_schema;
use crate::validator::cedar_schema::{self, emit_cedar};
use crate::validator::{resolve, ResolvedSchema};

/// A parsed schema, independent of which syntax it was read from.
#[derive(Debug, Clone)]
pub struct Schema {
    ast: cedar_schema::ast::Schema,
    filename: Option<Arc<str>>,
}

impl Schema {
    /// Parses Cedar human-readable schema syntax.
    pub fn from_cedar_str(src: &str, filename: Option<&str>) -> Result<Self, SchemaError> {
        let filename: Option<Arc<str>> = filename.map(Arc::from);
        let ast = cedar_schema::parse_schema(src.as_bytes(), filename.clone())?;
        Ok(Self { ast, filename })
    }

    /// Parses a JSON schema document.
    pub fn from_json_str(src: &str) -> Result<Self, SchemaError> {
        let ast = json_schema::parse_schema(src.as_bytes())?;
        Ok(Self { ast, filename: None })
    }

    /// Parses a JSON schema document from already-deserialized bytes.
    pub fn from_json_slice(src: &[u8]) -> Result<Self, SchemaError> {
        let ast = json_schema::parse_schema(src)?;
        Ok(Self { ast, filename: None })
    }

    /// Reads a file from disk and parses it as Cedar schema syntax.
    pub fn from_cedar_file(path: impl AsRef<FsPath>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_cedar_str(&src, path.to_str())
    }

    /// Reads a file from disk and parses it as a JSON schema document.
    pub fn from_json_file(path: impl AsRef<FsPath>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_slice(&bytes)
    }

    /// The filename this schema was parsed from, if any (only Cedar-text
    /// parsing tracks one; JSON schemas carry no source locations).
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Renders this schema back to Cedar human-readable syntax. Fails if the
    /// schema holds a state Cedar text has no syntax for (e.g. an action with
    /// an empty principal/resource type list, which only the JSON codec can
    /// produce).
    pub fn to_cedar_string(&self) -> Result<String, SchemaError> {
        Ok(emit_cedar(&self.ast)?)
    }

    /// Renders this schema as pretty-printed JSON text.
    pub fn to_json_string(&self) -> Result<String, SchemaError> {
        Ok(json_schema::emit_schema(&self.ast)?)
    }

    /// Qualifies names, inlines common types, and computes entity-membership
    /// closures (spec.md §4.5).
    pub fn resolve(&self) -> Result<ResolvedSchema, SchemaError> {
        Ok(resolve(&self.ast)?)
    }

    /// The underlying shared AST, for callers that need direct access.
    pub fn ast(&self) -> &cedar_schema::ast::Schema {
        &self.ast
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_minimal_schema() {
        let src = "entity User;\nentity Photo;\naction view appliesTo { principal: [User], resource: [Photo] };\n";
        let schema = Schema::from_cedar_str(src, Some("test.cedarschema")).unwrap();
        assert_eq!(schema.filename(), Some("test.cedarschema"));
        let emitted = schema.to_cedar_string().unwrap();
        let reparsed = Schema::from_cedar_str(&emitted, None).unwrap();
        assert_eq!(reparsed.to_cedar_string().unwrap(), emitted);
    }

    #[test]
    fn cedar_and_json_resolve_to_the_same_schema() {
        let cedar_src = "entity User in [Group]; entity Group; entity Photo;\n";
        let json_src = r#"{
            "": {
                "entityTypes": {
                    "User": { "memberOfTypes": ["Group"] },
                    "Group": {},
                    "Photo": {}
                },
                "actions": {}
            }
        }"#;
        let from_cedar = Schema::from_cedar_str(cedar_src, None).unwrap().resolve().unwrap();
        let from_json = Schema::from_json_str(json_src).unwrap().resolve().unwrap();
        assert_eq!(from_cedar, from_json);
    }

    #[test]
    fn json_round_trip_via_ast() {
        let src = r#"{"NS": {"entityTypes": {"User": {}}, "actions": {}}}"#;
        let schema = Schema::from_json_str(src).unwrap();
        let emitted = schema.to_json_string().unwrap();
        let reparsed = Schema::from_json_str(&emitted).unwrap();
        assert_eq!(reparsed.resolve().unwrap(), schema.resolve().unwrap());
    }

    #[test]
    fn empty_principal_type_list_fails_to_render_as_cedar_text() {
        let src = r#"{"": {"entityTypes": {"User": {}}, "actions": {
            "view": {"appliesTo": {"principalTypes": [], "resourceTypes": ["User"]}}
        }}}"#;
        let schema = Schema::from_json_str(src).unwrap();
        assert!(schema.to_cedar_string().is_err());
    }
}
