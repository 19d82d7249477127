//! Method tree discovery.
//!
//! Yeti services describe themselves through a `_list` method. Listing the
//! root returns `[[name, description], ...]`; listing a child takes the path
//! below the first segment as params:
//!
//! ```text
//! path []          -> yeti._list()
//! path [a]         -> yeti.a("_list")
//! path [a, b]      -> yeti.a("b", "_list")
//! ```
//!
//! Any other result shape marks a leaf. Every listing opens its own
//! session, so a walk never reuses a connection.

use crate::config::{ClientConfig, SessionConfig};
use crate::error::Result;
use crate::session::RpcSession;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// A node in the discovered method tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodNode {
    pub name: String,
    pub description: String,
    pub children: Vec<MethodNode>,
}

impl MethodNode {
    /// Render the tree as indented lines, one node per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        out.push_str(&"    ".repeat(depth));
        out.push_str(&self.name);
        if !self.description.is_empty() {
            out.push_str(&format!(" ({})", self.description));
        }
        out.push('\n');
        for child in &self.children {
            child.render_into(out, depth + 1);
        }
    }
}

/// Walks a service's method tree one session per node.
pub struct TreeWalker {
    host: String,
    port: u16,
    config: SessionConfig,
    max_depth: usize,
    next_id: u64,
}

impl TreeWalker {
    pub fn new(host: impl Into<String>, port: u16, config: SessionConfig) -> Self {
        let next_id = config.initial_id;
        Self {
            host: host.into(),
            port,
            config,
            max_depth: ClientConfig::WALK_MAX_DEPTH,
            next_id,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Walk the whole tree starting at the root.
    pub fn walk(&mut self) -> Result<MethodNode> {
        let mut root = MethodNode {
            name: "root".to_string(),
            description: String::new(),
            children: Vec::new(),
        };
        root.children = self.walk_path(&mut Vec::new(), 0)?;
        Ok(root)
    }

    fn walk_path(&mut self, path: &mut Vec<String>, depth: usize) -> Result<Vec<MethodNode>> {
        if depth >= self.max_depth {
            warn!("Not descending below {:?}: max depth {} reached", path, self.max_depth);
            return Ok(Vec::new());
        }

        let listing = self.list(path)?;
        let mut nodes = Vec::with_capacity(listing.len());
        for (name, description) in listing {
            path.push(name.clone());
            let children = self.walk_path(path, depth + 1)?;
            path.pop();
            nodes.push(MethodNode {
                name,
                description,
                children,
            });
        }
        Ok(nodes)
    }

    fn list(&mut self, path: &[String]) -> Result<Vec<(String, String)>> {
        let (method, params) = list_call(path);
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        debug!("Listing {:?} via {}", path, method);
        let session = RpcSession::open(&self.host, self.port, self.config.clone())?;
        let success = session.call_with_id(&method, params, id)?;
        Ok(parse_listing(&success.result))
    }
}

/// Method name and params that list the children of `path`.
pub fn list_call(path: &[String]) -> (String, Vec<Value>) {
    match path.split_first() {
        None => (ClientConfig::LIST_METHOD.to_string(), Vec::new()),
        Some((head, rest)) => {
            let mut params: Vec<Value> = rest.iter().cloned().map(Value::String).collect();
            params.push(Value::String(ClientConfig::LIST_METHOD.to_string()));
            (head.clone(), params)
        }
    }
}

/// Extract `(name, description)` pairs from a listing result.
///
/// Non-array results are leaves. Entries without a string name are skipped.
pub fn parse_listing(result: &Value) -> Vec<(String, String)> {
    let Some(entries) = result.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let pair = entry.as_array()?;
            let Some(name) = pair.first().and_then(Value::as_str) else {
                warn!("Skipping listing entry without a name: {}", entry);
                return None;
            };
            let description = match pair.get(1) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            };
            Some((name.to_string(), description))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_call_for_root_and_children() {
        assert_eq!(list_call(&[]), ("_list".to_string(), vec![]));
        assert_eq!(
            list_call(&["db".to_string()]),
            ("db".to_string(), vec![json!("_list")])
        );
        assert_eq!(
            list_call(&["db".to_string(), "tables".to_string()]),
            ("db".to_string(), vec![json!("tables"), json!("_list")])
        );
    }

    #[test]
    fn test_parse_listing() {
        let result = json!([["db", "database"], ["stats", null], ["odd", 3], [1, "no name"], "junk"]);
        assert_eq!(
            parse_listing(&result),
            vec![
                ("db".to_string(), "database".to_string()),
                ("stats".to_string(), String::new()),
                ("odd".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_non_array_listing_is_leaf() {
        assert!(parse_listing(&json!("value")).is_empty());
        assert!(parse_listing(&json!({"a": 1})).is_empty());
    }

    #[test]
    fn test_render_indents_children() {
        let tree = MethodNode {
            name: "root".to_string(),
            description: String::new(),
            children: vec![MethodNode {
                name: "db".to_string(),
                description: "database".to_string(),
                children: vec![MethodNode {
                    name: "size".to_string(),
                    description: String::new(),
                    children: vec![],
                }],
            }],
        };
        assert_eq!(tree.render(), "root\n    db (database)\n        size\n");
    }
}
