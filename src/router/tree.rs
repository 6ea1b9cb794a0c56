//! Prefix tree for route storage and lookup.
//!
//! Each node represents one path segment. Literal children match exactly;
//! a node additionally carries at most one dynamic child, either a named
//! parameter (`:name`, matches any single segment) or a trailing catch-all
//! (`*name`, matches the remaining path). Lookup prefers the longest static
//! prefix: literal children are tried before the dynamic child, with
//! backtracking, so a catch-all only fires when no deeper literal or
//! parameter branch fully consumes the remaining path.

use smallvec::SmallVec;
use std::sync::Arc;

use crate::error::ConfigError;

/// Maximum number of captured parameter values before heap allocation.
/// Most routes bind ≤4 parameters.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Parameter values captured along a matched path, in capture order.
pub type ValueVec = SmallVec<[String; MAX_INLINE_PARAMS]>;

/// One parsed pattern segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'p> {
    Literal(&'p str),
    Param(&'p str),
    CatchAll(&'p str),
}

/// Split a pattern into validated segments.
///
/// Empty segments are insignificant, so `/users/` and `/users` parse
/// identically. A `*name` segment must be last; `:` and `*` require a
/// non-empty name.
pub(crate) fn parse_pattern(pattern: &str) -> Result<Vec<Segment<'_>>, ConfigError> {
    let raw: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let mut segments = Vec::with_capacity(raw.len());
    for (i, seg) in raw.iter().enumerate() {
        if let Some(name) = seg.strip_prefix(':') {
            if name.is_empty() {
                return Err(ConfigError::EmptyParamName {
                    pattern: pattern.to_string(),
                });
            }
            segments.push(Segment::Param(name));
        } else if let Some(name) = seg.strip_prefix('*') {
            if name.is_empty() {
                return Err(ConfigError::EmptyParamName {
                    pattern: pattern.to_string(),
                });
            }
            if i != raw.len() - 1 {
                return Err(ConfigError::MisplacedCatchAll {
                    name: name.to_string(),
                });
            }
            segments.push(Segment::CatchAll(name));
        } else {
            segments.push(Segment::Literal(seg));
        }
    }
    Ok(segments)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DynKind {
    Param,
    CatchAll,
}

struct DynChild<T> {
    kind: DynKind,
    name: Arc<str>,
    node: Node<T>,
}

impl<T> DynChild<T> {
    fn describe(&self) -> String {
        match self.kind {
            DynKind::Param => format!(":{}", self.name),
            DynKind::CatchAll => format!("*{}", self.name),
        }
    }
}

struct Node<T> {
    segment: Box<str>,
    children: Vec<Node<T>>,
    dynamic: Option<Box<DynChild<T>>>,
    leaf: Option<T>,
}

impl<T> Node<T> {
    fn new(segment: &str) -> Self {
        Node {
            segment: segment.into(),
            children: Vec::new(),
            dynamic: None,
            leaf: None,
        }
    }

    fn insert(&mut self, segments: &[Segment<'_>], payload: T) -> Result<Option<T>, ConfigError> {
        let Some((first, remaining)) = segments.split_first() else {
            return Ok(self.leaf.replace(payload));
        };
        match *first {
            Segment::Literal(seg) => {
                if let Some(child) = self.children.iter_mut().find(|c| &*c.segment == seg) {
                    return child.insert(remaining, payload);
                }
                // build the subtree before linking it, so a failed
                // registration leaves the tree untouched
                let mut child = Node::new(seg);
                let replaced = child.insert(remaining, payload)?;
                self.children.push(child);
                Ok(replaced)
            }
            Segment::Param(name) => self.insert_dynamic(DynKind::Param, name, remaining, payload),
            Segment::CatchAll(name) => {
                self.insert_dynamic(DynKind::CatchAll, name, remaining, payload)
            }
        }
    }

    fn insert_dynamic(
        &mut self,
        kind: DynKind,
        name: &str,
        remaining: &[Segment<'_>],
        payload: T,
    ) -> Result<Option<T>, ConfigError> {
        if let Some(dynamic) = self.dynamic.as_mut() {
            // at most one dynamic branch per node
            if dynamic.kind != kind || &*dynamic.name != name {
                return Err(ConfigError::ConflictingDynamic {
                    existing: dynamic.describe(),
                    new: match kind {
                        DynKind::Param => format!(":{name}"),
                        DynKind::CatchAll => format!("*{name}"),
                    },
                });
            }
            return dynamic.node.insert(remaining, payload);
        }
        let mut child = DynChild {
            kind,
            name: Arc::from(name),
            node: Node::new(""),
        };
        let replaced = child.node.insert(remaining, payload)?;
        self.dynamic = Some(Box::new(child));
        Ok(replaced)
    }

    fn search<'n>(&'n self, segments: &[&str], values: &mut ValueVec) -> Option<&'n T> {
        let Some((first, remaining)) = segments.split_first() else {
            return self.leaf.as_ref();
        };

        for child in &self.children {
            if &*child.segment == *first {
                if let Some(found) = child.search(remaining, values) {
                    return Some(found);
                }
            }
        }

        let dynamic = self.dynamic.as_ref()?;
        match dynamic.kind {
            DynKind::Param => {
                values.push((*first).to_string());
                if let Some(found) = dynamic.node.search(remaining, values) {
                    return Some(found);
                }
                // backtrack the captured value if the branch fails
                values.pop();
                None
            }
            DynKind::CatchAll => {
                // binds the non-empty remainder, separators included
                values.push(segments.join("/"));
                match dynamic.node.leaf.as_ref() {
                    Some(found) => Some(found),
                    None => {
                        values.pop();
                        None
                    }
                }
            }
        }
    }
}

/// Tree of registered payloads keyed by segmented paths.
pub(crate) struct PathTree<T> {
    root: Node<T>,
}

impl<T> PathTree<T> {
    pub fn new() -> Self {
        PathTree {
            root: Node::new(""),
        }
    }

    /// Insert a payload at the parsed pattern. Returns the previous payload
    /// when the exact pattern was already registered.
    pub fn insert(&mut self, segments: &[Segment<'_>], payload: T) -> Result<Option<T>, ConfigError> {
        self.root.insert(segments, payload)
    }

    pub fn find(&self, path: &str) -> Option<(&T, ValueVec)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut values = ValueVec::new();
        let found = self.root.search(&segments, &mut values)?;
        Some((found, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(patterns: &[(&str, u32)]) -> PathTree<u32> {
        let mut tree = PathTree::new();
        for (pattern, payload) in patterns {
            let segments = parse_pattern(pattern).unwrap();
            tree.insert(&segments, *payload).unwrap();
        }
        tree
    }

    #[test]
    fn test_literal_lookup() {
        let tree = tree_with(&[("/health", 1), ("/health/live", 2)]);
        assert_eq!(tree.find("/health").map(|(p, _)| *p), Some(1));
        assert_eq!(tree.find("/health/live").map(|(p, _)| *p), Some(2));
        assert!(tree.find("/health/ready").is_none());
    }

    #[test]
    fn test_param_capture_order() {
        let tree = tree_with(&[("/users/:uid/posts/:pid", 7)]);
        let (payload, values) = tree.find("/users/1/posts/2").unwrap();
        assert_eq!(*payload, 7);
        assert_eq!(values.as_slice(), ["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_literal_wins_over_param() {
        let tree = tree_with(&[("/users/me", 1), ("/users/:id", 2)]);
        let (payload, values) = tree.find("/users/me").unwrap();
        assert_eq!(*payload, 1);
        assert!(values.is_empty());
        assert_eq!(tree.find("/users/42").map(|(p, _)| *p), Some(2));
    }

    #[test]
    fn test_backtrack_into_param_branch() {
        // /users/me exists but has no children, so /users/me/posts must
        // fall back through the parameter branch
        let tree = tree_with(&[("/users/me", 1), ("/users/:id/posts", 2)]);
        let (payload, values) = tree.find("/users/me/posts").unwrap();
        assert_eq!(*payload, 2);
        assert_eq!(values.as_slice(), ["me".to_string()]);
    }

    #[test]
    fn test_catch_all_remainder() {
        let tree = tree_with(&[("/files/*path", 9)]);
        let (payload, values) = tree.find("/files/a/b/c").unwrap();
        assert_eq!(*payload, 9);
        assert_eq!(values.as_slice(), ["a/b/c".to_string()]);
        // a catch-all binds at least one segment
        assert!(tree.find("/files").is_none());
        assert!(tree.find("/files/").is_none());
    }

    #[test]
    fn test_catch_all_yields_to_deeper_literal() {
        let tree = tree_with(&[("/files/readme", 1), ("/files/*path", 2)]);
        assert_eq!(tree.find("/files/readme").map(|(p, _)| *p), Some(1));
        let (payload, values) = tree.find("/files/readme/old").unwrap();
        assert_eq!(*payload, 2);
        assert_eq!(values.as_slice(), ["readme/old".to_string()]);
    }

    #[test]
    fn test_conflicting_dynamic_segment() {
        let mut tree = tree_with(&[("/users/:id", 1)]);
        let segments = parse_pattern("/users/:uid").unwrap();
        let err = tree.insert(&segments, 2).unwrap_err();
        assert_eq!(
            err,
            ConfigError::ConflictingDynamic {
                existing: ":id".to_string(),
                new: ":uid".to_string(),
            }
        );

        let segments = parse_pattern("/users/*rest").unwrap();
        assert!(tree.insert(&segments, 3).is_err());
    }

    #[test]
    fn test_shared_param_name_is_not_a_conflict() {
        let tree = tree_with(&[("/users/:id/posts", 1), ("/users/:id/comments", 2)]);
        assert_eq!(tree.find("/users/7/posts").map(|(p, _)| *p), Some(1));
        assert_eq!(tree.find("/users/7/comments").map(|(p, _)| *p), Some(2));
    }

    #[test]
    fn test_pattern_validation() {
        assert!(matches!(
            parse_pattern("/files/*path/more"),
            Err(ConfigError::MisplacedCatchAll { .. })
        ));
        assert!(matches!(
            parse_pattern("/users/:"),
            Err(ConfigError::EmptyParamName { .. })
        ));
        assert!(matches!(
            parse_pattern("/files/*"),
            Err(ConfigError::EmptyParamName { .. })
        ));
    }

    #[test]
    fn test_replacement_returns_previous_payload() {
        let mut tree = tree_with(&[("/items", 1)]);
        let segments = parse_pattern("/items/").unwrap();
        assert_eq!(tree.insert(&segments, 2).unwrap(), Some(1));
        assert_eq!(tree.find("/items").map(|(p, _)| *p), Some(2));
    }
}
