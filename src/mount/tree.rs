//! Route tree description.
//!
//! A [`RouteNode`] is a plain value: named children that are either subtrees
//! or leaf handlers, an optional index handler served at the node's own
//! path, and html variables consumed by that index. The tree is only turned
//! into an axum [`Router`] once mounting is complete.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use axum::routing::MethodRouter;
use axum::Router;

use crate::mount::paths::{base_of, join, rebase_reference, split};
use crate::mount::MountError;

/// Html variables holding references relative to the node's own path.
pub const RELATIVE_REF_VARS: [&str; 2] = ["staticRoot", "apiRoot"];

pub type HtmlVars = BTreeMap<String, String>;

/// Builds a node's index handler from the node's final html variables.
#[derive(Clone)]
pub struct IndexHandler(Arc<dyn Fn(&HtmlVars) -> MethodRouter + Send + Sync>);

impl IndexHandler {
    pub fn new(build: impl Fn(&HtmlVars) -> MethodRouter + Send + Sync + 'static) -> Self {
        Self(Arc::new(build))
    }

    /// An index that ignores html variables.
    pub fn fixed(route: MethodRouter) -> Self {
        Self::new(move |_| route.clone())
    }

    fn build(&self, vars: &HtmlVars) -> MethodRouter {
        (self.0)(vars)
    }
}

impl fmt::Debug for IndexHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IndexHandler")
    }
}

#[derive(Debug, Clone)]
pub enum RouteEntry {
    Node(RouteNode),
    Leaf(MethodRouter),
}

impl RouteEntry {
    pub fn as_node(&self) -> Option<&RouteNode> {
        match self {
            RouteEntry::Node(node) => Some(node),
            RouteEntry::Leaf(_) => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, RouteEntry::Leaf(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteNode {
    index: Option<IndexHandler>,
    html_vars: HtmlVars,
    children: BTreeMap<String, RouteEntry>,
}

impl RouteNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, index: IndexHandler) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_html_var(mut self, name: &str, value: &str) -> Self {
        self.html_vars.insert(name.to_string(), value.to_string());
        self
    }

    /// Add or replace a child.
    pub fn with_child(mut self, name: &str, entry: RouteEntry) -> Self {
        self.children.insert(name.to_string(), entry);
        self
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    pub fn set_index(&mut self, index: IndexHandler) {
        self.index = Some(index);
    }

    pub fn html_var(&self, name: &str) -> Option<&str> {
        self.html_vars.get(name).map(String::as_str)
    }

    pub fn html_vars(&self) -> &HtmlVars {
        &self.html_vars
    }

    pub fn update_html_vars<K, V>(&mut self, vars: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in vars {
            self.html_vars.insert(k.into(), v.into());
        }
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &RouteEntry)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Attach a new child; an existing child of that name is an error.
    pub fn attach(&mut self, name: &str, entry: RouteEntry) -> Result<(), MountError> {
        if name.is_empty() || name.contains('/') {
            return Err(MountError::InvalidName(name.to_string()));
        }
        if self.children.contains_key(name) {
            return Err(MountError::Occupied(name.to_string()));
        }
        self.children.insert(name.to_string(), entry);
        Ok(())
    }

    pub fn detach(&mut self, name: &str) -> Option<RouteEntry> {
        self.children.remove(name)
    }

    /// Look up an entry by slash-separated path relative to this node.
    pub fn lookup(&self, path: &str) -> Option<&RouteEntry> {
        let segments = split(path);
        let (last, parents) = segments.split_last()?;
        let mut node = self;
        for segment in parents {
            node = node.children.get(*segment)?.as_node()?;
        }
        node.children.get(*last)
    }

    pub fn node(&self, path: &str) -> Option<&RouteNode> {
        if split(path).is_empty() {
            return Some(self);
        }
        self.lookup(path)?.as_node()
    }

    pub fn node_mut(&mut self, path: &str) -> Option<&mut RouteNode> {
        let mut node = self;
        for segment in split(path) {
            node = match node.children.get_mut(segment)? {
                RouteEntry::Node(child) => child,
                RouteEntry::Leaf(_) => return None,
            };
        }
        Some(node)
    }

    /// Visit this node and every descendant node with its path relative to `self`.
    fn visit_mut(&mut self, path: &mut Vec<String>, f: &mut dyn FnMut(&[String], &mut RouteNode)) {
        f(path, self);
        for (name, entry) in self.children.iter_mut() {
            if let RouteEntry::Node(child) = entry {
                path.push(name.clone());
                child.visit_mut(path, f);
                path.pop();
            }
        }
    }

    /// Nested routers for subtrees, method routers for leaves.
    pub fn into_router(self) -> Router {
        let mut router = Router::new();
        if let Some(index) = &self.index {
            router = router.route("/", index.build(&self.html_vars));
        }
        for (name, entry) in self.children {
            match entry {
                RouteEntry::Leaf(route) => {
                    router = router.route(&format!("/{name}"), route);
                }
                RouteEntry::Node(node) => {
                    if node.is_empty() {
                        continue;
                    }
                    router = router.nest(&format!("/{name}"), node.into_router());
                }
            }
        }
        router
    }

    /// True when the node serves nothing at all.
    fn is_empty(&self) -> bool {
        self.index.is_none()
            && self.children.values().all(|entry| match entry {
                RouteEntry::Node(node) => node.is_empty(),
                RouteEntry::Leaf(_) => false,
            })
    }
}

fn segments(path: &str) -> Vec<String> {
    split(path).into_iter().map(str::to_string).collect()
}

/// Attach `subtree`, authored as if mounted at the server root, at `at`.
///
/// Relative html references on every node of the subtree are rewritten so
/// their targets move with it.
pub fn graft(mut root: RouteNode, at: &str, mut subtree: RouteNode) -> Result<RouteNode, MountError> {
    let at_segs = segments(at);
    let Some((name, parent_segs)) = at_segs.split_last() else {
        return Err(MountError::InvalidName(at.to_string()));
    };

    subtree.visit_mut(&mut Vec::new(), &mut |rel: &[String], node: &mut RouteNode| {
        let new_path: Vec<String> = at_segs.iter().chain(rel).cloned().collect();
        rewrite_refs(node, base_of(rel), base_of(&new_path), &[], &at_segs);
    });

    let parent_path = join(parent_segs);
    let parent = root
        .node_mut(&parent_path)
        .ok_or_else(|| MountError::MissingSubtree(parent_path.clone()))?;
    parent.attach(name, RouteEntry::Node(subtree))?;

    tracing::debug!(at = %at, "Subtree grafted");
    Ok(root)
}

/// Move the subtree at `from` to `to`, producing a new tree.
///
/// Relative html references on the moved nodes and on the node that held
/// the subtree are rewritten so they resolve to the same targets from the
/// new locations. Targets inside the moved subtree follow it.
pub fn relocate(mut root: RouteNode, from: &str, to: &str) -> Result<RouteNode, MountError> {
    let from_segs = segments(from);
    let to_segs = segments(to);
    let (Some((from_name, from_parent)), Some((to_name, to_parent))) =
        (from_segs.split_last(), to_segs.split_last())
    else {
        return Err(MountError::InvalidName(format!("{from} -> {to}")));
    };

    let source_parent = join(from_parent);
    let mut moved = match root.node_mut(&source_parent) {
        Some(parent) => match parent.detach(from_name) {
            Some(RouteEntry::Node(node)) => node,
            Some(leaf @ RouteEntry::Leaf(_)) => {
                parent.children.insert(from_name.clone(), leaf);
                return Err(MountError::NotASubtree(from.to_string()));
            }
            None => return Err(MountError::MissingSubtree(from.to_string())),
        },
        None => return Err(MountError::MissingSubtree(from.to_string())),
    };

    moved.visit_mut(&mut Vec::new(), &mut |rel: &[String], node: &mut RouteNode| {
        let old_path: Vec<String> = from_segs.iter().chain(rel).cloned().collect();
        let new_path: Vec<String> = to_segs.iter().chain(rel).cloned().collect();
        rewrite_refs(node, base_of(&old_path), base_of(&new_path), &from_segs, &to_segs);
    });

    if let Some(holder) = root.node_mut(&source_parent) {
        let base = base_of(from_parent);
        rewrite_refs(holder, base, base, &from_segs, &to_segs);
    }

    let target_parent = root
        .node_mut(&join(to_parent))
        .ok_or_else(|| MountError::MissingSubtree(join(to_parent)))?;
    target_parent.attach(to_name, RouteEntry::Node(moved))?;

    tracing::debug!(from = %from, to = %to, "Subtree relocated");
    Ok(root)
}

fn rewrite_refs(
    node: &mut RouteNode,
    old_base: &[String],
    new_base: &[String],
    moved_from: &[String],
    moved_to: &[String],
) {
    for var in RELATIVE_REF_VARS {
        if let Some(value) = node.html_vars.get_mut(var) {
            let rebased = rebase_reference(value, old_base, new_base, moved_from, moved_to);
            if *value != rebased {
                tracing::trace!(var, old = %value, new = %rebased, "Rewrote relative reference");
                *value = rebased;
            }
        }
    }
}
