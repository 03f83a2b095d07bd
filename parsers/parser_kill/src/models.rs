use std::collections::HashMap;

use serde::Serialize;

/// (kill identifier, node number)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeKey {
    pub kill: String,
    pub node: u32,
}

impl NodeKey {
    pub fn new(kill: impl Into<String>, node: u32) -> Self {
        Self {
            kill: kill.into(),
            node,
        }
    }
}

/// An operator applied to component or node identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KillNode {
    pub operator: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct KillTree {
    /// Count declared in the file header
    pub kill_count: usize,
    /// Kill whose description matched the one the output file requested
    pub kill_id: Option<String>,
    /// (kill id, description) for every header row
    pub descriptions: Vec<(String, String)>,
    pub nodes: HashMap<NodeKey, KillNode>,
    /// Last node encountered for each kill
    pub last_node: HashMap<String, u32>,
}

impl KillTree {
    pub fn node(&self, kill: &str, node: u32) -> Option<&KillNode> {
        self.nodes.get(&NodeKey::new(kill, node))
    }

    /// The last node of `kill`, which combines the others into the kill result
    pub fn result_node(&self, kill: &str) -> Option<&KillNode> {
        let node = *self.last_node.get(kill)?;
        self.node(kill, node)
    }

    /// Nodes of one kill ordered by node number
    pub fn nodes_for(&self, kill: &str) -> Vec<(u32, &KillNode)> {
        let mut nodes: Vec<_> = self
            .nodes
            .iter()
            .filter(|(key, _)| key.kill == kill)
            .map(|(key, node)| (key.node, node))
            .collect();
        nodes.sort_by_key(|(number, _)| *number);
        nodes
    }

    pub fn description(&self, kill: &str) -> Option<&str> {
        self.descriptions
            .iter()
            .find(|(id, _)| id == kill)
            .map(|(_, description)| description.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
