pub mod builder;

use std::collections::HashMap;

use crate::error::{ProctreeError, Result};
use crate::model::ProcessRecord;

#[derive(Debug, Clone)]
pub struct ProcessNode {
    pub record: ProcessRecord,
    parent: Option<u32>,
    /// Discovery order.
    children: Vec<u32>,
}

impl ProcessNode {
    fn new(record: ProcessRecord) -> Self {
        Self {
            record,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn pid(&self) -> u32 {
        self.record.pid
    }

    pub fn is_defunct(&self) -> bool {
        self.record.defunct
    }

    /// Parent inside this tree, if linked.
    pub fn parent_pid(&self) -> Option<u32> {
        self.parent
    }

    pub fn child_pids(&self) -> &[u32] {
        &self.children
    }
}

/// Arena of process nodes keyed by pid. Parent and child links are pids
/// resolved through the same map. Populated once by
/// [`builder::TreeBuilder`] and only read after.
#[derive(Debug, Default)]
pub struct ProcessTree {
    nodes: HashMap<u32, ProcessNode>,
    /// Insertion order, used for whole-tree scans.
    order: Vec<u32>,
    root: Option<u32>,
}

impl ProcessTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unlinked node. Inserting an id twice is an error.
    pub fn insert(&mut self, record: ProcessRecord) -> Result<()> {
        if self.nodes.contains_key(&record.pid) {
            return Err(ProctreeError::DuplicateProcess(record.pid));
        }
        self.order.push(record.pid);
        self.nodes.insert(record.pid, ProcessNode::new(record));
        Ok(())
    }

    /// Attach `child` under `parent`. Returns `Ok(false)` without touching
    /// anything when the child already has a parent or is the root.
    pub fn link(&mut self, parent: u32, child: u32) -> Result<bool> {
        if !self.nodes.contains_key(&parent) {
            return Err(ProctreeError::ProcessNotFound(parent));
        }
        let child_node = self
            .nodes
            .get_mut(&child)
            .ok_or(ProctreeError::ProcessNotFound(child))?;
        if child_node.parent.is_some() || parent == child || self.root == Some(child) {
            return Ok(false);
        }
        child_node.parent = Some(parent);

        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(child);
        }
        Ok(true)
    }

    pub fn find(&self, pid: u32) -> Option<&ProcessNode> {
        self.nodes.get(&pid)
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.nodes.contains_key(&pid)
    }

    /// Designate an already-inserted node as root. Only one call per tree.
    pub fn set_root(&mut self, pid: u32) -> Result<()> {
        if let Some(existing) = self.root {
            return Err(ProctreeError::RootAlreadySet(existing));
        }
        if !self.nodes.contains_key(&pid) {
            return Err(ProctreeError::ProcessNotFound(pid));
        }
        self.root = Some(pid);
        Ok(())
    }

    pub fn root(&self) -> Option<&ProcessNode> {
        self.root.and_then(|pid| self.nodes.get(&pid))
    }

    pub fn parent_of(&self, node: &ProcessNode) -> Option<&ProcessNode> {
        node.parent.and_then(|pid| self.nodes.get(&pid))
    }

    pub fn children_of<'a>(
        &'a self,
        node: &'a ProcessNode,
    ) -> impl Iterator<Item = &'a ProcessNode> + 'a {
        node.children.iter().filter_map(move |pid| self.nodes.get(pid))
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &ProcessNode> {
        self.order.iter().filter_map(move |pid| self.nodes.get(pid))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
