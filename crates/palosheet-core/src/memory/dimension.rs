use std::sync::RwLock;

use super::subset::evaluate;
use super::{read, write};
use crate::domain::{Dimension, DomainError, DomainResult, codes};
use crate::types::{
    ChildElementInfo, ConsolidationElement, ConsolidationElementInfo, DimensionElementInfo,
    DimensionElementType, DimensionInfo, DimensionType, ParentElementInfo, SubsetDefinition,
    SubsetResult,
};

/// One element of a dimension. The identifier is the index in the element list.
#[derive(Clone, Debug)]
pub(super) struct Node {
    pub name: String,
    pub element_type: DimensionElementType,
    pub children: Vec<(u32, f64)>,
    pub parents: Vec<u32>,
}

/// Read-only view of a dimension's element tree.
pub(super) struct Tree<'a> {
    pub nodes: &'a [Node],
}

impl<'a> Tree<'a> {
    pub fn lookup(&self, name: &str) -> Option<u32> {
        let name = name.trim();
        self.nodes
            .iter()
            .position(|n| n.name.eq_ignore_ascii_case(name))
            .map(|i| i as u32)
    }

    pub fn node(&self, id: u32) -> &'a Node {
        &self.nodes[id as usize]
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + use<> {
        0..self.nodes.len() as u32
    }

    pub fn is_leaf(&self, id: u32) -> bool {
        self.node(id).children.is_empty()
    }

    /// Distance to the deepest leaf below; leaves are level 0.
    pub fn level(&self, id: u32) -> u32 {
        self.node(id)
            .children
            .iter()
            .map(|&(child, _)| self.level(child) + 1)
            .max()
            .unwrap_or(0)
    }

    /// Distance to the root along first parents; roots are depth 0.
    pub fn depth(&self, id: u32) -> u32 {
        match self.node(id).parents.first() {
            Some(&parent) => self.depth(parent) + 1,
            None => 0,
        }
    }

    /// Identifiers from the root down to `id`, along first parents.
    pub fn path(&self, id: u32) -> Vec<u32> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(&parent) = self.node(current).parents.first() {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// True when `candidate` is `id` or lies anywhere below it.
    pub fn contains(&self, id: u32, candidate: u32) -> bool {
        id == candidate
            || self
                .node(id)
                .children
                .iter()
                .any(|&(child, _)| self.contains(child, candidate))
    }

    pub fn is_ancestor(&self, id: u32, candidate: u32) -> bool {
        id != candidate && self.contains(candidate, id)
    }

    /// Base elements under `id` with their accumulated weights.
    pub fn leaves(&self, id: u32) -> Vec<(u32, f64)> {
        let node = self.node(id);
        if node.children.is_empty() {
            return vec![(id, 1.0)];
        }
        node.children
            .iter()
            .flat_map(|&(child, weight)| {
                self.leaves(child)
                    .into_iter()
                    .map(move |(leaf, w)| (leaf, w * weight))
            })
            .collect()
    }

    pub fn describe(&self, id: u32) -> DimensionElementInfo {
        let node = self.node(id);
        let depth = self.depth(id);
        DimensionElementInfo {
            identifier: id,
            name: node.name.clone(),
            element_type: node.element_type,
            level: self.level(id),
            indent: depth + 1,
            depth,
            position: id,
            children: node
                .children
                .iter()
                .map(|&(identifier, weight)| ChildElementInfo { identifier, weight })
                .collect(),
            parents: node
                .parents
                .iter()
                .map(|&identifier| ParentElementInfo { identifier })
                .collect(),
            permission: None,
        }
    }
}

/// An element resolved for cell addressing.
#[derive(Clone, Debug)]
pub(super) struct Coordinate {
    pub element_type: DimensionElementType,
    pub leaves: Vec<(u32, f64)>,
}

pub struct MemoryDimension {
    identifier: u32,
    name: String,
    nodes: RwLock<Vec<Node>>,
}

fn element_not_found(name: &str) -> DomainError {
    DomainError::new(
        codes::ELEMENT_NOT_FOUND,
        format!("element {name} not found"),
    )
}

fn resolve_children(
    tree: &Tree<'_>,
    children: &[ConsolidationElement],
) -> DomainResult<Vec<(u32, f64)>> {
    children
        .iter()
        .map(|child| {
            tree.lookup(&child.name)
                .map(|id| (id, child.weight))
                .ok_or_else(|| element_not_found(&child.name))
        })
        .collect()
}

fn unlink_children(nodes: &mut [Node], id: u32) {
    let children = std::mem::take(&mut nodes[id as usize].children);
    for (child, _) in children {
        nodes[child as usize].parents.retain(|&p| p != id);
    }
}

fn link_children(nodes: &mut [Node], id: u32, children: &[(u32, f64)]) {
    for &(child, weight) in children {
        let parent = &mut nodes[id as usize];
        match parent.children.iter_mut().find(|(c, _)| *c == child) {
            Some(existing) => existing.1 = weight,
            None => {
                parent.children.push((child, weight));
                nodes[child as usize].parents.push(id);
            }
        }
    }
}

impl MemoryDimension {
    pub(super) fn new(identifier: u32, name: &str) -> Self {
        MemoryDimension {
            identifier,
            name: name.trim().to_string(),
            nodes: RwLock::new(Vec::new()),
        }
    }

    pub fn identifier(&self) -> u32 {
        self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve an element name for cell addressing.
    pub(super) fn coordinate(&self, name: &str) -> DomainResult<Coordinate> {
        let nodes = read(&self.nodes);
        let tree = Tree { nodes: &nodes };
        let id = tree.lookup(name).ok_or_else(|| element_not_found(name))?;
        Ok(Coordinate {
            element_type: tree.node(id).element_type,
            leaves: tree.leaves(id),
        })
    }

    fn with_tree<T>(&self, f: impl FnOnce(&Tree<'_>) -> T) -> T {
        let nodes = read(&self.nodes);
        f(&Tree { nodes: &nodes })
    }
}

impl Dimension for MemoryDimension {
    fn info(&self) -> DomainResult<DimensionInfo> {
        Ok(DimensionInfo {
            name: self.name.clone(),
            dimension_type: DimensionType::Normal,
            permission: None,
        })
    }

    fn element_count(&self) -> DomainResult<usize> {
        Ok(read(&self.nodes).len())
    }

    fn elements(&self) -> DomainResult<Vec<DimensionElementInfo>> {
        Ok(self.with_tree(|tree| tree.ids().map(|id| tree.describe(id)).collect()))
    }

    fn element(&self, name: &str) -> DomainResult<DimensionElementInfo> {
        self.with_tree(|tree| {
            tree.lookup(name)
                .map(|id| tree.describe(id))
                .ok_or_else(|| element_not_found(name))
        })
    }

    fn add_element(
        &self,
        name: &str,
        element_type: DimensionElementType,
        children: &[ConsolidationElement],
    ) -> DomainResult<DimensionElementInfo> {
        let mut nodes = write(&self.nodes);
        let tree = Tree { nodes: &nodes };
        if tree.lookup(name).is_some() {
            return Err(DomainError::new(
                codes::ELEMENT_EXISTS,
                format!("element {name} already exists"),
            ));
        }
        if children.iter().any(|c| c.name.trim().eq_ignore_ascii_case(name.trim())) {
            return Err(DomainError::new(
                codes::ELEMENT_CIRCULAR_REFERENCE,
                format!("element {name} cannot consolidate itself"),
            ));
        }
        let resolved = if element_type == DimensionElementType::Consolidated {
            resolve_children(&tree, children)?
        } else {
            Vec::new()
        };

        let id = nodes.len() as u32;
        nodes.push(Node {
            name: name.trim().to_string(),
            element_type,
            children: Vec::new(),
            parents: Vec::new(),
        });
        link_children(&mut nodes, id, &resolved);
        tracing::debug!(dimension = %self.name, element = name, "element added");
        Ok(Tree { nodes: &nodes }.describe(id))
    }

    fn update_element(
        &self,
        name: &str,
        element_type: DimensionElementType,
        children: &[ConsolidationElement],
        append: bool,
    ) -> DomainResult<DimensionElementInfo> {
        let mut nodes = write(&self.nodes);
        let tree = Tree { nodes: &nodes };
        let id = tree.lookup(name).ok_or_else(|| element_not_found(name))?;

        if element_type != DimensionElementType::Consolidated {
            unlink_children(&mut nodes, id);
            nodes[id as usize].element_type = element_type;
            return Ok(Tree { nodes: &nodes }.describe(id));
        }

        let resolved = resolve_children(&tree, children)?;
        if let Some(&(child, _)) = resolved
            .iter()
            .find(|&&(child, _)| tree.contains(child, id))
        {
            return Err(DomainError::new(
                codes::ELEMENT_CIRCULAR_REFERENCE,
                format!(
                    "element {} is {name} or one of its ancestors",
                    tree.node(child).name
                ),
            ));
        }
        if !append {
            unlink_children(&mut nodes, id);
        }
        link_children(&mut nodes, id, &resolved);
        nodes[id as usize].element_type = element_type;
        Ok(Tree { nodes: &nodes }.describe(id))
    }

    fn consolidation_elements(&self, name: &str) -> DomainResult<Vec<ConsolidationElementInfo>> {
        self.with_tree(|tree| {
            let id = tree.lookup(name).ok_or_else(|| element_not_found(name))?;
            Ok(tree
                .node(id)
                .children
                .iter()
                .map(|&(child, weight)| {
                    let node = tree.node(child);
                    ConsolidationElementInfo {
                        name: node.name.clone(),
                        element_type: node.element_type,
                        identifier: child,
                        weight,
                    }
                })
                .collect())
        })
    }

    fn subset(&self, definition: &SubsetDefinition) -> DomainResult<Vec<SubsetResult>> {
        self.with_tree(|tree| evaluate(tree, definition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// All Products = Desktop L + Desktop Pro, plus a standalone Notes string element.
    fn products() -> MemoryDimension {
        let dim = MemoryDimension::new(0, "Products");
        dim.add_element("Desktop L", DimensionElementType::Numeric, &[])
            .unwrap();
        dim.add_element("Desktop Pro", DimensionElementType::Numeric, &[])
            .unwrap();
        dim.add_element(
            "All Products",
            DimensionElementType::Consolidated,
            &[
                ConsolidationElement::new("Desktop L", 1.0),
                ConsolidationElement::new("Desktop Pro", 1.0),
            ],
        )
        .unwrap();
        dim.add_element("Notes", DimensionElementType::String, &[])
            .unwrap();
        dim
    }

    #[test]
    fn test_hierarchy_metrics() {
        let dim = products();
        let top = dim.element("all products").unwrap();
        assert_eq!(top.level, 1);
        assert_eq!(top.depth, 0);
        assert_eq!(top.children.len(), 2);
        let leaf = dim.element("Desktop L").unwrap();
        assert_eq!(leaf.level, 0);
        assert_eq!(leaf.depth, 1);
        assert_eq!(leaf.indent, 2);
        assert_eq!(leaf.parents, vec![ParentElementInfo { identifier: 2 }]);
        assert_eq!(dim.element_count().unwrap(), 4);
    }

    #[test]
    fn test_duplicate_element() {
        let dim = products();
        let err = dim
            .add_element("desktop l", DimensionElementType::Numeric, &[])
            .unwrap_err();
        assert_eq!(err.code, codes::ELEMENT_EXISTS);
    }

    #[test]
    fn test_unknown_child() {
        let dim = products();
        let err = dim
            .add_element(
                "Total",
                DimensionElementType::Consolidated,
                &[ConsolidationElement::new("Laptop", 1.0)],
            )
            .unwrap_err();
        assert_eq!(err.code, codes::ELEMENT_NOT_FOUND);
        assert!(dim.element("Total").is_err());
    }

    #[test]
    fn test_update_replace_and_append() {
        let dim = products();
        dim.update_element(
            "All Products",
            DimensionElementType::Consolidated,
            &[ConsolidationElement::new("Desktop L", 2.0)],
            false,
        )
        .unwrap();
        let children = dim.consolidation_elements("All Products").unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].weight, 2.0);
        assert!(dim.element("Desktop Pro").unwrap().parents.is_empty());

        dim.update_element(
            "All Products",
            DimensionElementType::Consolidated,
            &[ConsolidationElement::new("Desktop Pro", 0.5)],
            true,
        )
        .unwrap();
        let names: Vec<_> = dim
            .consolidation_elements("All Products")
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Desktop L", "Desktop Pro"]);
    }

    #[test]
    fn test_update_rejects_cycles() {
        let dim = products();
        dim.add_element("Desktop Sub", DimensionElementType::Numeric, &[])
            .unwrap();
        dim.update_element(
            "Desktop L",
            DimensionElementType::Consolidated,
            &[ConsolidationElement::new("Desktop Sub", 1.0)],
            false,
        )
        .unwrap();
        let err = dim
            .update_element(
                "Desktop Sub",
                DimensionElementType::Consolidated,
                &[ConsolidationElement::new("All Products", 1.0)],
                false,
            )
            .unwrap_err();
        assert_eq!(err.code, codes::ELEMENT_CIRCULAR_REFERENCE);
    }

    #[test]
    fn test_base_type_drops_children() {
        let dim = products();
        let info = dim
            .update_element("All Products", DimensionElementType::Numeric, &[], false)
            .unwrap();
        assert!(info.children.is_empty());
        assert_eq!(info.level, 0);
    }

    #[test]
    fn test_weighted_leaves() {
        let dim = products();
        dim.add_element(
            "Double",
            DimensionElementType::Consolidated,
            &[ConsolidationElement::new("All Products", 2.0)],
        )
        .unwrap();
        let coord = dim.coordinate("Double").unwrap();
        assert_eq!(coord.leaves, vec![(0, 2.0), (1, 2.0)]);
    }
}
