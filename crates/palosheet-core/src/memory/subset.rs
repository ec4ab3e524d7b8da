//! Subset evaluation over a dimension tree.

use regex::{Regex, RegexBuilder};

use super::dimension::Tree;
use crate::domain::{DomainError, DomainResult, codes};
use crate::types::{
    DimensionElementType, SortingFilter, StructuralFilter, SubsetDefinition, SubsetResult,
    TextFilter, filter_flags,
};

use filter_flags::{sorting, structural, text};

pub(super) fn evaluate(
    tree: &Tree<'_>,
    definition: &SubsetDefinition,
) -> DomainResult<Vec<SubsetResult>> {
    let mut ids: Vec<u32> = tree.ids().collect();

    if let Some(basic) = definition.basic.as_ref().filter(|b| b.is_active()) {
        let names: &[String] = basic.manual_subset.as_deref().unwrap_or(&[]);
        ids = names.iter().filter_map(|name| tree.lookup(name)).collect();
    }
    if let Some(filter) = &definition.structural {
        ids = apply_structural(tree, ids, filter)?;
    }
    if let Some(filter) = definition.text.as_ref().filter(|t| t.is_active()) {
        ids = apply_text(tree, ids, filter)?;
    }
    if let Some(filter) = &definition.sorting {
        ids = apply_sorting(tree, ids, filter);
    }
    if definition.data.is_some() || definition.field.is_some() {
        tracing::debug!("data and field filters are not evaluated in memory");
    }

    let indent = u32::try_from(definition.indent).unwrap_or(0);
    Ok(ids
        .into_iter()
        .map(|id| {
            let node = tree.node(id);
            let depth = tree.depth(id);
            let path: Vec<String> = tree.path(id).iter().map(u32::to_string).collect();
            SubsetResult {
                name: node.name.clone(),
                alias: node.name.clone(),
                indent,
                path: path.join("/"),
                identifier: id,
                position: id,
                level: tree.level(id),
                element_indent: depth + 1,
                depth,
                element_type: node.element_type,
                number_parents: node.parents.len() as u32,
                number_children: node.children.len() as u32,
            }
        })
        .collect())
}

fn apply_structural(
    tree: &Tree<'_>,
    ids: Vec<u32>,
    filter: &StructuralFilter,
) -> DomainResult<Vec<u32>> {
    let flags = filter.flags;
    let bound = if filter.bound.trim().is_empty() {
        None
    } else {
        Some(tree.lookup(&filter.bound).ok_or_else(|| {
            DomainError::new(
                codes::ELEMENT_NOT_FOUND,
                format!("element {} not found", filter.bound),
            )
        })?)
    };

    Ok(ids
        .into_iter()
        .filter(|&id| match bound {
            Some(bound) if flags & structural::BELOW_INCLUSIVE != 0 => tree.contains(bound, id),
            Some(bound) if flags & structural::BELOW_EXCLUSIVE != 0 => {
                bound != id && tree.contains(bound, id)
            }
            Some(bound) if flags & structural::ABOVE_INCLUSIVE != 0 => tree.contains(id, bound),
            Some(bound) if flags & structural::ABOVE_EXCLUSIVE != 0 => tree.is_ancestor(bound, id),
            _ => true,
        })
        .filter(|&id| {
            let leaf = tree.is_leaf(id);
            !(leaf && flags & structural::HIDE_LEAVES != 0
                || !leaf && flags & structural::HIDE_CONSOLIDATED != 0)
        })
        .filter(|&id| match filter.level {
            Some((start, end)) => {
                let level = if flags & structural::HIERARCHIAL_LEVEL != 0 {
                    tree.depth(id)
                } else {
                    tree.level(id)
                };
                (start..=end).contains(&i64::from(level))
            }
            None => true,
        })
        .collect())
}

/// Translate a `*`/`?` wildcard pattern into an anchored regular expression.
fn wildcard_pattern(pattern: &str) -> String {
    let mut out = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    out
}

fn apply_text(tree: &Tree<'_>, ids: Vec<u32>, filter: &TextFilter) -> DomainResult<Vec<u32>> {
    let extended = filter.flags & text::EXTENDED != 0;
    let patterns = filter
        .regexps
        .iter()
        .map(|p| {
            let source = if extended {
                p.clone()
            } else {
                wildcard_pattern(p)
            };
            RegexBuilder::new(&source)
                .case_insensitive(!extended)
                .build()
                .map_err(|e| DomainError::new(codes::INVALID_STRING, e.to_string()))
        })
        .collect::<DomainResult<Vec<Regex>>>()?;

    Ok(ids
        .into_iter()
        .filter(|&id| {
            let name = &tree.node(id).name;
            patterns.iter().any(|re| re.is_match(name))
        })
        .collect())
}

fn apply_sorting(tree: &Tree<'_>, mut ids: Vec<u32>, filter: &SortingFilter) -> Vec<u32> {
    let flags = filter.effective_flags();
    if flags & sorting::LEAVES_ONLY != 0 {
        ids.retain(|&id| tree.is_leaf(id));
    }
    if flags & sorting::CONSOLIDATED_ONLY != 0 {
        ids.retain(|&id| tree.node(id).element_type == DimensionElementType::Consolidated);
    }
    if let Some(level) = filter.level {
        ids.retain(|&id| tree.level(id) == level);
    }
    if flags & sorting::TEXT != 0 {
        ids.sort_by_cached_key(|&id| tree.node(id).name.to_lowercase());
    } else if flags & sorting::NUMERIC != 0 {
        ids.sort_by(|&a, &b| {
            let key = |id: u32| tree.node(id).name.trim().parse::<f64>().unwrap_or(f64::MAX);
            key(a).total_cmp(&key(b))
        });
    }
    if flags & sorting::REVERSE_ORDER != 0 {
        ids.reverse();
    }

    let start = filter.limit_start as usize;
    let count = if filter.limit_count == 0 {
        usize::MAX
    } else {
        filter.limit_count as usize
    };
    ids.into_iter().skip(start).take(count).collect()
}
