//! Rebuilds the directory hierarchy from flat archive paths.

use std::collections::HashMap;

use super::model::FileEntry;

/// Turn the flat entry list recorded during a scan into a nested tree.
///
/// Entries are sorted by path first. Every directory implied by a path is
/// materialized exactly once, whether or not the archive has an explicit
/// entry for it; when it does, the first occurrence is kept.
pub fn build_tree(mut entries: Vec<FileEntry>) -> Vec<FileEntry> {
    entries.sort_by(|a, b| a.path.cmp(&b.path));

    // Arena in creation order: a parent's index is always below its children's
    let mut nodes: Vec<FileEntry> = Vec::with_capacity(entries.len());
    let mut parents: Vec<Option<usize>> = Vec::with_capacity(entries.len());
    let mut directories: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let segments: Vec<String> = entry
            .path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        let Some((last, ancestors)) = segments.split_last() else {
            continue;
        };

        let mut parent = None;
        let mut key = String::new();
        for segment in ancestors {
            key.push_str(segment);
            key.push('/');
            let index = match directories.get(&key) {
                Some(&index) => index,
                None => {
                    nodes.push(FileEntry::synthetic_directory(key.clone(), segment.clone()));
                    parents.push(parent);
                    directories.insert(key.clone(), nodes.len() - 1);
                    nodes.len() - 1
                }
            };
            parent = Some(index);
        }

        if entry.is_directory {
            key.push_str(last);
            key.push('/');
            if directories.contains_key(&key) {
                continue;
            }
            directories.insert(key, nodes.len());
        }
        nodes.push(entry);
        parents.push(parent);
    }

    assemble(nodes, parents)
}

// Walk the arena backwards so every child is complete before its parent
fn assemble(mut nodes: Vec<FileEntry>, parents: Vec<Option<usize>>) -> Vec<FileEntry> {
    let mut pending: Vec<Vec<FileEntry>> = vec![Vec::new(); nodes.len()];
    let mut roots = Vec::new();

    while let Some(mut node) = nodes.pop() {
        let index = nodes.len();
        if node.is_directory {
            let mut children = std::mem::take(&mut pending[index]);
            children.reverse();
            node.children = Some(children);
        }
        match parents[index] {
            Some(parent) => pending[parent].push(node),
            None => roots.push(node),
        }
    }

    roots.reverse();
    roots
}
