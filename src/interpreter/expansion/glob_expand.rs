//! Pathname expansion: walks the virtual
//! filesystem component by component, matching each glob-bearing segment
//! against the directory it would live in. A segment with no metacharacters
//! is checked for existence rather than globbed, so `a/b*/c` only descends
//! into directories that are actually there.

use crate::interpreter::sync_fs::SyncFs;

/// Expands `pattern` (resolved against `cwd` if relative) to the sorted list
/// of existing paths it matches. An empty result means "no match"; per spec
/// §4.3 the caller keeps the original literal pattern in that case.
pub fn expand(fs: &dyn SyncFs, cwd: &str, pattern: &str) -> Vec<String> {
    let absolute = pattern.starts_with('/');
    let components: Vec<&str> = pattern.trim_start_matches('/').split('/').filter(|c| !c.is_empty()).collect();
    if components.is_empty() {
        return Vec::new();
    }

    let mut candidates = vec![if absolute { "/".to_string() } else { cwd.to_string() }];
    for comp in &components {
        let mut next = Vec::new();
        for base in &candidates {
            if crate::glob::has_metachars(comp) {
                if let Ok(mut entries) = fs.read_dir(base) {
                    entries.retain(|e| !(e.starts_with('.') && !comp.starts_with('.')));
                    entries.retain(|e| crate::glob::matches(comp, e));
                    entries.sort();
                    for entry in entries {
                        next.push(join(base, &entry));
                    }
                }
            } else {
                let candidate = join(base, comp);
                if fs.exists(&candidate) {
                    next.push(candidate);
                }
            }
        }
        candidates = next;
    }
    candidates.sort();
    candidates
}

fn join(base: &str, comp: &str) -> String {
    if base == "/" {
        format!("/{comp}")
    } else {
        format!("{base}/{comp}")
    }
}
