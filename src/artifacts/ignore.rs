//! Working-tree exclusion rules
//!
//! A minimal `.gitignore` rule set, matched against paths made relative to
//! the repository root with a leading `/` (directories carry a trailing
//! `/`). The git-dir and everything beneath it is always excluded.
//!
//! Supported grammar:
//! - blank lines and `#` comments are skipped; `\#` escapes a literal `#`
//! - a trailing `/` restricts the rule to directory candidates
//! - a leading or embedded `/` makes the rule a root-relative prefix match
//! - anything else matches as a byte suffix of the candidate path
//!
//! Negation, `**` globbing, character classes and escaped spaces are not
//! implemented; rules using them conservatively match nothing.

use anyhow::Context;
use std::io::BufRead;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    /// One raw rule per non-empty `.gitignore` line
    rules: Vec<Vec<u8>>,
    /// Git directory name, always excluded
    git_dir: String,
}

impl IgnoreRules {
    pub fn empty(git_dir: &str) -> Self {
        IgnoreRules {
            rules: Vec::new(),
            git_dir: git_dir.to_string(),
        }
    }

    /// Load rules from an ignore file; a missing file means no rules
    pub fn load(ignore_file: &Path, git_dir: &str) -> anyhow::Result<Self> {
        let file = match std::fs::File::open(ignore_file) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::empty(git_dir));
            }
            Err(err) => {
                return Err(err).context(format!("unable to read ignore file {ignore_file:?}"));
            }
        };

        let mut rules = Vec::new();
        for line in std::io::BufReader::new(file).lines() {
            rules.push(line?.into_bytes());
        }

        Ok(IgnoreRules {
            rules,
            git_dir: git_dir.to_string(),
        })
    }

    /// Decide whether a root-relative path (leading `/`, trailing `/` for
    /// directories) is excluded
    pub fn is_ignored(&self, path: &str) -> bool {
        // the git directory is excluded regardless of rules
        if path.starts_with(&format!("/{}/", self.git_dir)) {
            return true;
        }

        self.rules.iter().any(|rule| Self::rule_matches(rule, path))
    }

    fn rule_matches(rule: &[u8], path: &str) -> bool {
        if rule.is_empty() {
            return false;
        }
        if rule[0] == b'#' {
            return false;
        }

        let mut rule = rule;
        if rule.len() >= 2 && rule[0] == b'\\' && rule[1] == b'#' {
            rule = &rule[1..];
        }

        if rule[0] == b'/' {
            return Self::match_parts(rule, path, true);
        }

        if let Some(l) = rule.iter().rposition(|&b| b == b'/')
            && (l < rule.len() - 1 || l == 0)
        {
            // an embedded separator anchors the rule to the root
            let mut prefixed = Vec::with_capacity(rule.len() + 1);
            prefixed.push(b'/');
            prefixed.extend_from_slice(rule);
            return Self::match_parts(&prefixed, path, true);
        }

        Self::match_parts(rule, path, false)
    }

    fn match_parts(rule: &[u8], path: &str, prefix_match: bool) -> bool {
        let dir_match = rule[rule.len() - 1] == b'/';

        if !prefix_match && !dir_match && path.as_bytes().ends_with(rule) {
            return true;
        }

        if dir_match && path.ends_with('/') {
            return true;
        }

        if prefix_match && path.as_bytes().starts_with(rule) {
            return true;
        }

        false
    }
}
