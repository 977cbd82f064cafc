//! `.bidsignore` style exclusion rules.

use std::sync::{Arc, RwLock};

use ignore::Match;
use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::BidsError;
use crate::file::BidsFile;

/// Name of the dataset-authored exclusion file.
pub const BIDSIGNORE: &str = ".bidsignore";

/// Patterns every dataset excludes, in precedence order.
pub const DEFAULT_IGNORES: &[&str] = &[
    ".git**",
    ".*",
    "sourcedata/",
    "code/",
    "stimuli/",
    "log/",
    "**/meg/*.ds/**",
    "**/micr/*.zarr/**",
];

#[derive(Debug)]
struct RuleSet {
    patterns: Vec<String>,
    matcher: Gitignore,
}

impl RuleSet {
    fn compile(patterns: &[String]) -> Result<Gitignore, BidsError> {
        let mut builder = GitignoreBuilder::new("");
        for pattern in patterns {
            builder
                .add_line(None, pattern)
                .map_err(|source| BidsError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
        }
        builder.build().map_err(|source| BidsError::InvalidPattern {
            pattern: patterns.join("\n"),
            source,
        })
    }
}

/// Gitignore-semantics matcher over dataset-relative paths.
///
/// Handles are cheap to clone and share one rule set, so rules added while a
/// tree is still being built apply to every file that holds a handle.
#[derive(Debug, Clone)]
pub struct FileIgnoreRules {
    rules: Arc<RwLock<RuleSet>>,
}

impl FileIgnoreRules {
    /// Create rules seeded with the defaults followed by `config`.
    pub fn new<S: AsRef<str>>(config: &[S]) -> Result<Self, BidsError> {
        let patterns: Vec<String> = DEFAULT_IGNORES
            .iter()
            .map(|p| p.to_string())
            .chain(config.iter().map(|p| p.as_ref().to_string()))
            .collect();
        let matcher = RuleSet::compile(&patterns)?;
        Ok(Self {
            rules: Arc::new(RwLock::new(RuleSet { patterns, matcher })),
        })
    }

    /// Append patterns. Later patterns take precedence over earlier ones.
    ///
    /// On error the loaded rules are left untouched.
    pub fn add<S: AsRef<str>>(&self, patterns: &[S]) -> Result<(), BidsError> {
        if patterns.is_empty() {
            return Ok(());
        }
        let mut rules = self.rules.write().unwrap_or_else(|e| e.into_inner());
        let mut next = rules.patterns.clone();
        next.extend(patterns.iter().map(|p| p.as_ref().to_string()));
        rules.matcher = RuleSet::compile(&next)?;
        rules.patterns = next;
        Ok(())
    }

    /// Test if a dataset relative path should be ignored.
    ///
    /// Paths carry a leading `/`; a trailing `/` marks a directory.
    pub fn test(&self, path: &str) -> bool {
        let relative = path.strip_prefix('/').unwrap_or(path);
        let is_dir = relative.ends_with('/');
        let relative = relative.trim_end_matches('/');
        if relative.is_empty() {
            return false;
        }

        let rules = self.rules.read().unwrap_or_else(|e| e.into_inner());

        // An excluded directory cannot have its contents re-included.
        for (idx, _) in relative.match_indices('/') {
            if let Match::Ignore(_) = rules.matcher.matched(&relative[..idx], true) {
                return true;
            }
        }
        rules.matcher.matched(relative, is_dir).is_ignore()
    }

    /// Loaded patterns, defaults first.
    pub fn patterns(&self) -> Vec<String> {
        let rules = self.rules.read().unwrap_or_else(|e| e.into_inner());
        rules.patterns.clone()
    }
}

/// Read the pattern lines of a `.bidsignore` file.
pub fn read_bidsignore(file: &dyn BidsFile) -> Result<Vec<String>, BidsError> {
    let text = file.text()?;
    Ok(text.lines().map(str::to_string).collect())
}
