//! File classification
//!
//! Decides what happens to each file of the source tree for one keyword.
//! Rules are checked in order and the first one that applies wins:
//!
//! 1. the path starts with a bulk folder name: already copied wholesale
//! 2. the file name is one of the root files: already copied on its own
//! 3. neither the file name nor the path mentions the keyword: excluded
//! 4. otherwise the first placement rule whose text occurs in the path
//!    picks the destination subfolder; no rule means the target root
//!
//! All comparisons ignore case. Classification is pure; copying is done by
//! the orchestrator.

use serde::{Deserialize, Serialize};

use super::Keyword;

/// Where a matched file lands inside a BuildTarget
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Destination {
    /// A named subfolder of the target (`controllers`, `routes`, ...)
    Subfolder(String),
    /// The target directory itself
    Root,
}

/// Outcome of classifying one file for one keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// Under a bulk folder, copied with the whole folder
    CoveredByBulkFolder,
    /// A root file, copied separately
    CoveredByRootFile,
    /// Doesn't mention the keyword
    Excluded,
    /// Mentions the keyword; copy it here
    Place { destination: Destination },
}

impl Decision {
    pub fn is_placed(&self) -> bool {
        matches!(self, Decision::Place { .. })
    }
}

/// "If the path contains `contains`, put the file into `destination`"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRule {
    pub contains: String,
    pub destination: String,
}

impl PlacementRule {
    pub fn new(contains: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            contains: contains.into(),
            destination: destination.into(),
        }
    }
}

/// The static rule set a build classifies against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    bulk_folders: Vec<String>,
    root_files: Vec<String>,
    placement: Vec<PlacementRule>,
}

impl RuleSet {
    pub fn new(
        bulk_folders: Vec<String>,
        root_files: Vec<String>,
        placement: Vec<PlacementRule>,
    ) -> Self {
        Self {
            bulk_folders: bulk_folders.iter().map(|f| f.to_lowercase()).collect(),
            root_files: root_files.iter().map(|f| f.to_lowercase()).collect(),
            placement: placement
                .into_iter()
                .map(|r| PlacementRule {
                    contains: r.contains.to_lowercase(),
                    destination: r.destination,
                })
                .collect(),
        }
    }

    /// Classifies a file given its path relative to the source root.
    ///
    /// `relative_path` uses `/` separators regardless of platform.
    pub fn classify(&self, relative_path: &str, keyword: &Keyword) -> Decision {
        let path = relative_path.to_lowercase();
        let file_name = path.rsplit('/').next().unwrap_or(&path);

        if self.bulk_folders.iter().any(|folder| path.starts_with(folder.as_str())) {
            return Decision::CoveredByBulkFolder;
        }

        if self.root_files.iter().any(|name| name == file_name) {
            return Decision::CoveredByRootFile;
        }

        if !keyword.matches(file_name) && !keyword.matches(&path) {
            return Decision::Excluded;
        }

        let destination = self
            .placement
            .iter()
            .find(|rule| path.contains(rule.contains.as_str()))
            .map(|rule| Destination::Subfolder(rule.destination.clone()))
            .unwrap_or(Destination::Root);

        Decision::Place { destination }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RuleSet {
        RuleSet::new(
            vec!["models".into(), "configs".into(), "utils".into()],
            vec!["app.js".into(), "lambda.js".into(), "local.js".into()],
            vec![
                PlacementRule::new("controller", "controllers"),
                PlacementRule::new("routes", "routes"),
                PlacementRule::new("handler", "handlers"),
            ],
        )
    }

    fn kw(s: &str) -> Keyword {
        s.parse().unwrap()
    }

    fn placed(dest: &str) -> Decision {
        Decision::Place {
            destination: Destination::Subfolder(dest.to_string()),
        }
    }

    #[test]
    fn bulk_folders_are_skipped_even_when_matching() {
        let r = rules();
        assert_eq!(
            r.classify("models/userModel.js", &kw("user")),
            Decision::CoveredByBulkFolder
        );
        assert_eq!(
            r.classify("utils/corsUtils.js", &kw("zzz")),
            Decision::CoveredByBulkFolder
        );
    }

    #[test]
    fn root_files_are_skipped_anywhere() {
        let r = rules();
        assert_eq!(r.classify("app.js", &kw("app")), Decision::CoveredByRootFile);
        assert_eq!(
            r.classify("handlers/lambda.js", &kw("handlers")),
            Decision::CoveredByRootFile
        );
    }

    #[test]
    fn non_matching_files_are_excluded() {
        let r = rules();
        assert_eq!(
            r.classify("controllers/fabricController.js", &kw("user")),
            Decision::Excluded
        );
    }

    #[test]
    fn match_is_case_insensitive() {
        let r = rules();
        assert_eq!(
            r.classify("controllers/UserController.ts", &kw("user")),
            placed("controllers")
        );
        assert_eq!(
            r.classify("routes/userRoutes.js", &kw("USER")),
            placed("routes")
        );
    }

    #[test]
    fn first_placement_rule_wins() {
        let r = rules();
        // Contains both "routes" and "handler"; routes comes first
        assert_eq!(
            r.classify("routes/userHandlerRoutes.js", &kw("user")),
            placed("routes")
        );
        assert_eq!(
            r.classify("handlers/userController.js", &kw("user")),
            placed("controllers")
        );
        assert_eq!(
            r.classify("handlers/userHandler.js", &kw("user")),
            placed("handlers")
        );
    }

    #[test]
    fn unplaced_matches_go_to_root() {
        let r = rules();
        assert_eq!(
            r.classify("services/userService.js", &kw("user")),
            Decision::Place {
                destination: Destination::Root
            }
        );
    }

    #[test]
    fn keyword_in_directory_name_matches() {
        let r = rules();
        assert_eq!(
            r.classify("user/index.js", &kw("user")),
            Decision::Place {
                destination: Destination::Root
            }
        );
    }

    #[test]
    fn bulk_prefix_is_a_plain_string_prefix() {
        let r = rules();
        assert_eq!(
            r.classify("modelsLegacy/userModel.js", &kw("user")),
            Decision::CoveredByBulkFolder
        );
    }

    #[test]
    fn empty_placement_sends_everything_to_root() {
        let r = RuleSet::new(vec![], vec![], vec![]);
        let d = r.classify("controllers/userController.js", &kw("user"));
        assert_eq!(
            d,
            Decision::Place {
                destination: Destination::Root
            }
        );
        assert!(d.is_placed());
    }
}
