//! Process probe.
//!
//! A condition holds when any populated sub-field (pid, name, matching)
//! matches any process in the snapshot.

use regex::Regex;

use super::condition::ProcessCondition;
use super::error::EvalError;
use super::facts::ProcessFact;

/// Compiled form of a [`ProcessCondition`].
pub struct ProcessMatcher<'a> {
    condition: &'a ProcessCondition,
    pattern: Option<Regex>,
}

impl<'a> ProcessMatcher<'a> {
    /// Compile the condition's pattern, if any.
    pub fn new(condition: &'a ProcessCondition) -> Result<Self, EvalError> {
        let pattern = match condition.matching {
            Some(ref pattern) => {
                Some(
                    Regex::new(pattern).map_err(|error| EvalError::InvalidPattern {
                        pattern: pattern.clone(),
                        error,
                    })?,
                )
            }
            None => None,
        };
        Ok(Self { condition, pattern })
    }

    /// Whether some process satisfies the condition.
    ///
    /// Sub-fields are tried in the order pid, name, matching. A condition
    /// with none of them populated is never satisfied.
    pub fn is_satisfied(&self, facts: &[ProcessFact]) -> bool {
        self.pid_matches(facts) || self.name_matches(facts) || self.pattern_matches(facts)
    }

    fn pid_matches(&self, facts: &[ProcessFact]) -> bool {
        match self.condition.pid {
            Some(pid) => facts.iter().any(|fact| fact.pid == pid),
            None => false,
        }
    }

    fn name_matches(&self, facts: &[ProcessFact]) -> bool {
        match self.condition.name {
            Some(ref name) => facts.iter().any(|fact| fact.name == *name),
            None => false,
        }
    }

    fn pattern_matches(&self, facts: &[ProcessFact]) -> bool {
        let Some(ref pattern) = self.pattern else {
            return false;
        };
        facts
            .iter()
            .filter(|fact| !fact.cmdline.is_empty())
            .any(|fact| matches_from_start(pattern, &fact.command_line()))
    }
}

/// Match anchored at position 0 of `haystack`, but not at its end.
///
/// The leftmost match is returned first, so a match starting at 0 exists
/// iff the first match found starts there.
fn matches_from_start(pattern: &Regex, haystack: &str) -> bool {
    pattern.find(haystack).is_some_and(|m| m.start() == 0)
}

/// Evaluate one process condition against a snapshot.
pub fn evaluate(condition: &ProcessCondition, facts: &[ProcessFact]) -> Result<bool, EvalError> {
    Ok(ProcessMatcher::new(condition)?.is_satisfied(facts))
}
