//! Configuration options of the verifier
//!
//! This module ties together the tunable knobs of a verification run. The
//! options can be set through a configuration file or through environment
//! variables with the `ORBIT` prefix; command line flags override both.

use serde::Deserialize;

/// Options of a verification run
///
/// This type implements `serde::Deserialize` to easily parse the options out
/// of structured configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OrbitConfig {
    /// Effort the numeric kernel spends on every three-valued predicate
    effort: Option<u32>,
    /// Number of abstraction cells after which the verifier gives up
    max_nodes: Option<usize>,
}

impl OrbitConfig {
    /// Effort for the run, falling back to the kernel default
    pub fn effort(&self) -> u32 {
        self.effort.unwrap_or(1)
    }

    /// Cell budget for the run
    pub fn max_nodes(&self) -> usize {
        self.max_nodes.unwrap_or(DEFAULT_MAX_NODES)
    }

    /// Override the effort
    pub fn set_effort(&mut self, effort: u32) {
        self.effort = Some(effort);
    }

    /// Override the cell budget
    pub fn set_max_nodes(&mut self, max_nodes: usize) {
        self.max_nodes = Some(max_nodes);
    }
}

/// Cell budget used when neither configuration nor flags specify one
pub const DEFAULT_MAX_NODES: usize = 1024;
