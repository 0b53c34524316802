//! Ordered fallback discovery.
//!
//! A [`DiscoveryChain`] is a list of named probes tried in order. The first
//! probe that produces a value wins; a probe that returns an error aborts
//! the chain. When every probe comes up empty the chain reports each source
//! it tried.

use crate::core::error::{BuildError, BuildResult};
use crate::toolchain::system::SystemView;

type ProbeFn<'a, T> = Box<dyn Fn(&dyn SystemView) -> BuildResult<Option<T>> + 'a>;

struct Probe<'a, T> {
    source: String,
    run: ProbeFn<'a, T>,
}

/// A value found by a chain, with the source that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered<T> {
    pub source: String,
    pub value: T,
}

/// An ordered list of discovery probes for one dependency.
pub struct DiscoveryChain<'a, T> {
    dependency: String,
    probes: Vec<Probe<'a, T>>,
    help: Vec<String>,
}

impl<'a, T> DiscoveryChain<'a, T> {
    /// Start an empty chain for the named dependency.
    pub fn new(dependency: impl Into<String>) -> Self {
        DiscoveryChain {
            dependency: dependency.into(),
            probes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Append a probe. `source` describes where it looks.
    pub fn probe<F>(mut self, source: impl Into<String>, run: F) -> Self
    where
        F: Fn(&dyn SystemView) -> BuildResult<Option<T>> + 'a,
    {
        self.probes.push(Probe {
            source: source.into(),
            run: Box::new(run),
        });
        self
    }

    /// Append a hint on how to supply the dependency explicitly.
    pub fn help(mut self, hint: impl Into<String>) -> Self {
        self.help.push(hint.into());
        self
    }

    pub fn dependency(&self) -> &str {
        &self.dependency
    }

    /// Probe sources in the order they are tried.
    pub fn sources(&self) -> Vec<&str> {
        self.probes.iter().map(|p| p.source.as_str()).collect()
    }

    /// Run the probes in order and return the first hit.
    pub fn find(&self, sys: &dyn SystemView) -> BuildResult<Option<Discovered<T>>> {
        for probe in &self.probes {
            if let Some(value) = (probe.run)(sys)? {
                tracing::debug!("Found {} via {}", self.dependency, probe.source);
                return Ok(Some(Discovered {
                    source: probe.source.clone(),
                    value,
                }));
            }
            tracing::debug!("{}: nothing at {}", self.dependency, probe.source);
        }
        Ok(None)
    }

    /// Like [`find`](Self::find), but an exhausted chain is an error.
    pub fn resolve(&self, sys: &dyn SystemView) -> BuildResult<T> {
        match self.find(sys)? {
            Some(found) => Ok(found.value),
            None => Err(self.not_found()),
        }
    }

    /// The error reported when every source came up empty.
    pub fn not_found(&self) -> BuildError {
        BuildError::DependencyNotFound {
            dependency: self.dependency.clone(),
            tried: self.probes.iter().map(|p| p.source.clone()).collect(),
            help: self.help.clone(),
        }
    }
}
