use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use super::oid::ObjectId;
use crate::error::{CollectorError, Result};

/// Value of a single variable binding, detached from the session buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Integer(i64),
    Unsigned(u64),
    Text(String),
}

impl RawValue {
    /// Integer view; numeric strings are accepted because some agents
    /// render gauges as octet strings.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawValue::Integer(v) => Some(*v),
            RawValue::Unsigned(v) => i64::try_from(*v).ok(),
            RawValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Integer(v) => write!(f, "{}", v),
            RawValue::Unsigned(v) => write!(f, "{}", v),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

/// Answer to one GET-NEXT request.
#[derive(Debug, Clone, PartialEq)]
pub enum NextBinding {
    Binding(ObjectId, RawValue),
    /// endOfMibView: the agent has nothing after the requested identifier.
    EndOfView,
}

/// A management agent able to answer GET-NEXT requests.
#[async_trait]
pub trait Agent: Send {
    /// Returns the first binding lexicographically after `oid`.
    ///
    /// # Errors
    ///
    /// [`CollectorError::TransportFailure`] when no decodable answer arrives,
    /// [`CollectorError::ProtocolFailure`] when the agent reports a non-zero
    /// error status.
    async fn get_next(&mut self, oid: &ObjectId) -> Result<NextBinding>;
}

/// Ordered bindings of one walk; identifiers are unique and strictly increasing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WalkResult {
    entries: Vec<(ObjectId, RawValue)>,
}

impl WalkResult {
    pub fn get(&self, oid: &ObjectId) -> Option<&RawValue> {
        self.entries
            .binary_search_by(|(probe, _)| probe.cmp(oid))
            .ok()
            .map(|pos| &self.entries[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObjectId, &RawValue)> {
        self.entries.iter().map(|(oid, value)| (oid, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Appends a binding, keeping the strictly-increasing invariant.
    pub(crate) fn push(&mut self, oid: ObjectId, value: RawValue) -> bool {
        if let Some((last, _)) = self.entries.last() {
            if &oid <= last {
                return false;
            }
        }
        self.entries.push((oid, value));
        true
    }
}

impl FromIterator<(ObjectId, RawValue)> for WalkResult {
    /// Builds a walk result from bindings in any order; later duplicates win.
    fn from_iter<I: IntoIterator<Item = (ObjectId, RawValue)>>(iter: I) -> Self {
        let mut entries: Vec<(ObjectId, RawValue)> = iter.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.dedup_by(|later, earlier| {
            if later.0 == earlier.0 {
                earlier.1 = later.1.clone();
                true
            } else {
                false
            }
        });
        Self { entries }
    }
}

/// Lazy GET-NEXT traversal of the subtree under `base`.
///
/// Items come out in strictly increasing identifier order. The walk ends
/// cleanly when the agent leaves the subtree or reports endOfMibView, and
/// ends for good after the first error. It cannot be restarted.
pub struct Walk<'a> {
    agent: &'a mut dyn Agent,
    base: ObjectId,
    cursor: ObjectId,
    finished: bool,
}

impl<'a> Walk<'a> {
    pub fn new(agent: &'a mut dyn Agent, base: ObjectId) -> Self {
        Self {
            agent,
            cursor: base.clone(),
            base,
            finished: false,
        }
    }

    pub async fn next(&mut self) -> Option<Result<(ObjectId, RawValue)>> {
        if self.finished {
            return None;
        }

        let binding = match self.agent.get_next(&self.cursor).await {
            Ok(binding) => binding,
            Err(e) => {
                self.finished = true;
                return Some(Err(e));
            }
        };

        match binding {
            NextBinding::EndOfView => {
                self.finished = true;
                None
            }
            NextBinding::Binding(oid, _) if !oid.is_descendant_of(&self.base) => {
                self.finished = true;
                None
            }
            NextBinding::Binding(oid, _) if oid <= self.cursor => {
                self.finished = true;
                Some(Err(CollectorError::ProtocolFailure {
                    status: "nonIncreasingOid".to_string(),
                    oid: oid.to_string(),
                }))
            }
            NextBinding::Binding(oid, value) => {
                self.cursor = oid.clone();
                Some(Ok((oid, value)))
            }
        }
    }

    /// Drains the walk into a [`WalkResult`].
    pub async fn collect(mut self) -> Result<WalkResult> {
        let mut result = WalkResult::default();
        while let Some(item) = self.next().await {
            let (oid, value) = item?;
            result.push(oid, value);
        }
        Ok(result)
    }
}

/// Walks the subtree under `base` and collects every binding.
pub async fn walk(agent: &mut dyn Agent, base: &ObjectId) -> Result<WalkResult> {
    let result = Walk::new(agent, base.clone()).collect().await?;
    tracing::debug!(base = %base, bindings = result.len(), "walk finished");
    Ok(result)
}
