use anyhow::{Context, Result};
use serde::{Serialize, Serializer};
use snmp2::Oid;
use std::fmt;
use std::str::FromStr;

/// Dotted-numeric object identifier.
///
/// Ordering is arc-by-arc numeric, which is the order an agent answers
/// GET-NEXT requests in (`1.3.6.1.2` < `1.3.6.1.10`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(Vec<u64>);

impl ObjectId {
    pub fn from_arcs(arcs: &[u64]) -> Self {
        Self(arcs.to_vec())
    }

    /// True when `self` lies strictly below `base` in the OID tree.
    pub fn is_descendant_of(&self, base: &ObjectId) -> bool {
        self.0.len() > base.0.len() && self.0.starts_with(&base.0)
    }

    /// Arcs remaining after `prefix`, as a new identifier (table row index).
    pub fn suffix_after(&self, prefix: &ObjectId) -> Option<ObjectId> {
        if self.is_descendant_of(prefix) {
            Some(ObjectId(self.0[prefix.0.len()..].to_vec()))
        } else {
            None
        }
    }

    pub fn child(&self, arc: u64) -> ObjectId {
        let mut arcs = self.0.clone();
        arcs.push(arc);
        ObjectId(arcs)
    }

    pub fn to_snmp(&self) -> Result<Oid<'static>> {
        Oid::from(&self.0).map_err(|e| anyhow::anyhow!("cannot encode OID {}: {:?}", self, e))
    }
}

/// Parses an OID string such as `1.3.6.1.4.1.2021.4` (a leading dot is accepted).
pub fn parse_oid(s: &str) -> Result<ObjectId> {
    let parts: Result<Vec<u64>, _> = s
        .trim()
        .trim_start_matches('.')
        .split('.')
        .map(|p| p.parse::<u64>())
        .collect();

    let parts = parts.context(format!("invalid OID: {}", s))?;
    if parts.len() < 2 {
        anyhow::bail!("invalid OID: {} (needs at least two arcs)", s);
    }
    Ok(ObjectId(parts))
}

impl FromStr for ObjectId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_oid(s)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_dotted_form() {
        let oid = parse_oid(".1.3.6.1.4.1.2021.4.5.0").unwrap();
        assert_eq!(oid.to_string(), "1.3.6.1.4.1.2021.4.5.0");
    }

    #[test]
    fn rejects_non_numeric_and_empty_arcs() {
        assert!(parse_oid("1.3.six.1").is_err());
        assert!(parse_oid("1..3").is_err());
        assert!(parse_oid("").is_err());
    }

    #[test]
    fn orders_numerically_per_arc() {
        let a = parse_oid("1.3.6.1.2").unwrap();
        let b = parse_oid("1.3.6.1.10").unwrap();
        let c = parse_oid("1.3.6.1.2.1").unwrap();
        assert!(a < b);
        assert!(a < c);
        assert!(c < b);
    }

    #[test]
    fn descendant_check_excludes_self_and_siblings() {
        let base = parse_oid("1.3.6.1.2.1.25.2.3").unwrap();
        assert!(parse_oid("1.3.6.1.2.1.25.2.3.1.3.1").unwrap().is_descendant_of(&base));
        assert!(!base.is_descendant_of(&base));
        assert!(!parse_oid("1.3.6.1.2.1.25.2.4").unwrap().is_descendant_of(&base));
        assert!(!parse_oid("1.3.6.1.2.1.25.2.30").unwrap().is_descendant_of(&base));
    }

    #[test]
    fn suffix_after_prefix_is_row_index() {
        let prefix = parse_oid("1.3.6.1.2.1.25.2.3.1.3").unwrap();
        let oid = parse_oid("1.3.6.1.2.1.25.2.3.1.3.31").unwrap();
        assert_eq!(oid.suffix_after(&prefix).unwrap().to_string(), "31");
    }
}
