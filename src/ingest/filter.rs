//! Support-based item filtering between the two passes.

use std::collections::HashSet;
use std::fmt;

use super::counter::ItemCount;
use crate::domain::Item;
use crate::error::ConfigError;

/// Which items survive into the transaction pass. Exactly one applies.
#[derive(Debug, Clone, PartialEq)]
pub enum SupportPolicy {
    /// Keep the `k` most frequent items, ties broken by identifier.
    TopK(usize),
    /// Keep items occurring at least `min_count` times.
    AbsoluteSupport(u64),
    /// Keep items at or above `max(1, floor(ratio * transactions))`.
    RatioSupport(f64),
    /// Keep everything.
    NoFilter,
}

impl SupportPolicy {
    /// Whether applying this policy needs a transaction count.
    pub fn needs_transaction_count(&self) -> bool {
        matches!(self, SupportPolicy::RatioSupport(_))
    }
}

impl fmt::Display for SupportPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupportPolicy::TopK(k) => write!(f, "top_k={k}"),
            SupportPolicy::AbsoluteSupport(min) => write!(f, "min_count={min}"),
            SupportPolicy::RatioSupport(ratio) => write!(f, "min_ratio={ratio}"),
            SupportPolicy::NoFilter => write!(f, "none"),
        }
    }
}

/// Items retained after filtering; `keep_all` admits every item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowSet(Option<HashSet<Item>>);

impl AllowSet {
    pub fn keep_all() -> Self {
        Self(None)
    }

    pub fn only(items: impl IntoIterator<Item = Item>) -> Self {
        Self(Some(items.into_iter().collect()))
    }

    pub fn allows(&self, item: &str) -> bool {
        self.0.as_ref().map_or(true, |set| set.contains(item))
    }

    pub fn is_keep_all(&self) -> bool {
        self.0.is_none()
    }

    /// Number of retained items, `None` for keep-all.
    pub fn size(&self) -> Option<usize> {
        self.0.as_ref().map(HashSet::len)
    }
}

/// Turn counts into an allow-set under `policy`.
pub fn filter(
    counts: &ItemCount,
    total_transactions_estimate: Option<u64>,
    policy: &SupportPolicy,
) -> Result<AllowSet, ConfigError> {
    match *policy {
        SupportPolicy::NoFilter => Ok(AllowSet::keep_all()),
        SupportPolicy::TopK(k) => {
            if k == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "top_k_items",
                    reason: "must be at least 1".into(),
                });
            }
            let mut ranked: Vec<(&Item, u64)> = counts.iter().collect();
            ranked.sort_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.cmp(b)));
            Ok(AllowSet::only(
                ranked.into_iter().take(k).map(|(item, _)| item.clone()),
            ))
        }
        SupportPolicy::AbsoluteSupport(min_count) => Ok(at_least(counts, min_count)),
        SupportPolicy::RatioSupport(ratio) => {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(ConfigError::InvalidValue {
                    field: "min_support",
                    reason: format!("must be in (0, 1], got {ratio}"),
                });
            }
            let total = total_transactions_estimate.ok_or(ConfigError::MissingField {
                field: "total_transactions_estimate",
            })?;
            let threshold = ((ratio * total as f64).floor() as u64).max(1);
            Ok(at_least(counts, threshold))
        }
    }
}

fn at_least(counts: &ItemCount, threshold: u64) -> AllowSet {
    AllowSet::only(
        counts
            .iter()
            .filter(|(_, count)| *count >= threshold)
            .map(|(item, _)| item.clone()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts() -> ItemCount {
        [("a", 10), ("b", 5), ("c", 5), ("d", 1)]
            .into_iter()
            .map(|(item, count)| (Item::from(item), count))
            .collect()
    }

    #[test]
    fn top_k_breaks_ties_by_identifier() {
        let allow = filter(&counts(), None, &SupportPolicy::TopK(2)).unwrap();
        assert!(allow.allows("a"));
        assert!(allow.allows("b"));
        assert!(!allow.allows("c"));
        assert_eq!(allow.size(), Some(2));
    }

    #[test]
    fn top_k_zero_is_rejected() {
        assert!(filter(&counts(), None, &SupportPolicy::TopK(0)).is_err());
    }

    #[test]
    fn absolute_support_is_inclusive() {
        let allow = filter(&counts(), None, &SupportPolicy::AbsoluteSupport(5)).unwrap();
        assert_eq!(allow.size(), Some(3));
        assert!(!allow.allows("d"));
    }

    #[test]
    fn ratio_support_uses_floor_with_minimum_one() {
        // floor(0.3 * 20) = 6
        let allow = filter(&counts(), Some(20), &SupportPolicy::RatioSupport(0.3)).unwrap();
        assert_eq!(allow.size(), Some(1));

        // floor(0.01 * 20) = 0, raised to 1
        let allow = filter(&counts(), Some(20), &SupportPolicy::RatioSupport(0.01)).unwrap();
        assert_eq!(allow.size(), Some(4));
    }

    #[test]
    fn ratio_support_requires_estimate() {
        let err = filter(&counts(), None, &SupportPolicy::RatioSupport(0.1)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField {
                field: "total_transactions_estimate"
            }
        ));
    }

    #[test]
    fn no_filter_keeps_everything() {
        let allow = filter(&counts(), None, &SupportPolicy::NoFilter).unwrap();
        assert!(allow.is_keep_all());
        assert!(allow.allows("never-seen"));
        assert_eq!(allow.size(), None);
    }
}
