//! FP-Growth driven by an explicit work stack.

use super::fptree::{FpTree, Rank};
use crate::error::MiningError;

/// Largest itemset whose antecedents can be enumerated with a `u64` mask.
pub(crate) const MAX_ITEMSET_LEN: usize = 63;

/// A frequent combination of ranks and its absolute count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Pattern {
    pub ranks: Vec<Rank>,
    pub count: u64,
}

/// Enumerate every itemset of `tree` whose count reaches `min_count`.
///
/// Each stack entry is a conditional tree plus the suffix it is conditioned
/// on. Items are expanded least frequent first, which keeps conditional trees
/// small. A single-path tree is resolved directly into all its subsets.
///
/// Fails before enumerating anything longer than [`MAX_ITEMSET_LEN`].
pub(crate) fn grow(tree: FpTree, min_count: u64) -> Result<Vec<Pattern>, MiningError> {
    let mut patterns = Vec::new();
    let mut stack: Vec<(FpTree, Vec<Rank>)> = vec![(tree, Vec::new())];

    while let Some((tree, suffix)) = stack.pop() {
        if tree.is_empty() {
            continue;
        }
        if tree.is_single_path() {
            emit_path_subsets(&tree.single_path(), &suffix, min_count, &mut patterns)?;
            continue;
        }
        for (rank, count) in tree.items_by_ascending_support() {
            let mut ranks = suffix.clone();
            ranks.push(rank);
            check_len(ranks.len())?;
            patterns.push(Pattern {
                ranks: ranks.clone(),
                count,
            });

            let conditional = tree.conditional(rank, min_count);
            if !conditional.is_empty() {
                stack.push((conditional, ranks));
            }
        }
    }

    Ok(patterns)
}

fn check_len(len: usize) -> Result<(), MiningError> {
    if len > MAX_ITEMSET_LEN {
        return Err(MiningError::ItemsetTooLarge {
            len,
            max: MAX_ITEMSET_LEN,
        });
    }
    Ok(())
}

/// Every non-empty subset of a single path, joined with `suffix`.
///
/// Counts never increase walking down a path, so a subset's count is the
/// count of its deepest node.
fn emit_path_subsets(
    path: &[(Rank, u64)],
    suffix: &[Rank],
    min_count: u64,
    patterns: &mut Vec<Pattern>,
) -> Result<(), MiningError> {
    let frequent = path.iter().take_while(|(_, count)| *count >= min_count).count();
    check_len(frequent + suffix.len())?;

    let mut combos: Vec<(Vec<Rank>, u64)> = Vec::new();
    for &(rank, count) in path {
        if count < min_count {
            break;
        }
        let existing = combos.len();
        for i in 0..existing {
            let mut ranks = combos[i].0.clone();
            ranks.push(rank);
            combos.push((ranks, count));
        }
        combos.push((vec![rank], count));
    }

    patterns.extend(combos.into_iter().map(|(mut ranks, count)| {
        ranks.extend_from_slice(suffix);
        Pattern { ranks, count }
    }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut patterns: Vec<Pattern>) -> Vec<(Vec<Rank>, u64)> {
        let mut out: Vec<(Vec<Rank>, u64)> = patterns
            .drain(..)
            .map(|mut p| {
                p.ranks.sort_unstable();
                (p.ranks, p.count)
            })
            .collect();
        out.sort();
        out
    }

    #[test]
    fn single_path_yields_all_subsets() {
        let mut tree = FpTree::new();
        tree.insert(&[0, 1, 2], 2);
        let patterns = sorted(grow(tree, 1).unwrap());
        assert_eq!(patterns.len(), 7);
        assert!(patterns.contains(&(vec![0, 1, 2], 2)));
    }

    #[test]
    fn branching_tree_matches_brute_force() {
        // transactions over ranks, min_count 2
        let txs: Vec<Vec<Rank>> = vec![
            vec![0, 1],
            vec![0, 1, 2],
            vec![0, 1],
            vec![0, 2],
            vec![1, 2],
        ];
        let mut tree = FpTree::new();
        for tx in &txs {
            tree.insert(tx, 1);
        }
        let patterns = sorted(grow(tree, 2).unwrap());

        let mut expected = Vec::new();
        for mask in 1u32..8 {
            let set: Vec<Rank> = (0..3).filter(|r| mask & (1 << r) != 0).collect();
            let count = txs
                .iter()
                .filter(|tx| set.iter().all(|r| tx.contains(r)))
                .count() as u64;
            if count >= 2 {
                expected.push((set, count));
            }
        }
        expected.sort();
        assert_eq!(patterns, expected);
    }

    #[test]
    fn empty_tree_yields_nothing() {
        assert!(grow(FpTree::new(), 1).unwrap().is_empty());
    }

    #[test]
    fn oversized_single_path_fails_before_enumerating() {
        let mut tree = FpTree::new();
        let ranks: Vec<Rank> = (0..64).collect();
        tree.insert(&ranks, 3);
        let err = grow(tree, 2).unwrap_err();
        assert_eq!(err, MiningError::ItemsetTooLarge { len: 64, max: 63 });
    }

    #[test]
    fn infrequent_tail_does_not_count_toward_the_limit() {
        let mut tree = FpTree::new();
        let ranks: Vec<Rank> = (0..70).collect();
        tree.insert(&ranks[..3], 2);
        tree.insert(&ranks, 1);
        let patterns = grow(tree, 3).unwrap();
        assert_eq!(patterns.len(), 7);
    }
}
