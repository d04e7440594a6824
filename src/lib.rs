//! Mixtape - playlist co-occurrence mining and rule-based track recommendations.
//!
//! Playlists are mined for tracks that tend to appear together. The mined
//! association rules are served as "given these tracks, what else" lookups
//! that pick up a newly mined snapshot without restarting.
//!
//! # Pipeline
//!
//! 1. [`ingest`] streams `(playlist, track)` rows twice: once to count track
//!    occurrences and filter rare tracks, once to build deduplicated playlists
//! 2. [`mining`] runs FP-Growth over the playlists and derives rules with
//!    confidence and lift
//! 3. [`persistence`] writes the resulting [`domain::ModelSnapshot`] atomically
//! 4. [`serving`] indexes the rules, answers queries, and hot-swaps the index
//!    when the snapshot file changes
//!
//! [`pipeline::MiningJob`] ties steps 1 and 2 together.
//!
//! # Modules
//!
//! - [`config`] - TOML configuration with environment overrides
//! - [`domain`] - Items, transactions, itemsets, rules and snapshots
//! - [`error`] - Error types for the crate
//! - [`cli`] - Command handlers for the `mixtape` binary
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mixtape::ingest::{MemorySource, NoProgress, SupportPolicy};
//! use mixtape::pipeline::MiningJob;
//! use mixtape::mining::MiningParams;
//! use mixtape::serving::RuleIndex;
//!
//! let rows = MemorySource::from_pairs([
//!     ("p1", "A"), ("p1", "B"),
//!     ("p2", "A"), ("p2", "B"), ("p2", "C"),
//!     ("p3", "A"), ("p3", "B"),
//!     ("p4", "B"), ("p4", "C"),
//! ]);
//! let job = MiningJob {
//!     policy: SupportPolicy::NoFilter,
//!     params: MiningParams::new(0.5, 0.5),
//!     ..MiningJob::default()
//! };
//! let run = job.run(&rows, &mut NoProgress).unwrap();
//!
//! let index = RuleIndex::build(Arc::new(run.snapshot));
//! assert_eq!(index.recommend(&["A"], 10)[0].as_str(), "B");
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod mining;
pub mod persistence;
pub mod pipeline;
pub mod serving;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
