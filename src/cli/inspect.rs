//! Handler for the `inspect` command.

use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::{output, Cli, InspectArgs};
use crate::domain::{AssociationRule, Item};
use crate::error::Result;
use crate::persistence::load_snapshot;

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "If")]
    antecedent: String,
    #[tabled(rename = "Then")]
    consequent: String,
    #[tabled(rename = "Support")]
    support: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "Lift")]
    lift: String,
}

impl RuleRow {
    fn new(rank: usize, rule: &AssociationRule) -> Self {
        Self {
            rank,
            antecedent: join(&rule.antecedent),
            consequent: join(&rule.consequent),
            support: format!("{:.4}", rule.support),
            confidence: format!("{:.3}", rule.confidence),
            lift: format!("{:.2}", rule.lift),
        }
    }
}

fn join(items: &[Item]) -> String {
    items
        .iter()
        .map(Item::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Print snapshot metadata and the top rules.
#[allow(clippy::result_large_err)]
pub fn execute(cli: &Cli, args: &InspectArgs) -> Result<()> {
    let config = cli.load_config()?;
    let path = args
        .model
        .clone()
        .unwrap_or_else(|| config.serving.model_path.clone());
    let snapshot = load_snapshot(&path)?;
    let metadata = snapshot.metadata();
    let top = &snapshot.rules()[..args.top.min(snapshot.rules().len())];

    if output::is_json() {
        output::json_output(json!({
            "path": path.display().to_string(),
            "metadata": metadata,
            "itemsets": snapshot.itemsets().len(),
            "rules": snapshot.rules().len(),
            "top_rules": top,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("snapshot", path.display());
    output::field("generated", metadata.model_date());
    output::field("transactions", metadata.transaction_count);
    output::field("min support", metadata.min_support);
    output::field("min confidence", metadata.min_confidence);
    output::field(
        "item filter",
        metadata.item_filter.as_deref().unwrap_or("unknown"),
    );
    if let Some(size) = metadata.item_filter_size {
        output::field("items kept", size);
    }
    output::field("itemsets", snapshot.itemsets().len());
    output::field("rules", snapshot.rules().len());

    if top.is_empty() {
        output::note("snapshot has no rules");
        return Ok(());
    }

    output::section(&format!("Top {} rules", top.len()));
    println!();
    let rows: Vec<RuleRow> = top
        .iter()
        .enumerate()
        .map(|(i, rule)| RuleRow::new(i + 1, rule))
        .collect();
    output::table(Table::new(rows).with(Style::rounded()));
    println!();
    output::note(&format!(
        "Query with {}",
        output::muted("mixtape recommend <track> [track...]")
    ));
    Ok(())
}
