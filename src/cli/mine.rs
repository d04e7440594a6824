//! Handler for the `mine` command.

use indicatif::ProgressBar;

use crate::cli::{output, Cli, MineArgs};
use crate::config::{Config, MiningConfig};
use crate::error::{ConfigError, Result};
use crate::ingest::{CsvSource, LogProgress, ProgressObserver, ScanStats, Stage};
use crate::persistence::save_snapshot;
use crate::pipeline::IngestReport;

impl MineArgs {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut MiningConfig) {
        if !self.inputs.is_empty() {
            config.inputs = self.inputs.clone();
        }
        if let Some(ref col) = self.pid_col {
            config.transaction_field = col.clone();
        }
        if let Some(ref col) = self.item_col {
            config.item_field = col.clone();
        }
        if let Some(min_sup) = self.min_sup {
            config.min_support = min_sup;
        }
        if let Some(min_conf) = self.min_conf {
            config.min_confidence = min_conf;
        }
        if self.max_rows.is_some() {
            config.max_rows = self.max_rows;
        }
        if self.sample_frac.is_some() {
            config.sample_frac = self.sample_frac;
        }
        if let Some(len) = self.max_tx_len {
            config.max_transaction_len = len;
        }
        if self.min_support_abs.is_some() {
            config.min_support_abs = self.min_support_abs;
        }
        if self.top_k_items.is_some() {
            config.top_k_items = self.top_k_items;
        }
        if self.no_item_filter {
            config.item_filter = false;
        }
        if let Some(interval) = self.progress_interval {
            config.progress_interval = interval;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(ref out) = self.out {
            config.output = out.clone();
        }
    }
}

/// Execute the mine command.
#[allow(clippy::result_large_err)]
pub fn execute(cli: &Cli, args: &MineArgs) -> Result<()> {
    let mut config: Config = cli.load_config()?;
    args.apply(&mut config.mining);
    config.validate()?;
    config.logging.init();

    let mining = &config.mining;
    if mining.inputs.is_empty() {
        return Err(ConfigError::MissingField {
            field: "mining.inputs",
        }
        .into());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    for input in &mining.inputs {
        output::field("input", input.display());
    }
    output::field("columns", format!("{} / {}", mining.transaction_field, mining.item_field));
    output::field(
        "thresholds",
        format!("support {} / confidence {}", mining.min_support, mining.min_confidence),
    );

    let source = CsvSource::new(&mining.inputs);
    let job = mining.job();
    let mut progress = SpinnerProgress::new();

    if args.dry_run {
        let prepared = job.prepare(&source, &mut progress)?;
        print_report(&prepared.report);
        output::note("dry run: nothing mined, no snapshot written");
        return Ok(());
    }

    let run = match job.run(&source, &mut progress) {
        Ok(run) => {
            progress.succeed(&format!(
                "{} itemsets, {} rules",
                run.snapshot.itemsets().len(),
                run.snapshot.rules().len()
            ));
            run
        }
        Err(e) => {
            progress.fail(&e.to_string());
            return Err(e);
        }
    };
    print_report(&run.report);

    save_snapshot(&run.snapshot, &mining.output)?;

    output::section("Snapshot");
    output::field("transactions", run.snapshot.metadata().transaction_count);
    output::field("itemsets", run.snapshot.itemsets().len());
    output::field("rules", run.snapshot.rules().len());
    output::success(&format!(
        "wrote {}",
        output::highlight(mining.output.display())
    ));
    Ok(())
}

fn print_report(report: &IngestReport) {
    output::section("Input");
    output::field("rows", report.counting.examined);
    output::field("rows used", report.counting.accepted);
    output::field("rows skipped", report.counting.skipped);
    if report.counting.sampled_out > 0 {
        output::field("sampled out", report.counting.sampled_out);
    }
    output::field("distinct items", report.distinct_items);
    if let Some(transactions) = report.transaction_count {
        output::field("playlists", transactions);
    }
    output::field("item filter", &report.policy);
    output::field(
        "items kept",
        report
            .allowed_items
            .map_or_else(|| "all".to_string(), |n| n.to_string()),
    );
    if !report.top_items.is_empty() {
        output::section("Most frequent items");
        for (item, count) in &report.top_items {
            output::field(&count.to_string(), item);
        }
    }
}

/// One spinner per pass, then one for the mining step. Spinners are hidden
/// in JSON mode, so progress goes to the log there instead.
struct SpinnerProgress {
    bar: Option<ProgressBar>,
    log: Option<LogProgress>,
}

impl SpinnerProgress {
    fn new() -> Self {
        Self {
            bar: None,
            log: output::is_json().then_some(LogProgress),
        }
    }

    fn bar(&mut self, stage: Stage) -> &ProgressBar {
        self.bar
            .get_or_insert_with(|| output::spinner(&format!("{}...", stage.label())))
    }

    fn succeed(&mut self, message: &str) {
        if let Some(bar) = self.bar.take() {
            output::spinner_success(&bar, message);
        }
    }

    fn fail(&mut self, message: &str) {
        if let Some(bar) = self.bar.take() {
            output::spinner_fail(&bar, message);
        } else {
            output::error(message);
        }
    }
}

impl ProgressObserver for SpinnerProgress {
    fn on_progress(&mut self, stage: Stage, rows_examined: u64) {
        if let Some(log) = self.log.as_mut() {
            log.on_progress(stage, rows_examined);
        }
        self.bar(stage)
            .set_message(format!("{}: {} rows", stage.label(), rows_examined));
    }

    fn on_finish(&mut self, stage: Stage, stats: &ScanStats) {
        if let Some(log) = self.log.as_mut() {
            log.on_finish(stage, stats);
        }
        self.bar(stage);
        self.succeed(&format!(
            "{}: {} rows, {} used",
            stage.label(),
            stats.examined,
            stats.accepted
        ));
        if stage == Stage::Building {
            self.bar = Some(output::spinner("mining frequent itemsets..."));
        }
    }
}
