//! Table rendering for CLI output

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::feed::Granularity;
use crate::scanner::{ScanReport, ScanResult};
use crate::streak::{Analysis, Direction, HistoryPolicy, StreakDistribution};

const RULE: &str = "══════════════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "──────────────────────────────────────────────────────────────────────";

/// Histogram rows shown per direction
const HISTOGRAM_ROWS: usize = 10;

/// Format a single-instrument analysis
pub fn analysis_table(symbol: &str, granularity: Granularity, analysis: &Analysis) -> String {
    let current = analysis.current;
    let history = match analysis.policy {
        HistoryPolicy::ExcludeCurrent => "completed streaks only",
        HistoryPolicy::IncludeCurrent => "all streaks, current included",
    };

    let mut out = format!(
        r#"
{RULE}
  {symbol}  streak odds ({granularity}, {count} closes)
{RULE}
Window:           {start} to {end}
Last close:       {last:.2} ({change})
Previous close:   {previous:.2}
History:          {history}

CURRENT STREAK
{THIN_RULE}
{current}
{direction} streaks reaching {length}: {reached}, extended: {extended}
Shorter than current: {shorter}   Longer: {longer}
"#,
        count = analysis.price_count,
        start = analysis.window_start.format("%Y-%m-%d %H:%M"),
        end = analysis.window_end.format("%Y-%m-%d %H:%M"),
        last = analysis.last_close,
        change = signed_pct(analysis.last_change_pct),
        previous = analysis.previous_close,
        direction = capitalize(current.direction),
        length = current.length,
        reached = analysis.extension.opportunities,
        extended = analysis.extension.extended,
        shorter = analysis.rarity.shorter,
        longer = analysis.rarity.longer,
    );

    if analysis.lacks_history() {
        out.push_str(&format!(
            "No earlier {} streak reached length {}, odds are undefined\n",
            current.direction, current.length
        ));
    }

    let if_up = analysis.after_next.if_next_up;
    let if_down = analysis.after_next.if_next_down;
    out.push_str(&format!(
        r#"
NEXT PERIOD
{THIN_RULE}
Up:               {next_up}
Down:             {next_down}

PERIOD AFTER NEXT
{THIN_RULE}
If next is up:    up {uu:>6}   down {ud:>6}
If next is down:  up {du:>6}   down {dd:>6}

STREAK STATISTICS
{THIN_RULE}
                  count  longest     mean
"#,
        next_up = analysis.next.up,
        next_down = analysis.next.down,
        uu = if_up.up.to_string(),
        ud = if_up.down.to_string(),
        du = if_down.up.to_string(),
        dd = if_down.down.to_string(),
    ));

    for direction in Direction::ALL {
        let summary = analysis.summary(direction);
        out.push_str(&format!(
            "{:<18}{:>5}  {:>7}  {:>7}\n",
            capitalize(direction),
            summary.count,
            summary
                .longest
                .map_or_else(|| "-".to_string(), |l| l.to_string()),
            summary
                .mean_length
                .map_or_else(|| "-".to_string(), |m| format!("{:.2}", m)),
        ));
    }

    for direction in Direction::ALL {
        out.push_str(&histogram(analysis.distribution(direction)));
    }
    out.push_str(RULE);
    out.push('\n');
    out
}

fn histogram(distribution: &StreakDistribution) -> String {
    let mut out = format!(
        "\n{} STREAK LENGTHS\n{THIN_RULE}\n",
        distribution.direction().to_string().to_uppercase()
    );
    let buckets = distribution.histogram();
    if buckets.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }
    for bucket in buckets.iter().take(HISTOGRAM_ROWS) {
        out.push_str(&format!(
            "  {:>3}  {:>6}  {:>6}\n",
            bucket.length,
            bucket.count,
            bucket.share.to_string()
        ));
    }
    if buckets.len() > HISTOGRAM_ROWS {
        out.push_str(&format!(
            "  ... {} longer lengths not shown\n",
            buckets.len() - HISTOGRAM_ROWS
        ));
    }
    out
}

/// Format a scan report; `top` limits the ranked view
pub fn scan_table(report: &ScanReport, top: usize) -> String {
    let mut out = format!(
        r#"
{RULE}
  SCAN RESULTS  mode: {mode}  min probability: {threshold}%
{RULE}
Scanned: {total}   Retained: {retained}   Filtered: {filtered}   Failed: {failed}   Skipped: {skipped}
"#,
        mode = report.mode,
        threshold = report.min_probability_pct,
        total = report.total,
        retained = report.results.len(),
        filtered = report.filtered.len(),
        failed = report.failure_count(),
        skipped = report.skipped,
    );

    if report.was_stopped() {
        out.push_str("Scan stopped early, remaining instruments were skipped\n");
    }

    out.push_str(&format!(
        "\nBY MARKET CAP\n{THIN_RULE}\n{}\n",
        result_header()
    ));
    if report.results.is_empty() {
        out.push_str("  (no instrument cleared the threshold)\n");
    }
    for result in &report.results {
        out.push_str(&result_row(result));
    }

    if top > 0 && !report.results.is_empty() {
        out.push_str(&format!(
            "\nTOP {} BY PROBABILITY\n{THIN_RULE}\n{}\n",
            top,
            result_header()
        ));
        for result in report.top(top) {
            out.push_str(&result_row(result));
        }
    }

    if !report.failures.is_empty() {
        out.push_str(&format!("\nFAILURES\n{THIN_RULE}\n"));
        for failure in &report.failures {
            out.push_str(&format!("{:<10}{}\n", failure.symbol, failure.reason));
        }
    }

    out.push_str(RULE);
    out.push('\n');
    out
}

fn result_header() -> String {
    format!(
        "{:<10}{:>12}{:>10}{:>10}{:>10}{:>11}{:>12}",
        "Symbol", "Last", "Streak", "Next Up", "Next Down", "Qualified", "Market Cap"
    )
}

fn result_row(result: &ScanResult) -> String {
    format!(
        "{:<10}{:>12}{:>10}{:>10}{:>10}{:>11}{:>12}\n",
        result.symbol,
        format!("{:.2}", result.last_price),
        format!("{} {}", result.current.direction, result.current.length),
        result.next.up.to_string(),
        result.next.down.to_string(),
        result.qualified.to_string(),
        market_cap(result.market_cap),
    )
}

/// Human-readable market cap, e.g. `$2.95T`
pub fn market_cap(cap: Option<Decimal>) -> String {
    let Some(cap) = cap else {
        return "n/a".to_string();
    };
    let units = [
        (dec!(1000000000000), "T"),
        (dec!(1000000000), "B"),
        (dec!(1000000), "M"),
    ];
    for (scale, suffix) in units {
        if cap >= scale {
            return format!("${:.2}{}", cap / scale, suffix);
        }
    }
    format!("${:.0}", cap)
}

fn signed_pct(pct: Option<Decimal>) -> String {
    match pct {
        Some(p) if p.is_sign_negative() => format!("{:.2}%", p),
        Some(p) => format!("+{:.2}%", p),
        None => "n/a".to_string(),
    }
}

fn capitalize(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "Up",
        Direction::Down => "Down",
    }
}
