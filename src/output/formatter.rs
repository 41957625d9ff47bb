//! Output formatters for ranking and comparison reports

use crate::config::OutputFormat;
use crate::error::{RankerError, Result};
use crate::output::report::{ComparisonReport, RankingReport};
use crate::ranking::candidate::Candidate;
use crate::ranking::comparison::{ComparisonResult, Winner};
use crate::ranking::dimension::{DimensionKey, Priorities, Priority};
use crate::ranking::thresholds::{EliminationRecord, ThresholdConfig};
use crate::ranking::weights::WeightVector;
use colored::{Color, Colorize};
use std::path::{Path, PathBuf};

pub const CSV_HEADERS: [&str; 9] = [
    "Rank",
    "Name",
    "Email",
    "Match Score",
    "Experience",
    "Skills",
    "Projects",
    "Positions",
    "Education",
];

/// Trait for rendering reports in one output format
pub trait OutputFormatter {
    fn format_ranking(&self, report: &RankingReport) -> Result<String>;
    fn format_comparison(&self, report: &ComparisonReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Terminal output with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Spreadsheet export of the ranked list
pub struct CsvFormatter;

/// Picks a formatter by output format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    csv_formatter: CsvFormatter,
}

fn weights_line(weights: &WeightVector) -> String {
    weights.to_string()
}

fn thresholds_line(thresholds: &ThresholdConfig) -> String {
    if !thresholds.any_enabled() {
        return "none".to_string();
    }
    thresholds
        .enabled()
        .map(|(key, minimum)| format!("{} >= {}%", key.label(), minimum))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Elimination counts with every failing dimension included. `None` when
/// this matches the first-failure breakdown.
fn full_breakdown_line(record: &EliminationRecord) -> Option<String> {
    let full = record.full_breakdown();
    if full == record.breakdown {
        return None;
    }
    Some(
        full.iter()
            .map(|(key, count)| format!("{} {}", key.label(), count))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn wins_line(result: &ComparisonResult, first: &Candidate, second: &Candidate) -> String {
    format!(
        "{} leads in {}, {} in {}, {} tied",
        first.name,
        result.wins(Winner::Candidate1),
        second.name,
        result.wins(Winner::Candidate2),
        result.wins(Winner::Tie)
    )
}

fn critical_line(priorities: &Priorities) -> Option<String> {
    let critical = priorities.critical();
    if critical.is_empty() {
        None
    } else {
        Some(critical.iter().map(|k| k.label()).collect::<Vec<_>>().join(", "))
    }
}

fn winner_name<'a>(winner: Winner, first: &'a Candidate, second: &'a Candidate) -> &'a str {
    match winner {
        Winner::Candidate1 => &first.name,
        Winner::Candidate2 => &second.name,
        Winner::Tie => "Tie",
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: u8) -> String {
        let (badge, color) = match score {
            90..=100 => ("EXCELLENT", Color::Green),
            80..=89 => ("STRONG", Color::BrightGreen),
            70..=79 => ("GOOD", Color::Yellow),
            60..=69 => ("FAIR", Color::BrightYellow),
            50..=59 => ("WEAK", Color::Red),
            _ => ("POOR", Color::BrightRed),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_candidate(&self, candidate: &Candidate, priorities: &Priorities) -> String {
        let mut output = String::new();
        let rank = candidate.rank.map(|r| format!("#{}", r)).unwrap_or_else(|| "-".to_string());
        output.push_str(&format!(
            "{} {} {}% {}\n",
            self.colorize(&rank, Color::Cyan),
            self.colorize(&candidate.name, Color::White),
            candidate.match_score,
            self.format_score_badge(candidate.match_score)
        ));
        if let Some(email) = &candidate.email {
            output.push_str(&format!("   {}\n", self.colorize(email, Color::BrightBlack)));
        }
        if self.detailed {
            let scores: Vec<String> = DimensionKey::ALL
                .iter()
                .map(|&key| {
                    let marker = if priorities[key] == Priority::Critical { "*" } else { "" };
                    format!("{}{} {}%", key.label(), marker, candidate.score(key))
                })
                .collect();
            output.push_str(&format!("   {}\n", scores.join(" | ")));
        }
        if let Some(reason) = &candidate.tie_breaker_reason {
            output.push_str(&format!("   ⚖ {}\n", self.colorize(reason, Color::Yellow)));
        }
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_ranking(&self, report: &RankingReport) -> Result<String> {
        let outcome = &report.outcome;
        let mut output = String::new();

        output.push_str(&self.format_header("CANDIDATE RANKING", 1));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms | Input: {}\n",
            report.metadata.generated_label(),
            report.metadata.processing_time_ms,
            report.metadata.input_name()
        ));
        output.push_str(&format!("Weights: {}\n", weights_line(&outcome.weights)));
        output.push_str(&format!("Thresholds: {}\n", thresholds_line(&outcome.thresholds)));
        if let Some(critical) = critical_line(&outcome.priorities) {
            output.push_str(&format!("Critical: {}\n", self.colorize(&critical, Color::Magenta)));
        }

        let shortlist_title = if outcome.pool.all_shown() {
            format!("All {} candidates", outcome.ranked.len())
        } else {
            format!("Top {}", outcome.pool.shortlist_size)
        };
        output.push_str(&self.format_header(&shortlist_title, 2));
        if outcome.ranked.is_empty() {
            output.push_str(&self.colorize("No candidates passed the thresholds.\n", Color::Red));
        }
        for candidate in outcome.shortlist() {
            output.push_str(&self.format_candidate(candidate, &outcome.priorities));
        }

        if self.detailed && outcome.pool.below_shortlist > 0 {
            output.push_str(&self.format_header("Below the shortlist", 3));
            for candidate in &outcome.ranked[outcome.shortlist().len()..] {
                output.push_str(&self.format_candidate(candidate, &outcome.priorities));
            }
        }

        if outcome.eliminated.count > 0 {
            output.push_str(&self.format_header(
                &format!("Eliminated ({})", outcome.eliminated.count),
                2,
            ));
            for (key, count) in &outcome.eliminated.breakdown {
                output.push_str(&format!("  {}: {}\n", key.label(), count));
            }
            if let Some(full) = full_breakdown_line(&outcome.eliminated) {
                output.push_str(&format!("  Counting every failing dimension: {}\n", full));
            }
            if self.detailed {
                for entry in &outcome.eliminated.candidates {
                    output.push_str(&format!(
                        "  ✗ {} {}\n",
                        self.colorize(&entry.name, Color::Red),
                        self.colorize(&format!("({})", entry.reason), Color::BrightBlack)
                    ));
                }
            }
        }

        if outcome.tie_breaks.count > 0 {
            output.push_str(&self.format_header("Tie-breaks", 2));
            output.push_str(&format!(
                "{} candidate(s) at ranks {}\n",
                outcome.tie_breaks.count,
                outcome
                    .tie_breaks
                    .affected_ranks
                    .iter()
                    .map(|r| r.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        output.push_str(&self.format_header("Pool", 2));
        output.push_str(&format!("{}\n", outcome.pool.explanation));

        if !outcome.warnings.is_empty() {
            output.push_str(&self.format_header("⚠ Warnings", 3));
            for warning in &outcome.warnings {
                output.push_str(&format!("  • {}\n", self.colorize(&warning.to_string(), Color::Yellow)));
            }
        }

        output.push_str(&format!(
            "\n{} Generated by candidate-ranker v{}\n",
            self.colorize("ℹ", Color::Blue),
            report.metadata.tool_version
        ));

        Ok(output)
    }

    fn format_comparison(&self, report: &ComparisonReport) -> Result<String> {
        let outcome = &report.outcome;
        let (first, second) = (&outcome.candidate_1, &outcome.candidate_2);
        let result = &outcome.result;
        let mut output = String::new();

        output.push_str(&self.format_header(
            &format!("COMPARISON: {} vs {}", first.name, second.name),
            1,
        ));
        output.push_str(&format!(
            "Generated: {} | Input: {}\n",
            report.metadata.generated_label(),
            report.metadata.input_name()
        ));

        output.push_str(&self.format_header("Scores", 2));
        output.push_str(&format!(
            "{:<12} {:>12} {:>12}  Winner\n",
            "Dimension",
            truncate(&first.name, 12),
            truncate(&second.name, 12)
        ));
        for key in DimensionKey::ALL {
            let winner = result.dimension_winners[key];
            let winner_label = winner_name(winner, first, second);
            let color = match winner {
                Winner::Tie => Color::BrightBlack,
                _ => Color::Green,
            };
            output.push_str(&format!(
                "{:<12} {:>11}% {:>11}%  {}\n",
                key.label(),
                first.score(key),
                second.score(key),
                self.colorize(winner_label, color)
            ));
        }
        output.push_str(&format!(
            "{:<12} {:>11}% {:>11}%  {}\n",
            "Overall",
            first.match_score,
            second.match_score,
            self.colorize(winner_name(result.overall_winner, first, second), Color::Cyan)
        ));
        output.push_str(&format!("Dimension wins: {}\n", wins_line(result, first, second)));

        output.push_str(&self.format_header("Explanation", 2));
        output.push_str(&format!("{}\n", result.explanation));

        if !result.key_differences.is_empty() {
            output.push_str(&self.format_header("Key differences", 3));
            for difference in &result.key_differences {
                output.push_str(&format!("  • {}\n", difference));
            }
        }

        if !outcome.warnings.is_empty() && self.detailed {
            output.push_str(&self.format_header("⚠ Warnings", 3));
            for warning in &outcome.warnings {
                output.push_str(&format!("  • {}\n", warning));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_ranking(&self, report: &RankingReport) -> Result<String> {
        self.render(report)
    }

    fn format_comparison(&self, report: &ComparisonReport) -> Result<String> {
        self.render(report)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn escape(text: &str) -> String {
        text.replace('|', "\\|")
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_ranking(&self, report: &RankingReport) -> Result<String> {
        let outcome = &report.outcome;
        let mut output = String::new();

        output.push_str("# Candidate Ranking\n\n");
        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Processing Time:** {}ms | **Input:** `{}`\n\n",
                report.metadata.generated_label(),
                report.metadata.processing_time_ms,
                report.metadata.input_name()
            ));
        }

        output.push_str(&format!("**Weights:** {}\n\n", weights_line(&outcome.weights)));
        output.push_str(&format!("**Thresholds:** {}\n\n", thresholds_line(&outcome.thresholds)));
        if let Some(critical) = critical_line(&outcome.priorities) {
            output.push_str(&format!("**Critical dimensions:** {}\n\n", critical));
        }

        output.push_str("## Ranked Candidates\n\n");
        if outcome.ranked.is_empty() {
            output.push_str("_No candidates passed the thresholds._\n\n");
        } else {
            output.push_str("| Rank | Name | Match | Experience | Skills | Projects | Positions | Education |\n");
            output.push_str("|------|------|-------|------------|--------|----------|-----------|-----------|\n");
            for candidate in &outcome.ranked {
                let scores: Vec<String> = DimensionKey::ALL
                    .iter()
                    .map(|&key| format!("{}%", candidate.score(key)))
                    .collect();
                output.push_str(&format!(
                    "| {} | {} | **{}%** | {} |\n",
                    candidate.rank.unwrap_or_default(),
                    Self::escape(&candidate.name),
                    candidate.match_score,
                    scores.join(" | ")
                ));
            }
            output.push('\n');
        }

        if outcome.tie_breaks.count > 0 {
            output.push_str("## Tie-breaks\n\n");
            for entry in &outcome.tie_breaks.candidates {
                output.push_str(&format!(
                    "- **#{}** `{}` ({}%): {}\n",
                    entry.rank, entry.candidate_id, entry.match_score, entry.reason
                ));
            }
            output.push('\n');
        }

        if outcome.eliminated.count > 0 {
            output.push_str(&format!("## Eliminated ({})\n\n", outcome.eliminated.count));
            for entry in &outcome.eliminated.candidates {
                output.push_str(&format!("- {}: {}\n", Self::escape(&entry.name), entry.reason));
            }
            if let Some(full) = full_breakdown_line(&outcome.eliminated) {
                output.push_str(&format!("\n**Counting every failing dimension:** {}\n", full));
            }
            output.push('\n');
        }

        output.push_str("## Pool Summary\n\n");
        output.push_str(&format!("> {}\n\n", outcome.pool.explanation));

        if !outcome.warnings.is_empty() {
            output.push_str("## Warnings\n\n");
            for warning in &outcome.warnings {
                output.push_str(&format!("- {}\n", warning));
            }
            output.push('\n');
        }

        if self.include_metadata {
            output.push_str("---\n\n");
            output.push_str(&format!("*Generated by candidate-ranker v{}*\n", report.metadata.tool_version));
        }

        Ok(output)
    }

    fn format_comparison(&self, report: &ComparisonReport) -> Result<String> {
        let outcome = &report.outcome;
        let (first, second) = (&outcome.candidate_1, &outcome.candidate_2);
        let result = &outcome.result;
        let mut output = String::new();

        output.push_str(&format!(
            "# Comparison: {} vs {}\n\n",
            Self::escape(&first.name),
            Self::escape(&second.name)
        ));
        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Input:** `{}`\n\n",
                report.metadata.generated_label(),
                report.metadata.input_name()
            ));
        }

        output.push_str(&format!(
            "| Dimension | {} | {} | Winner |\n",
            Self::escape(&first.name),
            Self::escape(&second.name)
        ));
        output.push_str("|-----------|----|----|--------|\n");
        for key in DimensionKey::ALL {
            output.push_str(&format!(
                "| {} | {}% | {}% | {} |\n",
                key.label(),
                first.score(key),
                second.score(key),
                Self::escape(winner_name(result.dimension_winners[key], first, second))
            ));
        }
        output.push_str(&format!(
            "| **Overall** | **{}%** | **{}%** | **{}** |\n\n",
            first.match_score,
            second.match_score,
            Self::escape(winner_name(result.overall_winner, first, second))
        ));
        output.push_str(&format!(
            "**Dimension wins:** {}\n\n",
            Self::escape(&wins_line(result, first, second))
        ));

        output.push_str("## Explanation\n\n");
        output.push_str(&format!("{}\n\n", result.explanation));

        if !result.key_differences.is_empty() {
            output.push_str("## Key Differences\n\n");
            for difference in &result.key_differences {
                output.push_str(&format!("- {}\n", difference));
            }
            output.push('\n');
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl CsvFormatter {
    fn quote(cell: &str) -> String {
        format!("\"{}\"", cell.replace('"', "\"\""))
    }

    fn row(cells: &[String]) -> String {
        cells.iter().map(|c| Self::quote(c)).collect::<Vec<_>>().join(",")
    }

    fn candidate_row(candidate: &Candidate) -> String {
        let mut cells = vec![
            candidate.rank.map(|r| r.to_string()).unwrap_or_default(),
            candidate.name.clone(),
            candidate.email.clone().unwrap_or_default(),
            candidate.match_score.to_string(),
        ];
        cells.extend(DimensionKey::ALL.iter().map(|&key| candidate.score(key).to_string()));
        Self::row(&cells)
    }
}

impl OutputFormatter for CsvFormatter {
    fn format_ranking(&self, report: &RankingReport) -> Result<String> {
        let mut lines = vec![CSV_HEADERS.join(",")];
        lines.extend(report.outcome.ranked.iter().map(Self::candidate_row));
        Ok(lines.join("\n"))
    }

    fn format_comparison(&self, report: &ComparisonReport) -> Result<String> {
        let outcome = &report.outcome;
        let lines = vec![
            CSV_HEADERS.join(","),
            Self::candidate_row(&outcome.candidate_1),
            Self::candidate_row(&outcome.candidate_2),
        ];
        Ok(lines.join("\n"))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Csv
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true, true)
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
            csv_formatter: CsvFormatter,
        }
    }

    fn formatter(&self, format: OutputFormat) -> &dyn OutputFormatter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
            OutputFormat::Csv => &self.csv_formatter,
        }
    }

    pub fn generate_ranking(&self, report: &RankingReport, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_ranking(report)
    }

    pub fn generate_comparison(&self, report: &ComparisonReport, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_comparison(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(file_path, content).map_err(|e| {
        RankerError::OutputFormatting(format!("Failed to write {}: {}", file_path.display(), e))
    })
}

/// Where a `--save` target resolves to. An existing directory gets a
/// generated file name inside it.
pub fn resolve_save_path(save: &Path, format: OutputFormat, input_name: &str, label: &str) -> PathBuf {
    if save.is_dir() {
        save.join(suggest_filename(format, input_name, label, true))
    } else {
        save.to_path_buf()
    }
}

pub fn suggest_filename(format: OutputFormat, input_name: &str, label: &str, timestamp: bool) -> String {
    let base_name = Path::new(input_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
        OutputFormat::Csv => "csv",
    };
    format!("{}_{}{}.{}", base_name, label, timestamp_suffix, extension)
}
