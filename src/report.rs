//! Output formatting for learning results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: the snapshot document itself, for programmatic consumption

use colored::*;
use serde::Serialize;

use crate::analysis::LanguageMetrics;
use crate::integrator::{CrossLanguagePattern, IntegratedLearningResult};
use crate::learning::{CustomRules, LearningResult, Maturity, TeamPreferences};
use crate::patterns::Pattern;

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pretty,
    Json,
}

impl std::str::FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(Format::Pretty),
            "json" => Ok(Format::Json),
            other => anyhow::bail!("invalid format {:?}, must be 'pretty' or 'json'", other),
        }
    }
}

// =============================================================================
// JSON Format
// =============================================================================

/// Serialize any result the way it is stored on disk.
pub fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn write_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", to_json(value)?);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

fn write_header(path: &str) {
    println!();
    print!("  ");
    print!("{}", "stylelearn".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();
    print!("  {}", "Project:  ".dimmed());
    println!("{}", path);
}

/// Write a single-language result.
pub fn write_pretty_learning(path: &str, result: &LearningResult) {
    write_header(path);
    if !result.language.is_empty() {
        print!("  {}", "Language: ".dimmed());
        println!("{}", result.language);
    }
    println!();

    write_maturity_line(result.project_maturity, result.recommended_strictness);
    println!();

    write_patterns(&result.patterns);
    write_rules("Custom rules", &result.custom_rules);
    write_preferences(&result.team_preferences);
}

/// Write a multi-language result.
pub fn write_pretty_integrated(path: &str, result: &IntegratedLearningResult) {
    write_header(path);
    println!();

    write_maturity_line(result.overall_maturity, result.overall_strictness);
    println!();

    if let Some(primary) = &result.primary_result {
        let title = if primary.language.is_empty() {
            "Primary language".to_string()
        } else {
            format!("Primary language ({})", primary.language)
        };
        println!("  {}", title.bold());
        print!("    ");
        write_maturity_line(primary.project_maturity, primary.recommended_strictness);
        println!();
        write_patterns(&primary.patterns);
    }

    write_languages(&result.language_metrics);
    write_cross_patterns(&result.cross_language_patterns);

    for (language, rules) in &result.language_rules {
        write_rules(&format!("Rules for {}", language), rules);
    }

    if !result.recommendations.is_empty() {
        println!("  {}", "Recommendations:".bold());
        for rec in &result.recommendations {
            println!("    • {}", rec);
        }
        println!();
    }
}

fn write_maturity_line(maturity: Maturity, strictness: f64) {
    print!("  Maturity: ");
    write_colored_maturity(maturity);
    print!("  Strictness: ");
    write_colored_unit(strictness);
    println!();
}

fn write_colored_maturity(maturity: Maturity) {
    let label = maturity.as_str();
    match maturity {
        Maturity::Expert => print!("{}", label.green().bold()),
        Maturity::Intermediate => print!("{}", label.yellow()),
        Maturity::Beginner => print!("{}", label.red()),
    }
}

fn write_colored_unit(value: f64) {
    let s = format!("{:.2}", value);
    match value {
        v if v >= 0.8 => print!("{}", s.green().bold()),
        v if v >= 0.6 => print!("{}", s.green()),
        v if v >= 0.4 => print!("{}", s.yellow()),
        _ => print!("{}", s.red()),
    }
}

fn write_patterns(patterns: &[Pattern]) {
    if patterns.is_empty() {
        println!("  {}", "No confident patterns".dimmed());
        println!();
        return;
    }

    println!("  {} ({}):", "Patterns".bold(), patterns.len());
    for p in patterns {
        print!("    {:<14}", p.pattern_type.to_string().dimmed());
        print!("{:<30}", p.pattern_name);
        print!("{:<20}", p.pattern_value.to_string().blue());
        write_colored_unit(p.confidence);
        print!("{}", format!("  ×{}", p.frequency).dimmed());
        println!();
        if !p.examples.is_empty() {
            println!("{}", format!("        e.g. {}", p.examples.join(", ")).dimmed());
        }
    }
    println!();
}

fn write_rules(title: &str, rules: &CustomRules) {
    if rules.is_empty() {
        return;
    }
    println!("  {}:", title.bold());
    for (tool, settings) in rules {
        println!("    {}", tool.cyan());
        for (key, value) in settings {
            println!("      {:<40} {}", key, value);
        }
    }
    println!();
}

fn write_preferences(prefs: &TeamPreferences) {
    if prefs.is_empty() {
        return;
    }
    println!("  {}:", "Team preferences".bold());
    for (key, value) in prefs {
        let shown = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
        println!("    {:<24} {}", key, shown);
    }
    println!();
}

fn write_languages(metrics: &std::collections::BTreeMap<String, LanguageMetrics>) {
    if metrics.is_empty() {
        return;
    }
    println!("  {} ({}):", "Languages".bold(), metrics.len());
    println!(
        "    {}",
        format!(
            "{:<12} {:>6} {:>8} {:>10} {:>9} {:>8} {:>7}",
            "language", "files", "lines", "complexity", "fn size", "naming", "style"
        )
        .dimmed()
    );
    for (language, m) in metrics {
        println!(
            "    {:<12} {:>6} {:>8} {:>10.1} {:>9.1} {:>8.2} {:>7.2}",
            language,
            m.file_count,
            m.total_lines,
            m.avg_complexity,
            m.avg_function_size,
            m.naming_consistency,
            m.style_consistency
        );
    }
    println!();
}

fn write_cross_patterns(cross: &[CrossLanguagePattern]) {
    if cross.is_empty() {
        return;
    }
    println!("  {} ({}):", "Cross-language".bold(), cross.len());
    for c in cross {
        print!("    {:<30}", c.pattern_name);
        write_colored_unit(c.consistency_score);
        println!("  {}", c.languages.join(", ").dimmed());
        println!("        {}", c.recommendation);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_format_parsing() {
        assert_eq!("pretty".parse::<Format>().unwrap(), Format::Pretty);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert!("sarif".parse::<Format>().is_err());
    }

    #[test]
    fn test_json_uses_snapshot_keys() {
        let result = LearningResult {
            language: "go".into(),
            project_maturity: Maturity::Beginner,
            recommended_strictness: 0.3,
            patterns: Vec::new(),
            custom_rules: BTreeMap::new(),
            team_preferences: BTreeMap::new(),
            generated_at: 1.5,
        };
        let json: serde_json::Value = serde_json::from_str(&to_json(&result).unwrap()).unwrap();
        for key in [
            "project_maturity",
            "recommended_strictness",
            "patterns",
            "custom_rules",
            "team_preferences",
            "generated_at",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["project_maturity"], "beginner");
    }
}
