use crate::ruleset::Ruleset;

pub const MAX_HIGHLIGHTS: usize = 5;
pub const DEFAULT_HIGHLIGHT: &str = "Both sides traded blows in a steady, hard-fought battle.";

/// Keyword (matched case-insensitively against log lines) and the highlight it earns.
fn keyword_table(ruleset: &Ruleset) -> Vec<(String, String)> {
    let mut table = vec![
        (
            "critical hit".to_string(),
            "A critical hit landed at a decisive moment!".to_string(),
        ),
        (
            "super effective".to_string(),
            "Elemental advantage was pressed home with a super effective strike!".to_string(),
        ),
        (
            "dodged".to_string(),
            "A deft dodge left an attack striking only air!".to_string(),
        ),
    ];
    for status in ruleset.statuses() {
        table.push((
            format!("afflicted with {}", status.name.to_lowercase()),
            format!("{} took hold and changed the course of the fight!", status.name),
        ));
    }
    table.push((
        " rose!".to_string(),
        "A surge in stats tipped the balance!".to_string(),
    ));
    table.push((
        " fell!".to_string(),
        "A crippling stat drop sapped the opposition!".to_string(),
    ));
    table
}

/// Scan the raw log in order and collect up to five distinct highlights.
pub fn extract_highlights(log: &[String], ruleset: &Ruleset) -> Vec<String> {
    let table = keyword_table(ruleset);
    let mut highlights: Vec<String> = Vec::new();

    'lines: for line in log {
        let lowered = line.to_lowercase();
        for (keyword, highlight) in &table {
            if highlights.len() >= MAX_HIGHLIGHTS {
                break 'lines;
            }
            if lowered.contains(keyword.as_str()) && !highlights.contains(highlight) {
                highlights.push(highlight.clone());
            }
        }
    }

    if highlights.is_empty() {
        highlights.push(DEFAULT_HIGHLIGHT.to_string());
    }
    highlights
}
