//! Plain-text rendering of the tracker state.

use potion_core::game::session::{GameSession, RoundResolution};
use potion_core::model::card::CardKind;
use potion_core::model::history::History;
use potion_core::stats::{Anomaly, StatsState, TotalRepair};

pub fn status_line(session: &GameSession) -> String {
    let mut line = format!(
        "Round {} • Opponent energy: {} • Your HP: {}/{}",
        session.round(),
        session.available_energy(),
        session.player_hp(),
        session.rules().starting_hp
    );
    if session.is_game_over() {
        line.push_str(" • GAME OVER (reset to play again)");
    }
    line
}

pub fn card_menu(options: &[(CardKind, bool)]) -> String {
    options
        .iter()
        .map(|(card, playable)| {
            let marker = if *playable { " " } else { "x" };
            format!("[{marker}] {}", card.card())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn history_lines(history: &History) -> Vec<String> {
    history
        .iter()
        .map(|entry| {
            format!(
                "Round {}: '{}' -> {} energy left",
                entry.round, entry.card_played, entry.energy_after_round
            )
        })
        .collect()
}

pub fn global_table(stats: &StatsState) -> String {
    let table = stats.global_table();
    if table.is_empty() {
        return "Overall: no data yet".to_string();
    }
    let mut out = format!(
        "Overall ({} {}):",
        table.denominator,
        plural(table.denominator, "play")
    );
    for row in &table.rows {
        out.push_str(&format!(
            "\n  {}: {:.1}% ({} {})",
            row.card,
            row.percent,
            row.count,
            plural(row.count, "play")
        ));
    }
    out
}

pub fn conditional_table(stats: &StatsState, energy: u32) -> String {
    let table = stats.conditional_table(energy);
    if table.is_empty() {
        return format!("With {energy} energy: no data yet");
    }
    let mut out = format!(
        "With {energy} energy ({} {}):",
        table.denominator,
        plural(table.denominator, "round")
    );
    for row in &table.rows {
        out.push_str(&format!(
            "\n  {}: {:.1}% ({}/{})",
            row.card, row.percent, row.count, table.denominator
        ));
    }
    out
}

pub fn resolution(resolution: &RoundResolution) -> String {
    let entry = &resolution.entry;
    let mut out = format!(
        "Round {}: '{}' with {} energy -> {} left",
        entry.round, entry.card_played, resolution.available_energy, entry.energy_after_round
    );
    if resolution.damage > 0 {
        out.push_str(&format!(
            ", you took {} damage (HP {})",
            resolution.damage, resolution.player_hp
        ));
    }
    if let Some(err) = &resolution.persistence {
        out.push('\n');
        out.push_str(&persistence_warning(err));
    }
    if resolution.game_over {
        out.push_str("\nGame over: your HP reached 0.");
    }
    out
}

pub fn persistence_warning(err: &dyn std::error::Error) -> String {
    format!("Warning: statistics could not be saved and may be lost on restart ({err})")
}

pub fn load_warnings(anomalies: &[Anomaly], repair: Option<TotalRepair>) -> Vec<String> {
    let mut lines: Vec<String> = anomalies
        .iter()
        .map(|anomaly| {
            format!(
                "Warning: stored '{}' was unreadable and has been reset ({})",
                anomaly.key, anomaly.reason
            )
        })
        .collect();
    if let Some(repair) = repair {
        lines.push(format!(
            "Note: total plays corrected from {} to {}",
            repair.stored, repair.healed
        ));
    }
    lines
}

fn plural(count: u64, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
