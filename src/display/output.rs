use crate::rank;
use crate::store::matches::MatchRecord;
use crate::store::players::PlayerAccount;
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "#")]
    number: String,
    champion: String,
    result: String,
    kda: String,
    #[tabled(rename = "LP")]
    lp: String,
    #[tabled(rename = "rank after")]
    rank_after: String,
}

#[derive(Tabled)]
struct PlayerRow {
    #[tabled(rename = "riot id")]
    riot_id: String,
    region: String,
    added: String,
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn display_players(players: &[PlayerAccount]) {
    if players.is_empty() {
        println!("{}", "No players tracked yet. Add one with `add`.".yellow());
        return;
    }

    let rows: Vec<PlayerRow> = players
        .iter()
        .map(|p| PlayerRow {
            riot_id: p.riot_id.clone(),
            region: p.region.clone(),
            added: p.added_at.format("%Y-%m-%d").to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

/// Match history with attributed LP. Matches whose delta could not be
/// determined yet show "N/A"; that is expected, not an error.
pub fn display_attributed_matches(riot_id: &str, queue_label: &str, matches: &[MatchRecord]) {
    println!(
        "\n{}",
        format!("📊 {} — {} ranked history", riot_id, queue_label)
            .bold()
            .cyan()
    );
    println!("{}\n", "=".repeat(60).cyan());

    if matches.is_empty() {
        println!("{}", "No matches recorded for this queue yet.".yellow());
        return;
    }

    let wins = matches.iter().filter(|m| m.win).count();
    let attributed_lp: i32 = matches.iter().filter_map(|m| m.lp_change_this_game).sum();
    println!(
        "{} {} W / {} L, net {} LP over attributed games\n",
        "📈 Overall:".bold(),
        wins.to_string().green(),
        (matches.len() - wins).to_string().red(),
        format_delta(Some(attributed_lp))
    );

    let mut rows = vec![];
    for (idx, m) in matches.iter().enumerate() {
        let result = if m.win {
            "WIN".green().to_string()
        } else {
            "LOSS".red().to_string()
        };
        rows.push(MatchRow {
            number: format!("{}", idx + 1),
            champion: m.champion.clone(),
            result,
            kda: format!("{}/{}/{}", m.kills, m.deaths, m.assists),
            lp: format_delta(m.lp_change_this_game),
            rank_after: m
                .post_game_rank_value
                .map(rank::format_value)
                .unwrap_or_else(|| "N/A".to_string()),
        });
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}\n", table);
}

fn format_delta(lp: Option<i32>) -> String {
    match lp {
        Some(delta) if delta > 0 => format!("+{}", delta).green().to_string(),
        Some(delta) if delta < 0 => delta.to_string().red().to_string(),
        Some(_) => "±0".to_string(),
        None => "N/A".yellow().to_string(),
    }
}
