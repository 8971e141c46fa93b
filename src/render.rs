//! HTML rendering of the leaderboard page.

use crate::leaderboard::Standings;
use crate::logic::RankedPlayer;
use maud::{html, Markup, DOCTYPE};
use std::collections::BTreeSet;

/// Page served when the store cannot be read.
pub const LOAD_ERROR_PAGE: &str = "<html><body><h1>Failed to load tournament data.</h1></body></html>";

/// Full leaderboard page, including the add-results dialog.
pub fn render_leaderboard(title: &str, standings: &Standings) -> String {
    page(title, standings).into_string()
}

fn page(title: &str, standings: &Standings) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.classless.min.css";
                link rel="stylesheet" href="/static/leaderboard.css";
                title { (title) }
            }
            body {
                div class="container" {
                    div { h1 { (title) } }
                    div { p { "Updated " (standings.updated) } }
                    table {
                        thead {
                            tr {
                                th { "Rank" }
                                th { "Player" }
                                th { "Points" }
                                th { "Results" }
                            }
                        }
                        tbody {
                            @for entry in &standings.players {
                                (row(entry))
                            }
                        }
                    }
                    div class="bottom-actions" {
                        a href="#" id="add-results-link" { "Add Results" }
                    }
                }
                (results_dialog())
                datalist id="player-name-options" {
                    @for name in name_options(&standings.players) {
                        option value=(name) {}
                    }
                }
                script src="/static/leaderboard.js" {}
            }
        }
    }
}

fn row(entry: &RankedPlayer) -> Markup {
    html! {
        tr {
            td { (entry.rank_label) }
            td { (entry.player.name) }
            td { (entry.points) }
            td { (entry.player.results) }
        }
    }
}

fn results_dialog() -> Markup {
    html! {
        dialog id="add-results-dialog" {
            article {
                header { h3 { "Add Results" } }
                table class="results-table" {
                    thead {
                        tr {
                            th { "Place" }
                            th { "Player" }
                            th { "Points" }
                            th { "Remove" }
                        }
                    }
                    tbody id="results-rows" {}
                }
                footer class="dialog-actions" {
                    button type="button" id="add-row-button" aria-label="Add result row" { "+" }
                    div class="dialog-actions-right" {
                        button type="button" id="cancel-results-button" class="secondary" { "Cancel" }
                        button type="button" id="save-results-button" { "Save" }
                    }
                }
            }
        }
    }
}

/// Distinct trimmed names for autocomplete, case-insensitive order then exact.
pub fn name_options(players: &[RankedPlayer]) -> Vec<String> {
    let names: BTreeSet<(String, String)> = players
        .iter()
        .map(|p| p.player.name.trim())
        .filter(|name| !name.is_empty())
        .map(|name| (name.to_lowercase(), name.to_string()))
        .collect();
    names.into_iter().map(|(_, name)| name).collect()
}
