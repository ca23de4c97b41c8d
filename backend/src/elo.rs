//! Projected Elo display, reimplemented locally from
//! `original_source/app/games/models.py`'s `calculate_elo_rating` purely for
//! the `game_info` payload (§6). The External App Service remains
//! authoritative for the real post-game update; this never mutates anything.

/// `result` is 1.0 for a win, 0.5 for a draw, 0.0 for a loss.
const ELO_DIVISOR: f64 = 400.0;
const ELO_K_FACTOR: f64 = 20.0;

fn projected(player_elo: f64, opponent_elo: f64, result: f64) -> f64 {
    let probability = 1.0 / (1.0 + 10f64.powf((opponent_elo - player_elo) / ELO_DIVISOR));
    ((player_elo + ELO_K_FACTOR * (result - probability)) * 10.0).round() / 10.0
}

/// The three possible post-game ratings for `player_elo` against
/// `opponent_elo`: win, draw, lose, in that order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EloProjection {
    pub win: f64,
    pub draw: f64,
    pub lose: f64,
}

pub fn project(player_elo: f64, opponent_elo: f64) -> EloProjection {
    EloProjection {
        win: projected(player_elo, opponent_elo, 1.0),
        draw: projected(player_elo, opponent_elo, 0.5),
        lose: projected(player_elo, opponent_elo, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_ratings_draw_projection_is_unchanged() {
        let projection = project(1200.0, 1200.0);
        assert_eq!(projection.draw, 1200.0);
    }

    #[test]
    fn a_win_always_projects_higher_than_a_loss() {
        let projection = project(1500.0, 1400.0);
        assert!(projection.win > projection.draw);
        assert!(projection.draw > projection.lose);
    }

    #[test]
    fn underdog_gains_more_for_an_upset_win_than_the_favorite_would() {
        let underdog = project(1200.0, 1600.0);
        let favorite = project(1600.0, 1200.0);
        assert!(underdog.win - 1200.0 > favorite.win - 1600.0);
    }
}
