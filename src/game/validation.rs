//! Preconditions for creating games and applying moves.
//!
//! Each check is a small unit in the order the service applies them; the
//! first violation wins and nothing is mutated.

use tracing::{instrument, warn};

use super::{Game, GameError, GameStatus, MoveRequest, fingerprint::version_token};
use crate::config::GameSettings;

/// Longest accepted player name, in characters.
pub const MAX_PLAYER_NAME_LEN: usize = 50;
/// Smallest board and shortest winning line.
pub const MIN_BOARD_SIZE: usize = 3;
/// Largest board.
pub const MAX_BOARD_SIZE: usize = 100;

/// Precondition: a player name is present and not too long.
#[instrument]
pub fn check_player_name(name: &str) -> Result<(), GameError> {
    if name.is_empty() || name.chars().count() > MAX_PLAYER_NAME_LEN {
        warn!(name, "Rejected player name");
        return Err(GameError::PlayerValidation(format!(
            "player name is required and may not exceed {} characters",
            MAX_PLAYER_NAME_LEN
        )));
    }
    Ok(())
}

/// Validates the inputs for a new game.
///
/// Player names are checked before board settings.
#[instrument(skip(settings))]
pub fn validate_new_game(
    player_x: &str,
    player_o: &str,
    settings: &GameSettings,
) -> Result<(), GameError> {
    check_player_name(player_x)?;
    check_player_name(player_o)?;
    if player_x == player_o {
        return Err(GameError::PlayerValidation(
            "player names must differ".to_string(),
        ));
    }

    let size = *settings.board_size();
    if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
        return Err(GameError::GameValidation(format!(
            "board size must be between {} and {}, got {}",
            MIN_BOARD_SIZE, MAX_BOARD_SIZE, size
        )));
    }
    let line = *settings.win_line_length();
    if !(MIN_BOARD_SIZE..=size).contains(&line) {
        return Err(GameError::GameValidation(format!(
            "win line length must be between {} and the board size {}, got {}",
            MIN_BOARD_SIZE, size, line
        )));
    }
    Ok(())
}

/// Precondition: the presented token matches the game's current version.
#[instrument(skip(game), fields(game_id = %game.id(), version = game.version()))]
pub fn check_version(game: &Game, etag: &str) -> Result<(), GameError> {
    if etag != version_token(*game.version()) {
        warn!("Stale version token");
        return Err(GameError::GameConflict("game version is stale".to_string()));
    }
    Ok(())
}

/// Precondition: coordinates lie on the board. Returns them as indices.
#[instrument(skip(game), fields(board_size = game.board_size()))]
pub fn check_coordinates(game: &Game, row: i32, column: i32) -> Result<(usize, usize), GameError> {
    let size = *game.board_size();
    let in_range = |v: i32| usize::try_from(v).ok().filter(|v| *v < size);
    match (in_range(row), in_range(column)) {
        (Some(r), Some(c)) => Ok((r, c)),
        _ => Err(GameError::InvalidCoordinates { row, column }),
    }
}

/// Precondition: it is the acting player's turn.
#[instrument(skip(game), fields(current = %game.current_player()))]
pub fn check_turn(game: &Game, player: &str) -> Result<(), GameError> {
    if game.current_player() != player {
        return Err(GameError::WrongTurn(player.to_string()));
    }
    Ok(())
}

/// Precondition: the game still accepts moves.
#[instrument(skip(game), fields(status = %game.status()))]
pub fn check_in_progress(game: &Game) -> Result<(), GameError> {
    if *game.status() != GameStatus::InProgress {
        return Err(GameError::GameAlreadyFinished);
    }
    Ok(())
}

/// Precondition: the target cell is empty.
#[instrument(skip(game))]
pub fn ensure_cell_empty(game: &Game, row: usize, column: usize) -> Result<(), GameError> {
    if !game.board().is_empty(row, column) {
        warn!(game_id = %game.id(), row, column, "Cell already taken");
        return Err(GameError::CellAlreadyTaken { row, column });
    }
    Ok(())
}

/// Validates a move request against a freshly loaded game.
///
/// `game` is the result of looking up `request.game_id`. On success returns
/// the game together with the validated board coordinates.
#[instrument(skip(request, game), fields(game_id = %request.game_id, player = %request.player_name))]
pub fn validate_move(
    request: &MoveRequest,
    game: Option<Game>,
) -> Result<(Game, (usize, usize)), GameError> {
    check_player_name(&request.player_name)?;
    let game = game.ok_or(GameError::GameNotFound(request.game_id))?;
    check_version(&game, &request.etag)?;
    let coords = check_coordinates(&game, request.row, request.column)?;
    check_turn(&game, &request.player_name)?;
    check_in_progress(&game)?;
    Ok((game, coords))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::machine::create_game;

    fn settings(size: usize, line: usize) -> GameSettings {
        GameSettings::new(size, line)
    }

    fn new_game() -> Game {
        create_game("alice", "bob", &settings(3, 3)).unwrap()
    }

    fn request(game: &Game, player: &str, row: i32, column: i32) -> MoveRequest {
        MoveRequest::new(
            *game.id(),
            player.to_string(),
            row,
            column,
            version_token(*game.version()),
        )
    }

    #[test]
    fn test_new_game_rejects_empty_name() {
        let err = validate_new_game("", "bob", &settings(3, 3)).unwrap_err();
        assert!(matches!(err, GameError::PlayerValidation(_)));
    }

    #[test]
    fn test_new_game_rejects_long_name() {
        let long = "a".repeat(51);
        let err = validate_new_game("alice", &long, &settings(3, 3)).unwrap_err();
        assert!(matches!(err, GameError::PlayerValidation(_)));
        assert!(validate_new_game("alice", &"a".repeat(50), &settings(3, 3)).is_ok());
    }

    #[test]
    fn test_new_game_rejects_duplicate_names() {
        let err = validate_new_game("alice", "alice", &settings(3, 3)).unwrap_err();
        assert!(matches!(err, GameError::PlayerValidation(_)));
    }

    #[test]
    fn test_new_game_board_bounds() {
        assert!(matches!(
            validate_new_game("a", "b", &settings(2, 2)),
            Err(GameError::GameValidation(_))
        ));
        assert!(matches!(
            validate_new_game("a", "b", &settings(101, 3)),
            Err(GameError::GameValidation(_))
        ));
        assert!(validate_new_game("a", "b", &settings(100, 100)).is_ok());
    }

    #[test]
    fn test_new_game_line_bounds() {
        assert!(matches!(
            validate_new_game("a", "b", &settings(5, 6)),
            Err(GameError::GameValidation(_))
        ));
        assert!(matches!(
            validate_new_game("a", "b", &settings(5, 2)),
            Err(GameError::GameValidation(_))
        ));
        assert!(validate_new_game("a", "b", &settings(5, 4)).is_ok());
    }

    #[test]
    fn test_missing_game_is_not_found() {
        let game = new_game();
        let req = request(&game, "alice", 0, 0);
        assert_eq!(
            validate_move(&req, None).unwrap_err(),
            GameError::GameNotFound(*game.id())
        );
    }

    #[test]
    fn test_player_name_checked_before_lookup() {
        let game = new_game();
        let req = request(&game, "", 0, 0);
        assert!(matches!(
            validate_move(&req, None),
            Err(GameError::PlayerValidation(_))
        ));
    }

    #[test]
    fn test_stale_token_checked_before_coordinates() {
        let game = new_game();
        let mut req = request(&game, "bob", 9, 9);
        req.etag = version_token(7);
        assert!(matches!(
            validate_move(&req, Some(game)),
            Err(GameError::GameConflict(_))
        ));
    }

    #[test]
    fn test_coordinates_out_of_range() {
        let game = new_game();
        for (row, column) in [(-1, 0), (0, -1), (3, 0), (0, 3)] {
            let req = request(&game, "alice", row, column);
            assert_eq!(
                validate_move(&req, Some(game.clone())).unwrap_err(),
                GameError::InvalidCoordinates { row, column }
            );
        }
    }

    #[test]
    fn test_wrong_turn() {
        let game = new_game();
        let req = request(&game, "bob", 0, 0);
        assert_eq!(
            validate_move(&req, Some(game)).unwrap_err(),
            GameError::WrongTurn("bob".to_string())
        );
    }

    #[test]
    fn test_finished_game_rejected() {
        let mut game = new_game();
        game.status = GameStatus::Draw;
        let req = request(&game, "alice", 0, 0);
        assert_eq!(
            validate_move(&req, Some(game)).unwrap_err(),
            GameError::GameAlreadyFinished
        );
    }

    #[test]
    fn test_valid_move_returns_indices() {
        let game = new_game();
        let req = request(&game, "alice", 2, 1);
        let (_, coords) = validate_move(&req, Some(game)).unwrap();
        assert_eq!(coords, (2, 1));
    }
}
