//! Tests for database repository operations.

use tempfile::NamedTempFile;

use tictactoe_server::{
    Game, GameId, GameRepository, GameService, GameSettings, GameStatus, GameStore, Move,
    MoveRequest, RandomSource, StoreError, apply_move, create_game, request_fingerprint,
    version_token,
};

/// Never triggers the random event.
struct NoSwap;

impl RandomSource for NoSwap {
    fn roll_percent(&mut self) -> u32 {
        100
    }
}

/// Creates a temporary database file with schema applied, returns the file
/// handle (must stay in scope to keep the file alive) and a ready repository.
fn setup_test_db() -> (NamedTempFile, GameRepository) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let repo = GameRepository::new(db_path).expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");
    (db_file, repo)
}

fn new_game(repo: &GameRepository) -> Game {
    let game = create_game("alice", "bob", &GameSettings::default()).expect("Create failed");
    repo.insert_game(&game).expect("Insert failed");
    game
}

/// Applies a move to a copy of `game` without persisting it.
fn next_move(game: &Game, row: usize, column: usize) -> (Game, Move) {
    let mut next = game.clone();
    let request = MoveRequest::new(
        *game.id(),
        game.current_player().clone(),
        row as i32,
        column as i32,
        version_token(*game.version()),
    );
    let fingerprint = request_fingerprint(&request);
    let mv = apply_move(&mut next, &request, row, column, fingerprint, &mut NoSwap)
        .expect("Move failed");
    (next, mv)
}

#[test]
fn test_empty_path_rejected() {
    assert!(GameRepository::new(String::new()).is_err());
}

#[test]
fn test_game_round_trip() {
    let (_db, repo) = setup_test_db();
    let game = new_game(&repo);
    let loaded = repo.find_game(*game.id()).expect("Query failed");
    assert_eq!(loaded, Some(game));
}

#[test]
fn test_find_game_not_found() {
    let (_db, repo) = setup_test_db();
    let found = repo.find_game(GameId::new()).expect("Query failed");
    assert!(found.is_none());
}

#[test]
fn test_duplicate_game_id_fails() {
    let (_db, repo) = setup_test_db();
    let game = new_game(&repo);
    assert!(repo.insert_game(&game).is_err());
}

#[test]
fn test_commit_move_persists_both() {
    let (_db, repo) = setup_test_db();
    let game = new_game(&repo);
    let (next, mv) = next_move(&game, 1, 1);
    repo.commit_move(&next, &mv).expect("Commit failed");

    let loaded = repo.find_game(*game.id()).expect("Query failed").expect("Missing game");
    assert_eq!(loaded, next);
    assert_eq!(*loaded.version(), 2);
    assert_eq!(loaded.board().to_chars()[1][1], 'X');

    let stored = repo.find_move(mv.fingerprint()).expect("Query failed");
    assert_eq!(stored, Some(mv));
}

#[test]
fn test_commit_with_stale_version_conflicts() {
    let (_db, repo) = setup_test_db();
    let game = new_game(&repo);

    // Two writers both read version 1.
    let (first, first_move) = next_move(&game, 0, 0);
    let (second, second_move) = next_move(&game, 2, 2);
    repo.commit_move(&first, &first_move).expect("First commit failed");

    let err = repo.commit_move(&second, &second_move).unwrap_err();
    assert_eq!(err, StoreError::Conflict(*game.id()));

    let loaded = repo.find_game(*game.id()).expect("Query failed").expect("Missing game");
    assert_eq!(loaded, first);
    assert!(repo.find_move(second_move.fingerprint()).expect("Query failed").is_none());
}

#[test]
fn test_duplicate_fingerprint_rolls_back_game_update() {
    let (_db, repo) = setup_test_db();
    let game = new_game(&repo);
    let (first, first_move) = next_move(&game, 0, 0);
    repo.commit_move(&first, &first_move).expect("First commit failed");

    // A different move reusing the first fingerprint must not advance the game.
    let (second, second_move) = next_move(&first, 1, 1);
    let mut forged = first.clone();
    let forged_move = apply_move(
        &mut forged,
        &MoveRequest::new(*first.id(), "bob".to_string(), 1, 1, String::new()),
        1,
        1,
        first_move.fingerprint().clone(),
        &mut NoSwap,
    )
    .expect("Move failed");
    let err = repo.commit_move(&forged, &forged_move).unwrap_err();
    assert_eq!(err, StoreError::Conflict(*game.id()));

    let loaded = repo.find_game(*game.id()).expect("Query failed").expect("Missing game");
    assert_eq!(*loaded.version(), 2);
    assert_eq!(loaded, first);

    // The honest second move still commits.
    repo.commit_move(&second, &second_move).expect("Second commit failed");
}

#[test]
fn test_list_moves_in_order() {
    let (_db, repo) = setup_test_db();
    let game = new_game(&repo);
    let (g1, m1) = next_move(&game, 0, 0);
    repo.commit_move(&g1, &m1).expect("Commit failed");
    let (g2, m2) = next_move(&g1, 1, 1);
    repo.commit_move(&g2, &m2).expect("Commit failed");
    let (g3, m3) = next_move(&g2, 0, 1);
    repo.commit_move(&g3, &m3).expect("Commit failed");

    let moves = repo.list_moves(*game.id()).expect("List failed");
    let sequences: Vec<usize> = moves.iter().map(|m| *m.sequence()).collect();
    assert_eq!(sequences, vec![1, 2, 3]);
    assert_eq!(moves[1].player_name(), "bob");
}

#[test]
fn test_finished_status_persists() {
    let (_db, repo) = setup_test_db();
    let mut game = new_game(&repo);
    for (r, c) in [(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)] {
        let (next, mv) = next_move(&game, r, c);
        repo.commit_move(&next, &mv).expect("Commit failed");
        game = next;
    }
    let loaded = repo.find_game(*game.id()).expect("Query failed").expect("Missing game");
    assert_eq!(*loaded.status(), GameStatus::XWon);
    assert_eq!(loaded.winner(), Some("alice"));
}

#[tokio::test]
async fn test_store_trait_over_repository() {
    let (_db, repo) = setup_test_db();
    let game = create_game("alice", "bob", &GameSettings::new(4, 3)).expect("Create failed");
    GameStore::create_game(&repo, &game).await.expect("Create failed");

    let (next, mv) = next_move(&game, 3, 3);
    repo.save_game_and_move(&next, &mv).await.expect("Save failed");

    let loaded = repo.get_game_by_id(*game.id()).await.expect("Query failed");
    assert_eq!(loaded, Some(next));
    let found = repo
        .find_move_by_fingerprint(mv.fingerprint())
        .await
        .expect("Query failed");
    assert_eq!(found, Some(mv));
}

#[tokio::test]
async fn test_largest_board_round_trip() {
    let (_db, repo) = setup_test_db();
    let service = GameService::new(repo.clone(), GameSettings::new(100, 100), NoSwap);
    let created = service.create_game("alice", "bob").await.expect("Create failed");
    assert_eq!(created.board().len(), 100);

    let request = MoveRequest::new(*created.id(), "alice".to_string(), 99, 99, created.etag().clone());
    let outcome = service.make_move(request.clone()).await.expect("Move failed");
    assert_eq!(outcome.etag(), &version_token(2));
    assert_eq!(outcome.board()[99][99], 'X');

    let replay = service.make_move(request).await.expect("Replay failed");
    assert_eq!(replay, outcome);

    let loaded = repo.find_game(*created.id()).expect("Query failed").expect("Missing game");
    assert_eq!(*loaded.move_count(), 1);
    assert_eq!(*loaded.version(), 2);
    assert_eq!(loaded.board().size(), 100);
    assert_eq!(loaded.board().to_chars()[99][99], 'X');
    assert_eq!(loaded.board().occupied(), 1);
    assert_eq!(repo.list_moves(*created.id()).expect("List failed").len(), 1);
}
