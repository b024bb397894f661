//! Property tests for game creation across every valid board shape.

use proptest::prelude::*;

use tictactoe_server::{
    Cell, GameSettings, GameStatus, GameView, MAX_BOARD_SIZE, MIN_BOARD_SIZE, create_game,
    version_token,
};

fn shape() -> impl Strategy<Value = (usize, usize)> {
    (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).prop_flat_map(|size| (Just(size), MIN_BOARD_SIZE..=size))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn new_game_starts_empty_at_version_one((size, line) in shape()) {
        let game = create_game("alice", "bob", &GameSettings::new(size, line)).unwrap();
        prop_assert_eq!(*game.version(), 1);
        prop_assert_eq!(*game.status(), GameStatus::InProgress);
        prop_assert_eq!(*game.move_count(), 0);
        prop_assert_eq!(*game.board_size(), size);
        prop_assert_eq!(*game.win_line_length(), line);
        prop_assert_eq!(game.current_player(), "alice");
        prop_assert_eq!(game.board().size(), size);
        prop_assert!(game.board().cells().iter().all(|row| row.len() == size));
        prop_assert!(game.board().cells().iter().flatten().all(|c| *c == Cell::Empty));

        let view = GameView::from(&game);
        prop_assert_eq!(view.etag(), &version_token(1));
    }

    #[test]
    fn line_longer_than_board_is_rejected(size in MIN_BOARD_SIZE..MAX_BOARD_SIZE, extra in 1usize..5) {
        prop_assert!(create_game("alice", "bob", &GameSettings::new(size, size + extra)).is_err());
    }
}
