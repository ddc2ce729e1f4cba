//! Tests for move dispatch through the session manager.

use tictac_duel::{Cell, LINES, Mark, SessionError, SessionManager, Winner};

/// Creates a started session with alice as X and bob as O.
fn setup_started() -> (SessionManager, String) {
    let manager = SessionManager::in_memory();
    let session = manager
        .create("alice".to_string(), None)
        .expect("Create failed");
    manager
        .join(&session.id, "bob".to_string(), None)
        .expect("Join failed");
    (manager, session.id)
}

fn player_for(mark: Mark) -> &'static str {
    match mark {
        Mark::X => "alice",
        Mark::O => "bob",
    }
}

#[test]
fn test_move_before_join_is_inactive() {
    let manager = SessionManager::in_memory();
    let session = manager.create("alice".to_string(), None).expect("Create failed");
    assert_eq!(
        manager.make_move(&session.id, "alice", 0),
        Err(SessionError::GameNotActive)
    );
}

#[test]
fn test_moves_alternate() {
    let (manager, id) = setup_started();

    let snapshot = manager.make_move(&id, "alice", 4).expect("Move failed");
    assert_eq!(snapshot.board.get(4), Some(Cell::X));
    assert_eq!(snapshot.current_player, Mark::O);
    let last = snapshot.last_move.expect("Last move missing");
    assert_eq!(last.cell_index, 4);
    assert_eq!(last.player, Mark::X);

    assert_eq!(
        manager.make_move(&id, "alice", 0),
        Err(SessionError::NotYourTurn)
    );

    let snapshot = manager.make_move(&id, "bob", 0).expect("Move failed");
    assert_eq!(snapshot.board.get(0), Some(Cell::O));
    assert_eq!(snapshot.current_player, Mark::X);
}

#[test]
fn test_error_order() {
    let (manager, id) = setup_started();

    // Unknown session beats everything.
    assert!(matches!(
        manager.make_move("game_missing", "mallory", 99),
        Err(SessionError::NotFound(_))
    ));
    // Non-player beats turn and cell checks.
    assert_eq!(
        manager.make_move(&id, "mallory", 99),
        Err(SessionError::NotAPlayer)
    );
    // Turn beats cell range.
    assert_eq!(
        manager.make_move(&id, "bob", 99),
        Err(SessionError::NotYourTurn)
    );
    assert_eq!(
        manager.make_move(&id, "alice", 9),
        Err(SessionError::InvalidCell(9))
    );

    manager.make_move(&id, "alice", 0).expect("Move failed");
    assert_eq!(
        manager.make_move(&id, "bob", 0),
        Err(SessionError::CellOccupied(0))
    );
}

#[test]
fn test_rejected_move_leaves_state_unchanged() {
    let (manager, id) = setup_started();
    manager.make_move(&id, "alice", 4).expect("Move failed");
    let before = manager.state(&id, None).expect("State failed");

    assert!(manager.make_move(&id, "bob", 4).is_err());
    assert!(manager.make_move(&id, "alice", 5).is_err());
    assert!(manager.make_move(&id, "bob", 12).is_err());

    let after = manager.state(&id, None).expect("State failed");
    assert_eq!(before, after);
}

#[test]
fn test_every_line_wins() {
    for line in LINES {
        let (manager, id) = setup_started();
        let filler: Vec<usize> = (0..9).filter(|c| !line.contains(c)).collect();

        // O only ever places two marks, so X completes the line first.
        let mut o_cells = filler.iter().copied();
        let mut last = None;
        for (turn, x_cell) in line.iter().copied().enumerate() {
            last = Some(manager.make_move(&id, "alice", x_cell).expect("X move failed"));
            if turn < 2 {
                let o_cell = o_cells.next().expect("No filler cell");
                manager.make_move(&id, "bob", o_cell).expect("O move failed");
            }
        }

        let snapshot = last.expect("No moves made");
        assert_eq!(snapshot.winner, Some(Winner::X), "line {:?}", line);
        assert!(!snapshot.game_active);
        assert_eq!(
            manager.make_move(&id, "bob", filler[filler.len() - 1]),
            Err(SessionError::GameNotActive)
        );
    }
}

#[test]
fn test_o_can_win() {
    let (manager, id) = setup_started();
    for (mark, cell) in [
        (Mark::X, 0),
        (Mark::O, 2),
        (Mark::X, 1),
        (Mark::O, 4),
        (Mark::X, 8),
        (Mark::O, 6),
    ] {
        manager
            .make_move(&id, player_for(mark), cell)
            .expect("Move failed");
    }
    let snapshot = manager.state(&id, None).expect("State failed");
    assert_eq!(snapshot.winner, Some(Winner::O));
    assert!(!snapshot.game_active);
}

#[test]
fn test_column_win_on_last_empty_cell() {
    let (manager, id) = setup_started();
    // Fills the board to [X,O,X,X,O,O,X,X,O]; the last move completes the
    // left column.
    for (mark, cell) in [
        (Mark::X, 0),
        (Mark::O, 1),
        (Mark::X, 2),
        (Mark::O, 4),
        (Mark::X, 3),
        (Mark::O, 5),
        (Mark::X, 7),
        (Mark::O, 8),
    ] {
        manager
            .make_move(&id, player_for(mark), cell)
            .expect("Move failed");
    }
    let snapshot = manager.make_move(&id, "alice", 6).expect("Final move failed");
    assert_eq!(snapshot.winner, Some(Winner::X));
    assert!(!snapshot.game_active);
}

#[test]
fn test_draw() {
    let (manager, id) = setup_started();
    // X O X
    // X O O
    // O X X
    for (mark, cell) in [
        (Mark::X, 0),
        (Mark::O, 1),
        (Mark::X, 2),
        (Mark::O, 4),
        (Mark::X, 3),
        (Mark::O, 5),
        (Mark::X, 7),
        (Mark::O, 6),
        (Mark::X, 8),
    ] {
        manager
            .make_move(&id, player_for(mark), cell)
            .expect("Move failed");
    }
    let snapshot = manager.state(&id, None).expect("State failed");
    assert_eq!(snapshot.winner, Some(Winner::Draw));
    assert!(!snapshot.game_active);
    assert_eq!(snapshot.board.occupied(), 9);
}

#[test]
fn test_win_on_ninth_move_is_not_draw() {
    let (manager, id) = setup_started();
    // X O X
    // O X O
    // O X X  <- X completes the diagonal on the last cell
    for (mark, cell) in [
        (Mark::X, 0),
        (Mark::O, 1),
        (Mark::X, 2),
        (Mark::O, 3),
        (Mark::X, 4),
        (Mark::O, 5),
        (Mark::X, 7),
        (Mark::O, 6),
        (Mark::X, 8),
    ] {
        manager
            .make_move(&id, player_for(mark), cell)
            .expect("Move failed");
    }
    let snapshot = manager.state(&id, None).expect("State failed");
    assert_eq!(snapshot.winner, Some(Winner::X));
}
