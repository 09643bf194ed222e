use sea_battle::{
    Event, GameError, Identity, Point, Session, SessionConfig, SessionStatus, ShotReport,
    EXPECTED_CELLS,
};

fn owner() -> Identity {
    Identity::from(1u64)
}

fn other() -> Identity {
    Identity::from(2u64)
}

/// Column x=1, row y=1 and the far corner: 20 cells.
fn board_a() -> Vec<Point> {
    let mut cells: Vec<Point> = (1..=10).map(|y| Point::new(1, y)).collect();
    cells.extend((2..=10).map(|x| Point::new(x, 1)));
    cells.push(Point::new(10, 10));
    cells
}

fn started() -> Session {
    let mut session = Session::new(owner());
    session.register_board(owner(), &board_a()).unwrap();
    session.register_board(other(), &board_a()).unwrap();
    session
}

#[test]
fn board_a_has_expected_size() {
    assert_eq!(board_a().len(), EXPECTED_CELLS);
}

#[test]
fn wrong_cell_count_is_rejected() {
    let mut session = Session::new(owner());
    assert_eq!(
        session.register_board(owner(), &[Point::new(1, 1)]),
        Err(GameError::InvalidShipCount {
            expected: 20,
            actual: 1
        })
    );
    let mut too_many = board_a();
    too_many.push(Point::new(9, 9));
    assert!(matches!(
        session.register_board(owner(), &too_many),
        Err(GameError::InvalidShipCount { actual: 21, .. })
    ));
    assert!(!session.is_started());
    assert_eq!(session.status(), SessionStatus::NotStarted);
    assert!(session.history().is_empty());
    assert_eq!(session.player_at(0), Err(GameError::OutOfRange(0)));
}

#[test]
fn one_board_is_not_started() {
    let mut session = Session::new(owner());
    session.register_board(owner(), &board_a()).unwrap();
    assert!(!session.is_started());
    assert_eq!(session.status(), SessionStatus::AwaitingSecondPlayer);
    assert!(session.active_player().is_null());
}

#[test]
fn two_boards_start_with_first_registrant() {
    let session = started();
    assert!(session.is_started());
    assert_eq!(session.active_player(), owner());
    assert_eq!(session.player_at(0), Ok(owner()));
    assert_eq!(session.player_at(1), Ok(other()));
    assert_eq!(session.player_at(2), Err(GameError::OutOfRange(2)));
}

#[test]
fn play_order_follows_registration_not_owner() {
    let mut session = Session::new(owner());
    session.register_board(other(), &board_a()).unwrap();
    session.register_board(owner(), &board_a()).unwrap();
    assert_eq!(session.active_player(), other());
}

#[test]
fn third_registration_is_rejected() {
    let mut session = started();
    let before = session.clone();
    assert_eq!(
        session.register_board(Identity::from(3u64), &board_a()),
        Err(GameError::SessionFull)
    );
    assert_eq!(session, before);
}

#[test]
fn duplicate_and_null_registrations_are_rejected() {
    let mut session = Session::new(owner());
    assert_eq!(
        session.register_board(Identity::NULL, &board_a()),
        Err(GameError::ReservedIdentity)
    );
    session.register_board(owner(), &board_a()).unwrap();
    assert_eq!(
        session.register_board(owner(), &board_a()),
        Err(GameError::AlreadyRegistered(owner()))
    );
    assert_eq!(session.status(), SessionStatus::AwaitingSecondPlayer);

    let mut repeated = board_a();
    repeated[5] = repeated[0];
    assert_eq!(
        session.register_board(other(), &repeated),
        Err(GameError::DuplicateCell(Point::new(1, 1)))
    );
}

#[test]
fn shot_before_start_fails() {
    let mut session = Session::new(owner());
    assert_eq!(
        session.take_shot(owner(), Point::new(1, 1)),
        Err(GameError::GameNotStarted)
    );
    session.register_board(owner(), &board_a()).unwrap();
    assert_eq!(
        session.take_shot(owner(), Point::new(1, 1)),
        Err(GameError::GameNotStarted)
    );
}

#[test]
fn shot_out_of_turn_fails() {
    let mut session = started();
    assert_eq!(
        session.take_shot(other(), Point::new(1, 1)),
        Err(GameError::NotActivePlayer {
            caller: other(),
            active: owner()
        })
    );
    assert_eq!(
        session.take_shot(Identity::from(9u64), Point::new(1, 1)),
        Err(GameError::NotActivePlayer {
            caller: Identity::from(9u64),
            active: owner()
        })
    );
    assert!(session.events().is_empty());
}

#[test]
fn miss_passes_turn_to_defender() {
    let mut session = started();
    let outcome = session.take_shot(owner(), Point::new(5, 5)).unwrap();
    assert_eq!(
        outcome.report,
        ShotReport {
            attacker: owner(),
            defender: other(),
            point: Point::new(5, 5),
            hit: false,
        }
    );
    assert!(!outcome.finished);
    assert_eq!(session.hit_count(other()), Ok(0));
    assert_eq!(session.hit_count(owner()), Ok(0));
    assert_eq!(session.active_player(), other());
    assert_eq!(session.events(), &[Event::ShotReport(outcome.report)]);
}

#[test]
fn hit_keeps_turn_with_attacker() {
    let mut session = started();
    let first = session.take_shot(owner(), Point::new(1, 1)).unwrap();
    assert!(first.report.hit);
    assert_eq!(first.report.defender, other());
    assert_eq!(session.hit_count(other()), Ok(1));
    assert_eq!(session.active_player(), owner());

    let second = session.take_shot(owner(), Point::new(10, 10)).unwrap();
    assert!(second.report.hit);
    assert_eq!(session.hit_count(other()), Ok(2));
    assert_eq!(session.active_player(), owner());
}

#[test]
fn sinking_every_cell_finishes_the_game() {
    let mut session = started();
    let cells = board_a();
    for (i, p) in cells.iter().enumerate() {
        let outcome = session.take_shot(owner(), *p).unwrap();
        assert!(outcome.report.hit);
        assert_eq!(outcome.finished, i == cells.len() - 1);
    }
    assert_eq!(session.hit_count(other()), Ok(20));
    assert!(!session.is_started());
    assert_eq!(session.status(), SessionStatus::Finished);
    assert!(session.active_player().is_null());
    assert_eq!(session.winner(), Some(owner()));
    assert_eq!(session.events().last(), Some(&Event::GameFinished));

    // Terminal: nothing reopens it.
    assert_eq!(
        session.take_shot(owner(), Point::new(5, 5)),
        Err(GameError::GameNotStarted)
    );
    assert_eq!(session.finish_game(owner()), Err(GameError::GameNotStarted));
    assert_eq!(
        session.register_board(Identity::from(3u64), &board_a()),
        Err(GameError::SessionFull)
    );
}

#[test]
fn finish_before_start_fails() {
    let mut session = Session::new(owner());
    assert_eq!(session.finish_game(owner()), Err(GameError::GameNotStarted));
    session.register_board(owner(), &board_a()).unwrap();
    assert_eq!(session.finish_game(owner()), Err(GameError::GameNotStarted));
}

#[test]
fn finish_in_progress_emits_game_finished() {
    let mut session = started();
    session.take_shot(owner(), Point::new(5, 5)).unwrap();
    session.finish_game(other()).unwrap();
    assert!(!session.is_started());
    assert!(session.active_player().is_null());
    assert_eq!(session.winner(), None);
    assert_eq!(session.events().last(), Some(&Event::GameFinished));
    assert_eq!(session.finish_game(owner()), Err(GameError::GameNotStarted));
}

#[test]
fn reference_scenario() {
    let mut session = started();
    assert!(session.is_started());
    assert_eq!(session.active_player(), owner());

    let miss = session.take_shot(owner(), Point::new(5, 5)).unwrap();
    assert!(!miss.report.hit);
    assert_eq!(session.active_player(), other());

    let mut session = started();
    let hit = session.take_shot(owner(), Point::new(1, 1)).unwrap();
    assert!(hit.report.hit);
    assert_eq!(session.hit_count(other()), Ok(1));
    assert_eq!(session.active_player(), owner());
}

#[test]
fn repeated_hits_count_by_default() {
    let mut session = started();
    for _ in 0..3 {
        assert!(session.take_shot(owner(), Point::new(1, 1)).unwrap().report.hit);
    }
    assert_eq!(session.hit_count(other()), Ok(3));
    assert_eq!(session.boards().board_of(other()).unwrap().hit_points().len(), 1);
}

#[test]
fn repeated_hits_rejected_when_deduping() {
    let mut session = Session::with_config(owner(), SessionConfig::dedupe_shots());
    session.register_board(owner(), &board_a()).unwrap();
    session.register_board(other(), &board_a()).unwrap();
    session.take_shot(owner(), Point::new(1, 1)).unwrap();
    let before = session.clone();
    assert_eq!(
        session.take_shot(owner(), Point::new(1, 1)),
        Err(GameError::AlreadyHit(Point::new(1, 1)))
    );
    assert_eq!(session, before);

    // Repeated misses are not tracked and still hand over the turn.
    session.take_shot(owner(), Point::new(5, 5)).unwrap();
    session.take_shot(other(), Point::new(5, 5)).unwrap();
    assert_eq!(session.active_player(), owner());
    session.take_shot(owner(), Point::new(5, 5)).unwrap();
    assert_eq!(session.active_player(), other());
}

#[test]
fn unknown_player_queries() {
    let session = started();
    assert_eq!(
        session.hit_count(Identity::from(7u64)),
        Err(GameError::UnknownPlayer(Identity::from(7u64)))
    );
    assert!(!session.boards().is_fully_sunk(Identity::from(7u64)));
}

#[test]
fn events_since_slices_the_log() {
    let mut session = started();
    session.take_shot(owner(), Point::new(1, 1)).unwrap();
    session.take_shot(owner(), Point::new(5, 5)).unwrap();
    assert_eq!(session.events_since(0).len(), 2);
    assert_eq!(session.events_since(1).len(), 1);
    assert!(session.events_since(2).is_empty());
    assert!(session.events_since(100).is_empty());
}

#[test]
fn replay_reproduces_the_session() {
    let mut session = started();
    session.take_shot(owner(), Point::new(1, 1)).unwrap();
    session.take_shot(owner(), Point::new(5, 5)).unwrap();
    session.take_shot(other(), Point::new(1, 2)).unwrap();
    session.finish_game(owner()).unwrap();

    let replayed = Session::replay(owner(), session.config(), session.history()).unwrap();
    assert_eq!(replayed, session);
}

#[test]
fn error_messages_match_reference_wording() {
    assert_eq!(GameError::GameNotStarted.to_string(), "Game has not started");
    assert!(GameError::InvalidShipCount {
        expected: 20,
        actual: 1
    }
    .to_string()
    .starts_with("Amount of cells do not match the expected"));
    assert!(GameError::NotActivePlayer {
        caller: other(),
        active: owner()
    }
    .to_string()
    .starts_with("Current player is not active"));
}
