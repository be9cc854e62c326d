//! Integration tests for the game engine

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tetrecs::core::scoring::level_threshold;
use tetrecs::core::{
    timer_delay_ms, EventRecorder, Game, GameConfig, GameEvent, GamePhase, ManualTimer,
    PieceQueue, Placement, QueuedPieceSource, ScoringRule,
};
use tetrecs::types::{ClearEvent, Coordinate, GameAction, PieceKind, SoundEvent};

const LINE: u32 = 0;
const DOT: u32 = 3;
const SQUARE: u32 = 4;
const X: u32 = 10;

/// Game fed from a fixed piece sequence, with handles on its timer and events
fn scripted(indices: &[u32], config: GameConfig) -> (Game, ManualTimer, EventRecorder) {
    let queue = PieceQueue::new();
    for &i in indices {
        queue.add_piece(i).unwrap();
    }
    let timer = ManualTimer::new();
    let recorder = EventRecorder::new();
    let mut game = Game::with_config(QueuedPieceSource::new(queue, || {}), timer.clone(), config);
    game.add_listener(recorder.clone());
    game.start().unwrap();
    (game, timer, recorder)
}

fn dots(n: usize) -> Vec<u32> {
    vec![DOT; n]
}

fn place(game: &mut Game, x: i8, y: i8) -> Placement {
    let placement = game.attempt_placement(x, y).unwrap();
    assert!(placement.is_placed(), "placement at ({}, {}) rejected", x, y);
    placement
}

fn cleared_sets(recorder: &EventRecorder) -> Vec<usize> {
    recorder
        .events()
        .into_iter()
        .filter_map(|e| match e {
            GameEvent::LinesCleared(cells) => Some(cells.len()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_game_lifecycle() {
    let mut game = Game::solo(12345);
    assert_eq!(game.phase(), GamePhase::Idle);
    assert!(game.current_piece().is_none());

    game.start().unwrap();
    assert!(game.is_running());
    assert!(game.current_piece().is_some());
    assert!(game.following_piece().is_some());
    assert_eq!(game.lives(), 3);
    assert_eq!(game.multiplier(), 1);

    game.stop();
    assert_eq!(game.phase(), GamePhase::Stopped);
    game.stop();
}

#[test]
fn test_row_completed_by_third_placement() {
    let (mut game, _, recorder) = scripted(&[DOT, DOT, LINE, DOT, DOT], GameConfig::default());

    place(&mut game, 0, 2);
    place(&mut game, 1, 2);
    assert_eq!(game.multiplier(), 1);
    assert_eq!(game.score(), 0);

    // line turned flat covers x = 2..=4 on row 2
    game.rotate_current_piece(true).unwrap();
    assert_eq!(game.current_piece().unwrap().kind(), PieceKind::Line);
    let placement = place(&mut game, 3, 2);

    assert_eq!(
        placement,
        Placement::Placed {
            clear: Some(ClearEvent {
                lines_cleared: 1,
                blocks_cleared: 5,
                score_delta: 50,
                multiplier: 1,
            }),
            level_up: false,
        }
    );
    assert_eq!(game.score(), 50);
    assert_eq!(game.multiplier(), 2);
    assert_eq!(game.board().filled_count(), 0);
    assert_eq!(cleared_sets(&recorder), vec![5]);
    assert_eq!(recorder.count(|e| *e == GameEvent::Sound(SoundEvent::Clear)), 1);
}

#[test]
fn test_row_and_column_together_score_nine_blocks() {
    let (mut game, _, recorder) = scripted(&dots(12), GameConfig::default());

    for (x, y) in [(2, 0), (2, 1), (2, 3), (2, 4), (0, 2), (1, 2), (3, 2), (4, 2)] {
        place(&mut game, x, y);
    }
    assert_eq!(game.score(), 0);

    let placement = place(&mut game, 2, 2);
    let Placement::Placed { clear: Some(clear), .. } = placement else {
        panic!("expected a clear, got {:?}", placement);
    };
    assert_eq!(clear.lines_cleared, 2);
    assert_eq!(clear.blocks_cleared, 9);
    assert_eq!(game.score(), 2 * 9 * 10);
    assert_eq!(game.multiplier(), 2);
    assert_eq!(cleared_sets(&recorder), vec![9]);
    assert_eq!(game.board().filled_count(), 0);
}

fn two_by_two_clear(rule: ScoringRule) -> Game {
    let mut pieces = dots(12);
    pieces.push(SQUARE);
    pieces.extend(dots(3));
    let config = GameConfig {
        scoring: rule,
        ..GameConfig::default()
    };
    let (mut game, _, _) = scripted(&pieces, config);

    for x in 2..5 {
        place(&mut game, x, 0);
        place(&mut game, x, 1);
    }
    for y in 2..5 {
        place(&mut game, 0, y);
        place(&mut game, 1, y);
    }
    assert_eq!(game.current_piece().unwrap().kind(), PieceKind::Square);
    // the square's box hangs off the top-left corner
    place(&mut game, 1, 1);
    game
}

#[test]
fn test_classic_rule_keeps_intersection_formula() {
    let game = two_by_two_clear(ScoringRule::Classic);
    let clear = game.last_clear().unwrap();
    assert_eq!(clear.lines_cleared, 4);
    assert_eq!(clear.blocks_cleared, 19);
    assert_eq!(game.score(), 4 * 19 * 10);
}

#[test]
fn test_distinct_cells_rule_counts_union() {
    let game = two_by_two_clear(ScoringRule::DistinctCells);
    let clear = game.last_clear().unwrap();
    assert_eq!(clear.lines_cleared, 4);
    assert_eq!(clear.blocks_cleared, 16);
    assert_eq!(game.score(), 4 * 16 * 10);
}

#[test]
fn test_multiplier_grows_on_consecutive_clears() {
    let (mut game, _, _) = scripted(&dots(14), GameConfig::default());

    for x in 0..4 {
        place(&mut game, x, 0);
        place(&mut game, x, 1);
    }
    assert_eq!(game.multiplier(), 1);

    place(&mut game, 4, 0);
    assert_eq!(game.score(), 50);
    assert_eq!(game.multiplier(), 2);

    place(&mut game, 4, 1);
    assert_eq!(game.last_clear().unwrap().multiplier, 2);
    assert_eq!(game.score(), 50 + 100);
    assert_eq!(game.multiplier(), 3);

    // no clear resets the streak
    place(&mut game, 0, 4);
    assert_eq!(game.multiplier(), 1);
    assert_eq!(game.score(), 150);
}

#[test]
fn test_level_up_shortens_timer() {
    let (mut game, timer, recorder) = scripted(&dots(110), GameConfig::default());

    let mut level_ups = 0;
    for _ in 0..20 {
        for x in 0..5 {
            if let Placement::Placed { level_up: true, .. } = place(&mut game, x, 0) {
                level_ups += 1;
            }
        }
    }

    assert_eq!(game.score(), level_threshold(0));
    assert_eq!(game.level(), 1);
    assert_eq!(level_ups, 1);
    assert_eq!(recorder.count(|e| *e == GameEvent::Sound(SoundEvent::LevelUp)), 1);

    place(&mut game, 2, 2);
    assert_eq!(timer.pending(), Some(Duration::from_millis(11_500)));
    assert_eq!(game.timer_delay(), Duration::from_millis(11_500));
}

#[test]
fn test_one_check_raises_level_by_one() {
    let mut pieces = dots(46);
    pieces.push(X);
    pieces.extend(dots(4));
    let (mut game, _, _) = scripted(&pieces, GameConfig::default());

    // six single-row clears, each worth 50
    for _ in 0..6 {
        for x in 0..5 {
            place(&mut game, x, 0);
        }
    }
    assert_eq!(game.score(), 300);
    assert_eq!(game.multiplier(), 1);

    // rows 1..=3 and columns 1..=3 left open only where the X lands
    #[rustfmt::skip]
    let setup = [
        (1, 0), (2, 0), (3, 0),
        (0, 1), (2, 1), (4, 1),
        (0, 2), (1, 2), (3, 2), (4, 2),
        (0, 3), (2, 3), (4, 3),
        (1, 4), (2, 4), (3, 4),
    ];
    for (x, y) in setup {
        place(&mut game, x, y);
    }
    assert_eq!(game.score(), 300);
    assert_eq!(game.current_piece().unwrap().kind(), PieceKind::X);

    let placement = place(&mut game, 2, 2);
    let Placement::Placed { clear: Some(clear), level_up } = placement else {
        panic!("expected a clear, got {:?}", placement);
    };
    assert_eq!(clear.lines_cleared, 6);
    assert_eq!(clear.score_delta, 6 * 29 * 10);
    assert_eq!(game.score(), 2_040);
    assert!(game.score() >= level_threshold(1));
    assert!(level_up);
    assert_eq!(game.level(), 1);

    // the next check catches up by one more
    assert_eq!(place(&mut game, 0, 0), Placement::Placed { clear: None, level_up: true });
    assert_eq!(game.level(), 2);
    assert_eq!(place(&mut game, 4, 4), Placement::Placed { clear: None, level_up: false });
    assert_eq!(game.level(), 2);
}

#[test]
fn test_timer_delay_floors_at_level_nineteen() {
    let mut previous = timer_delay_ms(0);
    assert_eq!(previous, 12_000);
    for level in 1..100 {
        let delay = timer_delay_ms(level);
        assert!(delay <= previous);
        assert!(delay >= 2_500);
        previous = delay;
    }
    assert_eq!(timer_delay_ms(18), 3_000);
    assert_eq!(timer_delay_ms(19), 2_500);
    assert_eq!(timer_delay_ms(u32::MAX), 2_500);
}

#[test]
fn test_expiry_costs_life_and_piece() {
    let (mut game, timer, _) = scripted(&[DOT, LINE, SQUARE, DOT], GameConfig::default());

    assert_eq!(timer.schedule_count(), 1);
    assert!(timer.take_expiry());
    game.on_action_timer_expiry().unwrap();

    assert_eq!(game.lives(), 2);
    assert_eq!(game.multiplier(), 1);
    assert_eq!(game.current_piece().unwrap().kind(), PieceKind::Line);
    assert_eq!(game.following_piece().unwrap().kind(), PieceKind::Square);
    assert_eq!(timer.schedule_count(), 2);
    assert_eq!(timer.pending(), Some(Duration::from_millis(12_000)));
}

#[test]
fn test_lives_run_out_exactly_once() {
    let timer = ManualTimer::new();
    let recorder = EventRecorder::new();
    let mut game = Game::new(tetrecs::core::RandomPieceSource::new(7), timer.clone());
    game.add_listener(recorder.clone());
    game.start().unwrap();

    let lives: Rc<RefCell<Vec<i32>>> = Rc::default();
    let log = Rc::clone(&lives);
    game.on_lives_change(move |l| log.borrow_mut().push(l));

    for _ in 0..6 {
        game.on_action_timer_expiry().unwrap();
    }

    assert_eq!(*lives.borrow(), vec![2, 1, 0, -1]);
    assert!(game.is_game_over());
    assert_eq!(recorder.count(|e| *e == GameEvent::GameOver), 1);
    assert!(timer.pending().is_none());
    assert_eq!(
        game.attempt_placement(2, 2),
        Err(tetrecs::core::GameError::NotRunning(GamePhase::GameOver))
    );
}

#[test]
fn test_rejected_placement_changes_nothing() {
    let (mut game, timer, recorder) = scripted(&[SQUARE, DOT, DOT], GameConfig::default());
    recorder.drain();
    let before = game.snapshot();

    assert_eq!(game.attempt_placement(0, 0), Ok(Placement::Rejected));
    assert_eq!(game.attempt_placement(9, 9), Ok(Placement::Rejected));

    assert_eq!(game.snapshot(), before);
    assert_eq!(timer.schedule_count(), 1);
    assert_eq!(recorder.count(|e| *e == GameEvent::Sound(SoundEvent::Fail)), 2);
}

#[test]
fn test_placement_event_order() {
    let (mut game, _, recorder) = scripted(&[DOT, LINE, SQUARE], GameConfig::default());
    recorder.drain();

    place(&mut game, 2, 2);
    assert_eq!(
        recorder.events(),
        vec![
            GameEvent::Sound(SoundEvent::Place),
            GameEvent::TimerRestarted(Duration::from_millis(12_000)),
            GameEvent::NextPiece(tetrecs::core::Piece::new(PieceKind::Line)),
            GameEvent::FollowingPiece(tetrecs::core::Piece::new(PieceKind::Square)),
        ]
    );
}

#[test]
fn test_actions_drive_aim_and_placement() {
    let (mut game, _, _) = scripted(&dots(4), GameConfig::default());

    for action in [GameAction::AimRight, GameAction::AimRight, GameAction::AimDown] {
        game.apply_action(action).unwrap();
    }
    assert_eq!(game.aim(), Coordinate::new(2, 1));

    game.apply_action(GameAction::Place).unwrap();
    assert!(game.board().is_occupied(2, 1));

    game.apply_action(GameAction::Swap).unwrap();
    game.apply_action(GameAction::RotateCcw).unwrap();
    game.apply_action(GameAction::Leave).unwrap();
    assert_eq!(game.phase(), GamePhase::Stopped);
}

#[test]
fn test_observables_report_changes_only() {
    let (mut game, _, _) = scripted(&dots(8), GameConfig::default());

    let scores: Rc<RefCell<Vec<u32>>> = Rc::default();
    let log = Rc::clone(&scores);
    game.on_score_change(move |s| log.borrow_mut().push(s));
    let aims: Rc<RefCell<Vec<Coordinate>>> = Rc::default();
    let log = Rc::clone(&aims);
    game.on_aim_change(move |c| log.borrow_mut().push(c));

    for x in 0..5 {
        place(&mut game, x, 3);
    }
    game.move_aim(-1, -1);
    game.move_aim(1, 0);

    assert_eq!(*scores.borrow(), vec![50]);
    assert_eq!(*aims.borrow(), vec![Coordinate::new(1, 0)]);
}

#[test]
fn test_summary_counts_progress() {
    let (mut game, _, _) = scripted(&dots(8), GameConfig::default());
    for x in 0..5 {
        place(&mut game, x, 4);
    }
    let summary = game.summary();
    assert_eq!(summary.score, 50);
    assert_eq!(summary.pieces_placed, 5);
    assert_eq!(summary.lines_cleared, 1);
    assert_eq!(summary.lives, 3);

    let snapshot = game.snapshot();
    assert!(snapshot.playable());
    assert_eq!(snapshot.timer_delay_ms, 12_000);
    assert_eq!(snapshot.board, [[0; 5]; 5]);
}
