use super::*;
use checkers_core::{frame, DefaultMovement};

fn c(x: i32, y: i32) -> Coord {
    Coord::new(x, y)
}

fn red_bot(seed: u64) -> GreedyBot {
    GreedyBot::new(Color::Red, Variant::Default, 2, Duration::ZERO, seed).unwrap()
}

fn board_line(board: &Board) -> String {
    ServerNotice::Board(board.pieces()).to_string()
}

fn layout(pieces: &[(Color, Coord)]) -> Board {
    let mut board = create_board(Variant::Default, 2).unwrap();
    board.load_pieces(pieces).unwrap();
    board
}

#[test]
fn greedy_bot_opens_with_productive_legal_move() {
    let server = create_board(Variant::Default, 2).unwrap();
    let mut bot = red_bot(1);

    bot.send("WELCOME RED").unwrap();
    let start = frame(&[ServerNotice::Start, ServerNotice::Board(server.pieces())]);
    bot.send(&start).unwrap();
    bot.send("YOU").unwrap();

    let reply = ClientRequest::parse_line(&bot.receive().unwrap()).unwrap();
    let ClientRequest::Move { from, to } = reply else {
        panic!("expected a move, got {reply}");
    };

    let rules = DefaultMovement::default();
    let class = rules.classify(&server, from, to, &TurnState::new());
    assert!(class.is_legal());
    assert_eq!(server.color_at(from).unwrap(), Color::Red);
    assert!(to.distance(c(7, 1)) < from.distance(c(7, 1)));
}

#[test]
fn greedy_bot_is_reproducible_per_seed() {
    let server = create_board(Variant::Default, 2).unwrap();
    let mut replies = Vec::new();
    for _ in 0..2 {
        let mut bot = red_bot(42);
        bot.send(&board_line(&server)).unwrap();
        bot.send("YOU").unwrap();
        replies.push(bot.receive().unwrap());
    }
    assert_eq!(replies[0], replies[1]);
}

#[test]
fn greedy_bot_continues_jump_chain() {
    let mut server = layout(&[
        (Color::Red, c(7, 13)),
        (Color::Green, c(7, 12)),
        (Color::Green, c(7, 10)),
    ]);
    let rules = DefaultMovement::default();
    let mut bot = red_bot(3);

    bot.send(&board_line(&server)).unwrap();
    bot.send("YOU").unwrap();
    assert_eq!(bot.receive().unwrap(), "MOVE 7 13 8 11");

    rules.apply(&mut server, c(7, 13), c(8, 11)).unwrap();
    bot.send(&format!("OK@{}", board_line(&server))).unwrap();
    assert_eq!(bot.receive().unwrap(), "MOVE 8 11 7 9");

    // Nothing left to hop over, and the way back is closed.
    rules.apply(&mut server, c(8, 11), c(7, 9)).unwrap();
    bot.send(&format!("OK@{}", board_line(&server))).unwrap();
    assert_eq!(bot.receive().unwrap(), "SKIP");
    assert_eq!(bot.stall_count(), 0);
}

#[test]
fn greedy_bot_enters_stray_mode_after_two_stalls() {
    let settled = layout(&[
        (Color::Red, c(7, 1)),
        (Color::Red, c(7, 2)),
        (Color::Green, c(7, 17)),
    ]);
    let mut bot = red_bot(5);
    bot.send(&board_line(&settled)).unwrap();

    // Every hop moves away from the apex.
    bot.send("YOU").unwrap();
    assert!(bot.candidates().iter().all(|m| m.score <= 0.0));
    assert!(!bot.candidates().is_empty());
    assert_eq!(bot.receive().unwrap(), "SKIP");
    assert_eq!(bot.stall_count(), 1);
    assert!(!bot.is_stray());

    bot.send("STOP").unwrap();
    bot.send("YOU").unwrap();
    assert_eq!(bot.receive().unwrap(), "SKIP");
    assert!(bot.is_stray());
    assert_eq!(bot.target(), c(6, 2));

    // Pieces already on home cells are left out.
    assert!(bot.candidates().is_empty());
}

#[test]
fn stray_bot_only_moves_pieces_outside_home() {
    let mut bot = red_bot(9);
    let home = layout(&[(Color::Red, c(7, 1)), (Color::Red, c(7, 2))]);
    bot.send(&board_line(&home)).unwrap();
    for _ in 0..2 {
        bot.send("YOU").unwrap();
        assert_eq!(bot.receive().unwrap(), "SKIP");
    }
    assert!(bot.is_stray());

    let straggler = layout(&[
        (Color::Red, c(7, 1)),
        (Color::Red, c(7, 2)),
        (Color::Red, c(7, 9)),
    ]);
    bot.send(&board_line(&straggler)).unwrap();
    bot.send("YOU").unwrap();

    let candidates = bot.candidates();
    assert!(!candidates.is_empty());
    assert!(candidates.iter().all(|m| m.from == c(7, 9)));

    let reply = ClientRequest::parse_line(&bot.receive().unwrap()).unwrap();
    assert!(matches!(reply, ClientRequest::Move { from, .. } if from == c(7, 9)));
    assert_eq!(bot.stall_count(), 0);
    assert_eq!(bot.target(), c(6, 2));
}

#[test]
fn greedy_bot_passes_after_refusal() {
    let mut bot = red_bot(11);
    let start = create_board(Variant::Default, 2).unwrap();
    bot.send(&board_line(&start)).unwrap();
    bot.send("YOU").unwrap();
    assert!(bot.receive().unwrap().starts_with("MOVE"));

    bot.send("NOK").unwrap();
    assert_eq!(bot.receive().unwrap(), "SKIP");
    assert_eq!(bot.stall_count(), 0);
}

#[test]
fn greedy_bot_mirrors_kings() {
    let mut bot = GreedyBot::new(Color::Red, Variant::Diamond, 2, Duration::ZERO, 0).unwrap();
    assert!(bot.board().is_king(c(7, 17)));

    bot.send("BOARD RED 5 9 RED 6 9 GREEN 7 9@KINGS 6 9").unwrap();
    assert!(bot.board().is_king(c(6, 9)));
    assert!(!bot.board().is_king(c(7, 17)));
    assert_eq!(bot.board().color_at(c(7, 17)).unwrap(), Color::None);
}

#[test]
fn greedy_bot_rejects_unknown_colour() {
    assert!(GreedyBot::new(Color::None, Variant::Default, 2, Duration::ZERO, 0).is_err());
}

#[test]
fn greedy_bot_follows_chain_origin_rule() {
    // Red chained (8,11) -> (9,9) -> (7,9); (7,10) still bridges back home.
    let board = layout(&[
        (Color::Red, c(7, 9)),
        (Color::Green, c(7, 10)),
        (Color::Green, c(8, 10)),
        (Color::Green, c(8, 9)),
    ]);
    let returns_to_origin = |bot: &mut GreedyBot| {
        bot.send(&board_line(&board)).unwrap();
        bot.send("YOU").unwrap();
        bot.turn.record(c(8, 11), c(9, 9), MoveClass::Jump);
        bot.turn.record(c(9, 9), c(7, 9), MoveClass::Jump);
        bot.candidates().iter().any(|m| m.to == c(8, 11))
    };

    let mut strict = red_bot(13).with_backtrack(BacktrackRule::ChainOrigin);
    assert!(returns_to_origin(&mut red_bot(13)));
    assert!(!returns_to_origin(&mut strict));
}
