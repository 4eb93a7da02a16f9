use super::*;

use std::collections::VecDeque;
use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};

use checkers_core::arm_cells;

use crate::records::MemoryMoveStore;
use crate::seat::StreamSeat;

type Log = Arc<Mutex<Vec<String>>>;

/// A seat that answers from a fixed script and remembers what it was sent.
/// Once the script runs dry it behaves like a closed connection.
struct ScriptedSeat {
    color: Color,
    replies: VecDeque<String>,
    log: Log,
}

impl ScriptedSeat {
    fn boxed(color: Color, replies: &[&str]) -> (Box<dyn Seat>, Log) {
        let log = Log::default();
        let seat = ScriptedSeat {
            color,
            replies: replies.iter().map(|r| r.to_string()).collect(),
            log: Arc::clone(&log),
        };
        (Box::new(seat), log)
    }
}

impl Seat for ScriptedSeat {
    fn color(&self) -> Color {
        self.color
    }

    fn send(&mut self, line: &str) -> Result<(), GameError> {
        self.log.lock().unwrap().push(line.to_string());
        Ok(())
    }

    fn receive(&mut self) -> Result<String, GameError> {
        self.replies
            .pop_front()
            .ok_or(GameError::PlayerLeft { color: self.color })
    }
}

struct FailingStore;

impl MoveStore for FailingStore {
    fn begin(&mut self, _info: &MatchInfo) -> Result<(), GameError> {
        Err(GameError::persistence("disk full"))
    }

    fn record(&mut self, _record: &MoveRecord) -> Result<(), GameError> {
        Err(GameError::persistence("disk full"))
    }

    fn matches(&self) -> Result<Vec<MatchInfo>, GameError> {
        Ok(Vec::new())
    }

    fn moves(&self, _match_id: Uuid) -> Result<Vec<MoveRecord>, GameError> {
        Ok(Vec::new())
    }
}

fn sent(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn count(log: &Log, line: &str) -> usize {
    sent(log).iter().filter(|l| *l == line).count()
}

fn c(x: i32, y: i32) -> Coord {
    Coord::new(x, y)
}

fn two_seats(variant: Variant, red: &[&str], green: &[&str]) -> (Coordinator, Log, Log) {
    let (red_seat, red_log) = ScriptedSeat::boxed(Color::Red, red);
    let (green_seat, green_log) = ScriptedSeat::boxed(Color::Green, green);
    let coordinator =
        Coordinator::new(MatchInfo::new(variant, 2, 0), vec![red_seat, green_seat]).unwrap();
    (coordinator, red_log, green_log)
}

/// Red one step short of home: nine pieces in the green arm, one at (8,5).
fn red_almost_home() -> Vec<(Color, Coord)> {
    arm_cells(Color::Green)
        .iter()
        .filter(|&&cell| cell != c(8, 4))
        .map(|&cell| (Color::Red, cell))
        .chain([(Color::Red, c(8, 5))])
        .collect()
}

#[test]
fn test_match_opening_sequence() {
    let (coordinator, red, green) = two_seats(Variant::Default, &["SKIP"], &[]);
    let mut coordinator = coordinator.with_max_turns(1);
    let summary = coordinator.run().unwrap();
    assert!(!summary.completed);
    assert_eq!(count(&green, "YOU"), 0);

    let red = sent(&red);
    assert_eq!(red[0], "WELCOME RED");
    assert!(red[1].starts_with("START@BOARD "));
    assert_eq!(red[2], "YOU");
    assert_eq!(red[3], "STOP");
    assert!(red[4].starts_with("BOARD "));

    let green = sent(&green);
    assert_eq!(green[0], "WELCOME GREEN");
    assert_eq!(green[1], red[1]);
}

#[test]
fn test_bad_requests_get_nok_and_same_seat_retries() {
    let (coordinator, red, green) = two_seats(
        Variant::Default,
        &[
            "MOVE 1 1 2 2",
            "MOVE 5 4 5 5",
            "HELLO",
            "MOVE 7 15 6 13@SKIP",
            "MOVE 7 15 6 13",
        ],
        &["SKIP"],
    );
    let mut coordinator = coordinator.with_max_turns(2);
    let summary = coordinator.run().unwrap();

    assert_eq!(summary.moves, 1);
    assert!(summary.placements.is_empty());
    assert!(!summary.completed);
    assert_eq!(coordinator.board().color_at(c(6, 13)).unwrap(), Color::Red);
    assert_eq!(coordinator.board().color_at(c(7, 15)).unwrap(), Color::None);

    let red_lines = sent(&red);
    assert_eq!(&red_lines[2..7], ["YOU", "NOK", "NOK", "NOK", "NOK"]);
    // No follow-up jump from (6,13), so the chain ends on its own.
    assert_eq!(red_lines[7], "OK@STOP");
    assert!(red_lines[8].starts_with("BOARD "));
    assert_eq!(count(&red, "YOU"), 1);

    let green_lines = sent(&green);
    assert_eq!(green_lines[3], "YOU");
    assert_eq!(green_lines[4], "STOP");
    assert!(green_lines[5].starts_with("BOARD "));
}

/// Writer half of a stream seat whose output the test can still read.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_garbled_line_gets_nok_over_a_stream() {
    let red_out = SharedBuf::default();
    let red = StreamSeat::new(
        Color::Red,
        "red",
        Cursor::new(&b"\xff\xfe\nSKIP\n"[..]),
        red_out.clone(),
    );
    let green = StreamSeat::new(
        Color::Green,
        "green",
        Cursor::new(&b"SKIP\n"[..]),
        SharedBuf::default(),
    );
    let seats: Vec<Box<dyn Seat>> = vec![Box::new(red), Box::new(green)];
    let mut coordinator = Coordinator::new(MatchInfo::new(Variant::Default, 2, 0), seats)
        .unwrap()
        .with_max_turns(2);

    let summary = coordinator.run().unwrap();
    assert_eq!(summary.moves, 0);

    let output = String::from_utf8(red_out.0.lock().unwrap().clone()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(&lines[2..5], ["YOU", "NOK", "STOP"]);
    assert!(!output.contains("ERROR"));
}

#[test]
fn test_step_ends_turn() {
    let (coordinator, red, _green) = two_seats(Variant::Default, &["MOVE 5 14 5 13"], &["SKIP"]);
    let mut coordinator = coordinator.with_max_turns(2);
    coordinator.run().unwrap();

    let red = sent(&red);
    assert_eq!(red[3], "OK@STOP");
    assert!(red[4].contains("RED 5 13"));
}

#[test]
fn test_jump_chain_keeps_the_turn() {
    let (coordinator, red, green) = two_seats(
        Variant::Default,
        &[
            "MOVE 7 15 6 13",
            "MOVE 8 15 7 13",
            "CLUES 7 13",
            "CLUES 5 14",
            "CLUES 7 1",
            "MOVE 7 13 5 13",
        ],
        &["SKIP"],
    );
    let mut coordinator = coordinator.with_max_turns(3);
    let summary = coordinator.run().unwrap();
    assert_eq!(summary.moves, 3);

    let red = sent(&red);
    assert_eq!(red[6], "YOU");
    assert!(red[7].starts_with("OK@BOARD "));
    assert_eq!(red[8], "CLUES 5 13");
    // Only the pawn that just jumped may move.
    assert_eq!(red[9], "CLUES");
    assert_eq!(red[10], "NOK");
    assert_eq!(red[11], "OK@STOP");
    assert_eq!(red.len(), 13);

    let green = sent(&green);
    assert!(green.iter().all(|l| !l.starts_with("OK")));
    assert_eq!(green.iter().filter(|l| l.starts_with("BOARD ")).count(), 4);
}

#[test]
fn test_chain_can_be_declined() {
    let (coordinator, red, _green) = two_seats(
        Variant::Default,
        &["MOVE 7 15 6 13", "MOVE 8 15 7 13", "SKIP"],
        &["SKIP"],
    );
    let mut coordinator = coordinator.with_max_turns(3);
    coordinator.run().unwrap();

    let red = sent(&red);
    assert!(red[7].starts_with("OK@BOARD "));
    assert_eq!(red[8], "STOP");
    assert!(red[9].starts_with("BOARD "));
}

#[test]
fn test_player_left_notifies_everyone() {
    let (mut coordinator, red, green) = two_seats(Variant::Default, &[], &[]);
    let err = coordinator.run().unwrap_err();
    assert!(matches!(err, GameError::PlayerLeft { color: Color::Red }));

    for log in [&red, &green] {
        assert_eq!(
            sent(log).last().map(String::as_str),
            Some("ERROR Someone left the game")
        );
    }
}

#[test]
fn test_single_seat_wins_and_match_ends() {
    let (seat, log) = ScriptedSeat::boxed(Color::Red, &["MOVE 8 5 8 4"]);
    let mut coordinator =
        Coordinator::new(MatchInfo::new(Variant::Default, 1, 0), vec![seat]).unwrap();
    coordinator.board.load_pieces(&red_almost_home()).unwrap();

    let summary = coordinator.run().unwrap();
    assert!(summary.completed);
    assert_eq!(summary.placements, vec![(Color::Red, 1)]);
    assert_eq!(summary.moves, 1);

    let lines = sent(&log);
    assert_eq!(lines[2], "YOU");
    assert_eq!(lines[3], "END 1");
    assert!(lines[4].starts_with("BOARD "));
    assert_eq!(lines.len(), 5);
}

#[test]
fn test_finished_seat_is_skipped() {
    let (coordinator, red, green) =
        two_seats(Variant::Default, &["MOVE 8 5 8 4"], &["SKIP", "SKIP"]);
    let mut coordinator = coordinator.with_max_turns(3);
    let mut layout = red_almost_home();
    layout.push((Color::Green, c(7, 9)));
    coordinator.board.load_pieces(&layout).unwrap();

    let summary = coordinator.run().unwrap();
    assert_eq!(summary.placements, vec![(Color::Red, 1)]);
    assert!(!summary.completed);
    assert_eq!(count(&red, "YOU"), 1);
    assert_eq!(count(&green, "YOU"), 2);
}

#[test]
fn test_seat_colors_must_match_layout() {
    let (green, _) = ScriptedSeat::boxed(Color::Green, &[]);
    let (red, _) = ScriptedSeat::boxed(Color::Red, &[]);
    let err = Coordinator::new(MatchInfo::new(Variant::Default, 2, 0), vec![green, red])
        .err()
        .unwrap();
    assert!(matches!(err, GameError::Configuration { .. }));

    let seats: Vec<Box<dyn Seat>> = (0..5)
        .map(|_| ScriptedSeat::boxed(Color::Red, &[]).0)
        .collect();
    assert!(Coordinator::new(MatchInfo::new(Variant::Default, 5, 0), seats).is_err());

    let (red, _) = ScriptedSeat::boxed(Color::Red, &[]);
    assert!(Coordinator::new(MatchInfo::new(Variant::Default, 2, 0), vec![red]).is_err());
}

#[test]
fn test_diamond_start_lists_kings() {
    let (coordinator, red, _green) = two_seats(Variant::Diamond, &["SKIP"], &[]);
    let mut coordinator = coordinator.with_max_turns(1);
    coordinator.run().unwrap();

    let red = sent(&red);
    assert!(red[1].starts_with("START@BOARD "));
    assert!(red[1].ends_with("@KINGS 7 1 7 17"));
}

#[test]
fn test_moves_are_recorded() {
    let store = MemoryMoveStore::new();
    let (coordinator, _red, _green) =
        two_seats(Variant::Default, &["MOVE 5 14 5 13"], &["MOVE 5 4 5 5"]);
    let mut coordinator = coordinator
        .with_store(Box::new(store.clone()))
        .with_max_turns(2);
    coordinator.run().unwrap();

    let matches = store.matches().unwrap();
    assert_eq!(matches, vec![coordinator.info().clone()]);

    let moves = store.moves(coordinator.info().match_id).unwrap();
    let summary: Vec<(u32, Color, Coord, Coord)> = moves
        .iter()
        .map(|m| (m.seq, m.color, m.from, m.to))
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, Color::Red, c(5, 14), c(5, 13)),
            (2, Color::Green, c(5, 4), c(5, 5)),
        ]
    );
}

#[test]
fn test_store_failure_does_not_stop_match() {
    let (coordinator, _red, _green) = two_seats(Variant::Default, &["MOVE 5 14 5 13"], &["SKIP"]);
    let mut coordinator = coordinator
        .with_store(Box::new(FailingStore))
        .with_max_turns(2);
    let summary = coordinator.run().unwrap();
    assert_eq!(summary.moves, 1);
}
