//! Line-stream seats
//!
//! A connected player is any pair of line reader and writer. Reading EOF or
//! failing to write means the player has gone. A line that is not UTF-8 is
//! only a malformed request.

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::TcpStream;

use checkers_core::{Color, GameError, Seat};

pub struct StreamSeat<R, W> {
    color: Color,
    name: String,
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> StreamSeat<R, W> {
    pub fn new(color: Color, name: impl Into<String>, reader: R, writer: W) -> Self {
        Self {
            color,
            name: name.into(),
            reader,
            writer,
        }
    }

    fn left(&self) -> GameError {
        GameError::PlayerLeft { color: self.color }
    }
}

impl StreamSeat<BufReader<TcpStream>, TcpStream> {
    /// Wrap an accepted socket.
    pub fn tcp(color: Color, stream: TcpStream) -> Result<Self, GameError> {
        let name = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| format!("player-{color}"));
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self::new(color, name, reader, stream))
    }
}

impl<R, W> Seat for StreamSeat<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn color(&self) -> Color {
        self.color
    }

    fn send(&mut self, line: &str) -> Result<(), GameError> {
        let written = writeln!(self.writer, "{line}").and_then(|()| self.writer.flush());
        written.map_err(|_| self.left())
    }

    fn receive(&mut self) -> Result<String, GameError> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => Err(self.left()),
            Ok(_) => Ok(line.trim_end_matches(['\r', '\n']).to_string()),
            // The bad line has been consumed; the next read starts clean.
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                Err(GameError::malformed("<invalid utf-8>"))
            }
            Err(_) => Err(self.left()),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::net::TcpListener;

    #[test]
    fn reads_lines_until_eof() {
        let input = Cursor::new("MOVE 7 15 6 13\r\nSKIP\n");
        let mut seat = StreamSeat::new(Color::Red, "test", input, Vec::new());

        assert_eq!(seat.receive().unwrap(), "MOVE 7 15 6 13");
        assert_eq!(seat.receive().unwrap(), "SKIP");
        assert!(matches!(
            seat.receive(),
            Err(GameError::PlayerLeft { color: Color::Red })
        ));
    }

    #[test]
    fn invalid_utf8_line_is_malformed_not_a_disconnect() {
        let input = Cursor::new(&b"\xff\xfe\nSKIP\n"[..]);
        let mut seat = StreamSeat::new(Color::Red, "test", input, Vec::new());

        assert!(matches!(seat.receive(), Err(GameError::MalformedRequest { .. })));
        assert_eq!(seat.receive().unwrap(), "SKIP");
        assert!(matches!(
            seat.receive(),
            Err(GameError::PlayerLeft { color: Color::Red })
        ));
    }

    #[test]
    fn send_appends_newline() {
        let mut seat = StreamSeat::new(Color::Blue, "test", Cursor::new(""), Vec::new());
        seat.send("WELCOME BLUE").unwrap();
        seat.send("YOU").unwrap();
        let written = String::from_utf8(seat.writer).unwrap();
        assert_eq!(written, "WELCOME BLUE\nYOU\n");
    }

    #[test]
    fn tcp_seat_talks_over_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = std::thread::spawn(move || {
            let stream = TcpStream::connect(addr).unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut greeting = String::new();
            reader.read_line(&mut greeting).unwrap();
            let mut writer = stream;
            writeln!(writer, "SKIP").unwrap();
            greeting
        });

        let (stream, _) = listener.accept().unwrap();
        let mut seat = StreamSeat::tcp(Color::Green, stream).unwrap();
        seat.send("WELCOME GREEN").unwrap();
        assert_eq!(seat.receive().unwrap(), "SKIP");
        assert_eq!(client.join().unwrap(), "WELCOME GREEN\n");

        // The client has hung up.
        assert!(seat.receive().is_err());
    }
}
