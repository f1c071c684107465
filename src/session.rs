//! Binds a [`Game`] to the [`View`] that shows it.
//!
//! The session is the only caller of `View::paint`: once on [`Session::start`],
//! then after every move that changed the grid and after every reset.

use log::debug;
use rand::{rngs::StdRng, Rng};

use crate::engine::Move;
use crate::game::{Game, Snapshot};

/// Something that can show a snapshot.
pub trait View {
    type Error;

    fn paint(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error>;
}

/// A user action, from a key press or a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Move),
    Reset,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<V, R = StdRng> {
    game: Game<R>,
    view: V,
}

impl<V: View, R: Rng> Session<V, R> {
    pub fn new(game: Game<R>, view: V) -> Self {
        Self { game, view }
    }

    /// Paint the initial grid.
    pub fn start(&mut self) -> Result<(), V::Error> {
        self.view.paint(&self.game.snapshot())
    }

    pub fn handle(&mut self, command: Command) -> Result<Flow, V::Error> {
        match command {
            Command::Move(dir) => {
                let outcome = self.game.apply(dir);
                if outcome.moved {
                    self.view.paint(&self.game.snapshot())?;
                } else {
                    debug!("{dir} changed nothing");
                }
                Ok(Flow::Continue)
            }
            Command::Reset => {
                self.game.reset();
                self.view.paint(&self.game.snapshot())?;
                Ok(Flow::Continue)
            }
            Command::Quit => Ok(Flow::Quit),
        }
    }

    pub fn game(&self) -> &Game<R> {
        &self.game
    }

    pub fn view(&self) -> &V {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rules;
    use crate::engine::Grid;
    use crate::game::GameStatus;
    use rand::SeedableRng;
    use std::convert::Infallible;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<Snapshot>,
    }

    impl View for Recorder {
        type Error = Infallible;

        fn paint(&mut self, snapshot: &Snapshot) -> Result<(), Infallible> {
            self.frames.push(*snapshot);
            Ok(())
        }
    }

    struct Broken;

    impl View for Broken {
        type Error = &'static str;

        fn paint(&mut self, _: &Snapshot) -> Result<(), &'static str> {
            Err("screen gone")
        }
    }

    fn session(rows: [[u32; 2]; 2]) -> Session<Recorder> {
        let game = Game::with_grid(Grid::from_rows(rows).unwrap(), StdRng::seed_from_u64(2), Rules::default());
        Session::new(game, Recorder::default())
    }

    #[test]
    fn start_paints_once() {
        let mut s = session([[2, 0], [0, 0]]);
        s.start().unwrap();
        assert_eq!(s.view().frames.len(), 1);
        assert_eq!(s.view().frames[0].grid, s.game().grid());
    }

    #[test]
    fn paints_only_after_successful_moves() {
        let mut s = session([[2, 0], [0, 0]]);
        s.start().unwrap();
        assert_eq!(s.handle(Command::Move(Move::Left)), Ok(Flow::Continue));
        assert_eq!(s.view().frames.len(), 1);
        assert_eq!(s.handle(Command::Move(Move::Right)), Ok(Flow::Continue));
        assert_eq!(s.view().frames.len(), 2);
        let last = s.view().frames[1];
        assert_eq!(last.grid, s.game().grid());
        assert_eq!(last.moves, 1);
        assert!(last.last_spawn.is_some());
    }

    #[test]
    fn reset_repaints_fresh_grid() {
        let mut s = session([[2, 4], [4, 2]]);
        s.start().unwrap();
        assert_eq!(s.view().frames[0].status, GameStatus::Stuck);
        s.handle(Command::Reset).unwrap();
        assert_eq!(s.view().frames.len(), 2);
        assert_eq!(s.view().frames[1].status, GameStatus::Playable);
        assert_eq!(s.view().frames[1].grid.count_tiles(), 2);
    }

    #[test]
    fn quit_stops_without_painting() {
        let mut s = session([[2, 0], [0, 0]]);
        assert_eq!(s.handle(Command::Quit), Ok(Flow::Quit));
        assert!(s.view().frames.is_empty());
    }

    #[test]
    fn view_errors_propagate() {
        let game = Game::seeded(1, Rules::default());
        let mut s = Session::new(game, Broken);
        assert_eq!(s.start(), Err("screen gone"));
        assert_eq!(s.handle(Command::Reset), Err("screen gone"));
    }
}
