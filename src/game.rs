use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::GameConfig;
use crate::engine::{GameEngine, TickOutcome};
use crate::input::{command_for, is_ctrl_c, Command};
use crate::scheduler::Ticker;
use crate::surface::Frontend;
use crate::term::TermManager;

const GAME_OVER_HINT: &str = "r: play again  q: quit";

/// What the frontend has to do after a command was handled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
    Paused,
    Resumed,
    Restarted,
}

/// Commands and tick pacing for one engine, independent of the frontend.
pub struct Driver<F: Frontend, R: Rng> {
    engine: GameEngine<F, R>,
    ticker: Ticker,
    paused: bool,
}

impl<F: Frontend, R: Rng> Driver<F, R> {
    pub fn new(engine: GameEngine<F, R>) -> Self {
        let ticker = Ticker::new(Duration::from_millis(engine.config().tick_ms));
        Driver { engine, ticker, paused: false }
    }

    pub fn start(&mut self, now: Instant) {
        self.engine.start();
        self.ticker.start(now);
    }

    pub fn handle(&mut self, cmd: Command, now: Instant) -> Control {
        match cmd {
            Command::Quit => {
                info!("quit with score {}", self.engine.score());
                Control::Quit
            }
            Command::Turn(dir) => {
                if !self.paused {
                    self.engine.change_direction(dir);
                }
                Control::Continue
            }
            Command::Reset => {
                self.paused = false;
                self.engine.reset();
                self.ticker.start(now);
                Control::Restarted
            }
            Command::Pause => self.toggle_pause(now),
        }
    }

    /// Runs a tick if one is due. Game over stops the ticker until the next reset.
    pub fn step(&mut self, now: Instant) -> Option<TickOutcome> {
        if self.paused || !self.ticker.take_due(now) {
            return None;
        }

        let outcome = self.engine.tick();
        if let TickOutcome::GameOver(_) = outcome {
            self.ticker.stop();
        }
        Some(outcome)
    }

    pub fn time_to_next_tick(&self, now: Instant) -> Duration {
        self.ticker.remaining(now)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_armed()
    }

    pub fn engine(&self) -> &GameEngine<F, R> {
        &self.engine
    }

    pub fn frontend_mut(&mut self) -> &mut F {
        self.engine.frontend_mut()
    }

    fn toggle_pause(&mut self, now: Instant) -> Control {
        if !self.engine.is_running() {
            return Control::Continue;
        }

        self.paused = !self.paused;
        info!("paused: {}", self.paused);

        if self.paused {
            self.ticker.stop();
            Control::Paused
        } else {
            self.ticker.start(now);
            Control::Resumed
        }
    }
}

/// Drives the game on the terminal: intro, tick loop, pause, reset, quit.
pub struct SnakeGame {
    driver: Driver<TermManager, StdRng>,
}

impl SnakeGame {
    pub fn new(config: GameConfig, bell: bool) -> Result<Self> {
        let term = TermManager::new(&config, bell)?;
        let engine = GameEngine::new(config, term, StdRng::from_entropy());
        Ok(SnakeGame { driver: Driver::new(engine) })
    }

    /// Takes over the terminal until the player quits. The terminal is
    /// restored even when setup or the game loop fails.
    pub fn run(&mut self) -> Result<()> {
        guarded(self, |g| g.term().setup(), Self::play, |g| g.term().restore())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn play(&mut self) -> Result<()> {
        if !self.show_intro()? {
            return Ok(());
        }

        self.term().clear()?;
        self.driver.start(Instant::now());
        self.term().present().context("Error drawing frame")?;

        loop {
            let timeout = self.driver.time_to_next_tick(Instant::now());
            let keys = self.term().read_key_events(timeout).context("Error reading input")?;

            for key in &keys {
                let cmd = match command_for(key) {
                    Some(cmd) => cmd,
                    None => continue,
                };

                match self.driver.handle(cmd, Instant::now()) {
                    Control::Quit => return Ok(()),
                    Control::Continue => {}
                    Control::Paused => {
                        self.term().show_message(&["Paused", "Press Esc to resume", "or Q to quit"])?;
                    }
                    Control::Resumed => {
                        self.term().hide_message()?;
                        self.term().present().context("Error drawing frame")?;
                    }
                    Control::Restarted => {
                        self.term().hide_message()?;
                        self.term().set_hint("");
                        self.term().clear()?;
                        self.term().present().context("Error drawing frame")?;
                    }
                }
            }

            if let Some(outcome) = self.driver.step(Instant::now()) {
                if let TickOutcome::GameOver(_) = outcome {
                    self.term().set_hint(GAME_OVER_HINT);
                }
                self.term().present().context("Error drawing frame")?;
            }
        }
    }

    /// Returns false if the player asked to quit instead of starting.
    fn show_intro(&mut self) -> Result<bool> {
        let lines = &[
            "Arrow keys or WASD to move",
            "Esc or P to pause, R to restart",
            "Q or CTRL+C to quit",
            "",
            "Press any key to begin",
        ];

        self.term().show_message(lines)?;

        let key = self.term().read_key_blocking()?;
        if is_ctrl_c(&key) || command_for(&key) == Some(Command::Quit) {
            return Ok(false);
        }

        self.term().hide_message()?;
        Ok(true)
    }

    fn term(&mut self) -> &mut TermManager {
        self.driver.frontend_mut()
    }
}

/// Runs `body` between `setup` and `restore`. `restore` runs whenever setup
/// was attempted, even if setup itself failed part-way. The first error wins.
fn guarded<T>(
    target: &mut T,
    setup: impl FnOnce(&mut T) -> Result<()>,
    body: impl FnOnce(&mut T) -> Result<()>,
    restore: impl FnOnce(&mut T) -> Result<()>,
) -> Result<()> {
    let res = setup(target).and_then(|()| body(target));
    let restored = restore(target);
    res.and(restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Collision, Phase};
    use crate::snake::{Direction, Velocity};
    use crate::surface::testing::Recorder;
    use anyhow::bail;

    const TICK: Duration = Duration::from_millis(80);

    fn driver(t0: Instant) -> Driver<Recorder, StdRng> {
        let engine = GameEngine::new(GameConfig::default(), Recorder::default(), StdRng::seed_from_u64(3));
        let mut driver = Driver::new(engine);
        driver.start(t0);
        driver
    }

    fn heading(driver: &Driver<Recorder, StdRng>) -> Direction {
        driver.engine().velocity().direction()
    }

    #[test]
    fn test_ticks_on_schedule() {
        let t0 = Instant::now();
        let mut driver = driver(t0);

        assert_eq!(driver.step(t0), None);
        assert!(matches!(driver.step(t0 + TICK), Some(TickOutcome::Moved | TickOutcome::Ate)));
        assert_eq!(driver.step(t0 + TICK), None);
    }

    #[test]
    fn test_turns_dropped_while_paused() {
        let t0 = Instant::now();
        let mut driver = driver(t0);

        assert_eq!(driver.handle(Command::Pause, t0), Control::Paused);
        assert_eq!(driver.handle(Command::Turn(Direction::Down), t0), Control::Continue);
        assert_eq!(heading(&driver), Direction::Right);

        assert_eq!(driver.handle(Command::Pause, t0), Control::Resumed);
        driver.handle(Command::Turn(Direction::Down), t0);
        assert_eq!(heading(&driver), Direction::Down);
    }

    #[test]
    fn test_pause_stops_ticks() {
        let t0 = Instant::now();
        let mut driver = driver(t0);
        let head = driver.engine().snake().head();

        driver.handle(Command::Pause, t0);
        assert!(driver.is_paused());
        assert!(!driver.is_ticking());
        assert_eq!(driver.step(t0 + Duration::from_secs(10)), None);
        assert_eq!(driver.engine().snake().head(), head);

        let t1 = t0 + Duration::from_secs(20);
        driver.handle(Command::Pause, t1);
        assert_eq!(driver.step(t1), None);
        assert!(driver.step(t1 + TICK).is_some());
        assert_ne!(driver.engine().snake().head(), head);
    }

    #[test]
    fn test_game_over_stops_ticker() {
        let t0 = Instant::now();
        let mut driver = driver(t0);

        driver.handle(Command::Turn(Direction::Up), t0);
        assert_eq!(driver.step(t0 + TICK), Some(TickOutcome::GameOver(Collision::Wall)));
        assert!(!driver.is_ticking());
        assert_eq!(driver.step(t0 + Duration::from_secs(10)), None);

        // Nothing to pause once the game is over.
        assert_eq!(driver.handle(Command::Pause, t0), Control::Continue);
        assert!(!driver.is_paused());
    }

    #[test]
    fn test_reset_clears_pause() {
        let t0 = Instant::now();
        let mut driver = driver(t0);

        driver.handle(Command::Turn(Direction::Down), t0);
        driver.handle(Command::Pause, t0);
        assert_eq!(driver.handle(Command::Reset, t0), Control::Restarted);

        assert!(!driver.is_paused());
        assert!(driver.is_ticking());
        assert!(driver.engine().is_running());
        assert_eq!(driver.engine().velocity(), Velocity { dx: 25, dy: 0 });
        assert!(driver.step(t0 + TICK).is_some());
    }

    #[test]
    fn test_reset_after_game_over_resumes_ticking() {
        let t0 = Instant::now();
        let mut driver = driver(t0);
        driver.handle(Command::Turn(Direction::Up), t0);
        driver.step(t0 + TICK);
        assert_eq!(driver.engine().phase(), Phase::GameOver);

        let t1 = t0 + Duration::from_secs(1);
        assert_eq!(driver.handle(Command::Reset, t1), Control::Restarted);
        assert_eq!(driver.engine().phase(), Phase::Running);
        assert_eq!(driver.engine().score(), 0);
        assert_eq!(driver.engine().snake().len(), 5);
        assert!(driver.step(t1 + TICK).is_some());
    }

    #[test]
    fn test_reset_before_start() {
        let t0 = Instant::now();
        let engine = GameEngine::new(GameConfig::default(), Recorder::default(), StdRng::seed_from_u64(3));
        let mut driver = Driver::new(engine);
        assert!(!driver.is_ticking());

        driver.handle(Command::Reset, t0);
        assert!(driver.engine().is_running());
        assert!(driver.step(t0 + TICK).is_some());
    }

    #[test]
    fn test_quit() {
        let t0 = Instant::now();
        let mut driver = driver(t0);
        assert_eq!(driver.handle(Command::Quit, t0), Control::Quit);
    }

    #[test]
    fn test_guarded_restores_after_failed_setup() {
        let mut log: Vec<&str> = vec![];
        let res = guarded(
            &mut log,
            |log| {
                log.push("setup");
                bail!("Error setting raw mode")
            },
            |log| {
                log.push("body");
                Ok(())
            },
            |log| {
                log.push("restore");
                Ok(())
            },
        );

        assert_eq!(res.unwrap_err().to_string(), "Error setting raw mode");
        assert_eq!(log, vec!["setup", "restore"]);
    }

    #[test]
    fn test_guarded_restores_after_failed_body() {
        let mut log: Vec<&str> = vec![];
        let res = guarded(
            &mut log,
            |log| Ok(log.push("setup")),
            |log| {
                log.push("body");
                bail!("Error reading input")
            },
            |log| {
                log.push("restore");
                bail!("Error leaving alt screen")
            },
        );

        assert_eq!(res.unwrap_err().to_string(), "Error reading input");
        assert_eq!(log, vec!["setup", "body", "restore"]);
    }

    #[test]
    fn test_guarded_reports_restore_failure() {
        let mut count = 0;
        let res = guarded(&mut count, |c| Ok(*c += 1), |c| Ok(*c += 1), |_| bail!("Error leaving raw mode"));

        assert!(res.is_err());
        assert_eq!(count, 2);
    }
}
