use std::fmt;
use std::io::{Stderr, stderr};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, instrument};

use crate::game::{Game, GameConfig, Outcome, StepOutcome};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// `None` when the player quit before the game finished
    pub outcome: Option<Outcome>,
    pub length: usize,
    pub score: usize,
    pub elapsed: String,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = match self.outcome {
            Some(Outcome::BoardFull) => "You won!",
            Some(Outcome::Collision) => "Game over!",
            None => "Quit.",
        };
        write!(
            f,
            "{} Length: {}, score: {}, time: {}",
            verdict, self.length, self.score, self.elapsed
        )
    }
}

/// Keyboard-driven session in the terminal
pub struct HumanMode {
    config: GameConfig,
    game: Game,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(config: GameConfig, seed: Option<u64>) -> Result<Self> {
        let game = match seed {
            Some(seed) => Game::with_seed(&config, seed),
            None => Game::new(&config),
        }
        .context("Invalid game configuration")?;

        Ok(Self {
            renderer: Renderer::new(config.cell_width),
            config,
            game,
            metrics: GameMetrics::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
        })
    }

    #[instrument(skip(self), fields(grid_size = self.config.grid_size, tick_rate = self.config.tick_rate))]
    pub async fn run(&mut self) -> Result<SessionSummary> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        info!("Session started");

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result?;
        let summary = self.summary();
        info!(%summary, "Session ended");
        Ok(summary)
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_timer = interval(self.config.tick_interval());
        tick_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                // Game logic tick
                _ = tick_timer.tick() => {
                    self.update_game();
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.draw(terminal)?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.game.is_finished() {
                self.draw(terminal)?;
                Self::wait_for_key(&mut event_stream).await;
                break;
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Hold the final board on screen until the player presses a key
    async fn wait_for_key(event_stream: &mut EventStream) {
        debug!("Waiting for key press before exit");
        loop {
            tokio::select! {
                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                },
                _ = tokio::signal::ctrl_c() => break,
            }
        }
    }

    fn draw(&mut self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        if !self.game.is_finished() {
            self.metrics.update();
        }
        terminal
            .draw(|frame| {
                self.renderer.render(frame, &self.game, &self.metrics);
            })
            .context("Failed to draw frame")?;
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            self.apply(self.input_handler.handle_key_event(key));
        }
    }

    fn apply(&mut self, action: KeyAction) {
        match action {
            KeyAction::Turn(direction) => self.game.change_direction(direction),
            KeyAction::TogglePause => {
                self.game.toggle_pause();
                if self.game.is_paused() {
                    self.metrics.pause();
                } else {
                    self.metrics.resume();
                }
            }
            KeyAction::Quit => {
                debug!("Quit requested");
                self.should_quit = true;
            }
            KeyAction::None => {}
        }
    }

    fn update_game(&mut self) {
        if let StepOutcome::Ate { food } = self.game.advance() {
            debug!(x = food.x, y = food.y, score = self.game.score(), "Food eaten");
        }
    }

    fn summary(&self) -> SessionSummary {
        SessionSummary {
            outcome: self.game.outcome(),
            length: self.game.snake().len(),
            score: self.game.score(),
            elapsed: self.metrics.format_time(),
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
