use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::resources::Resources;
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{PriceListView, PromotionListView};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::{debug, info};

const TICK_RATE: Duration = Duration::from_millis(250);

pub struct App {
  /// Navigation stack; index 0 is the root picked with `:`
  view_stack: Vec<Box<dyn View>>,
  command_input: CommandInput,
  config: Config,
  resources: Resources,
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, resources: Resources) -> Self {
    let mut app = Self {
      view_stack: Vec::new(),
      command_input: CommandInput::new(),
      config,
      resources,
      should_quit: false,
    };
    let root = app.promotions_view();
    app.view_stack.push(root);
    app
  }

  pub fn title(&self) -> &str {
    self.config.display_title()
  }

  pub fn command_input(&self) -> &CommandInput {
    &self.command_input
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let result = self.event_loop().await;
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    result
  }

  async fn event_loop(&mut self) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut events = EventHandler::new(TICK_RATE);

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => {
          if let Some(view) = self.current_view_mut() {
            view.tick();
          }
        }
        None => break,
      }
    }
    info!("exiting");
    Ok(())
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let capturing = self.view_stack.last().is_some_and(|v| v.is_capturing());
    if !capturing {
      match self.command_input.handle_key(key) {
        KeyResult::Event(CommandEvent::Submitted(cmd)) => {
          self.execute_command(&cmd);
          return;
        }
        KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => return,
        KeyResult::NotHandled if self.command_input.is_active() => return,
        KeyResult::NotHandled => {}
      }
    }

    let Some(view) = self.current_view_mut() else {
      return;
    };
    match view.handle_key(key) {
      ViewAction::None => {}
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  fn execute_command(&mut self, cmd: &str) {
    debug!(cmd, "command");
    match cmd {
      "promotions" => self.view_stack = vec![self.promotions_view()],
      "pricelists" => self.view_stack = vec![self.price_lists_view()],
      "quit" => self.should_quit = true,
      _ => debug!(cmd, "unknown command"),
    }
  }

  fn promotions_view(&self) -> Box<dyn View> {
    Box::new(PromotionListView::new(
      self.resources.clone(),
      self.config.page_size,
    ))
  }

  fn price_lists_view(&self) -> Box<dyn View> {
    Box::new(PriceListView::new(
      self.resources.clone(),
      self.config.page_size,
      self.config.export.directory(),
    ))
  }
}
