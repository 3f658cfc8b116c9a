use super::ui;
use communityhub_portal::connection::CollectionBackend;
use communityhub_portal::controller::{CrudListController, FieldTarget, Outcome};
use communityhub_portal::core::Identity;
use communityhub_portal::notify::{Level, MemorySink, Notifier};
use communityhub_portal::resources::Screen;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders},
};
use std::io;
use tui_textarea::TextArea;

/// Which part of the screen receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Table,
    /// Draft form, with the index of the field being typed into.
    Draft(usize),
}

pub struct App<'a, B: CollectionBackend> {
    pub screen: Screen,
    pub controller: CrudListController<B>,
    pub textarea: TextArea<'a>,
    pub messages: Vec<Line<'static>>,
    pub sink: MemorySink,
    pub selected: usize,
    pub focus: Focus,
    pub exit: bool,
}

impl<'a, B: CollectionBackend> App<'a, B> {
    pub fn new(screen: Screen, controller: CrudListController<B>) -> Self {
        Self {
            screen,
            controller,
            textarea: Self::new_textarea(" Input ", ""),
            messages: vec![Line::from(vec![Span::styled(
                format!("Signed in as {}", screen.required_role()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )])],
            sink: MemorySink::new(),
            selected: 0,
            focus: Focus::Table,
            exit: false,
        }
    }

    fn new_textarea(title: &str, seed: &str) -> TextArea<'static> {
        let mut textarea = TextArea::new(vec![seed.to_string()]);
        textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string()),
        );
        textarea.move_cursor(tui_textarea::CursorMove::End);
        textarea
    }

    fn input_text(&self) -> String {
        self.textarea.lines().join(" ")
    }

    pub async fn run(&mut self) -> io::Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.run_loop(&mut terminal).await;

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn run_loop<T: Backend>(&mut self, terminal: &mut Terminal<T>) -> io::Result<()> {
        self.reload().await;

        loop {
            terminal.draw(|f| ui::draw(f, self))?;

            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match self.focus {
                        Focus::Table => self.handle_table_key(key).await,
                        Focus::Draft(index) => self.handle_draft_key(key, index).await,
                    }
                }
            }
            if self.exit {
                return Ok(());
            }
        }
    }

    fn selected_identity(&self) -> Option<Identity> {
        self.controller
            .records()
            .get(self.selected)
            .and_then(|record| self.controller.identity_of(record))
    }

    async fn handle_table_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let editing = !self.controller.cursor().is_idle();

        match key.code {
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < self.controller.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter => self.toggle_edit().await,
            KeyCode::Char('x') if ctrl => {
                let outcome = self.controller.cancel_edit();
                self.textarea = Self::new_textarea(" Input ", "");
                self.report(&outcome);
            }
            _ if editing => {
                if self.textarea.input(key) {
                    let text = self.input_text();
                    self.controller.update_field(FieldTarget::EditBuffer, text);
                }
            }
            KeyCode::Char('n') if self.screen.allows_create() => self.enter_draft(0),
            KeyCode::Char('d') if self.screen.allows_delete() => {
                if let Some(identity) = self.selected_identity() {
                    let outcome = self.controller.remove(&identity).await;
                    self.report(&outcome);
                    self.clamp_selection();
                }
            }
            KeyCode::Char('r') => self.reload().await,
            KeyCode::Char('q') | KeyCode::Esc => self.exit = true,
            _ => {}
        }
    }

    /// Enter on a row: the same key begins and saves the edit.
    async fn toggle_edit(&mut self) {
        let Some(identity) = self.selected_identity() else {
            return;
        };
        let outcome = self.controller.begin_edit(&identity).await;
        match &outcome {
            Outcome::EditStarted(_) => {
                let seed = self.controller.cursor().buffer().unwrap_or_default().to_string();
                self.textarea = Self::new_textarea(" Edit ", &seed);
            }
            Outcome::Updated(_) => self.textarea = Self::new_textarea(" Input ", ""),
            _ => {}
        }
        self.report(&outcome);
    }

    fn draft_fields(&self) -> Vec<String> {
        self.controller
            .schema()
            .fields
            .iter()
            .map(|spec| spec.name.clone())
            .collect()
    }

    fn enter_draft(&mut self, index: usize) {
        let fields = self.draft_fields();
        let Some(field) = fields.get(index) else {
            return;
        };
        let label = self
            .controller
            .schema()
            .field_spec(field)
            .map(|spec| format!(" {} ", spec.label))
            .unwrap_or_else(|| " Draft ".to_string());
        let seed = self.controller.draft().text(field);
        self.textarea = Self::new_textarea(&label, &seed);
        self.focus = Focus::Draft(index);
    }

    fn store_draft_input(&mut self, index: usize) {
        if let Some(field) = self.draft_fields().get(index) {
            let text = self.input_text();
            self.controller.update_field(FieldTarget::Draft(field), text);
        }
    }

    async fn handle_draft_key(&mut self, key: KeyEvent, index: usize) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Tab => {
                self.store_draft_input(index);
                let count = self.draft_fields().len().max(1);
                self.enter_draft((index + 1) % count);
            }
            KeyCode::Char('s') if ctrl => {
                self.store_draft_input(index);
                let outcome = self.controller.submit_draft().await;
                if matches!(outcome, Outcome::Created(_)) {
                    self.selected = 0;
                    self.enter_draft(index);
                }
                self.report(&outcome);
            }
            KeyCode::Esc => {
                self.store_draft_input(index);
                self.textarea = Self::new_textarea(" Input ", "");
                self.focus = Focus::Table;
            }
            _ => {
                if self.textarea.input(key) {
                    self.store_draft_input(index);
                }
            }
        }
    }

    async fn reload(&mut self) {
        let outcome = self.controller.load().await;
        if let Outcome::Failed { error, .. } = &outcome {
            self.push_line(format!("Could not load: {}", error), Color::DarkGray);
        }
        self.clamp_selection();
        self.report(&outcome);
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.controller.len().saturating_sub(1));
    }

    fn report(&mut self, outcome: &Outcome) {
        Notifier::emit(&self.sink, &self.controller.schema().messages, outcome);
        for notification in self.sink.drain() {
            let color = match notification.level {
                Level::Success => Color::Green,
                Level::Warning => Color::Yellow,
                Level::Error => Color::Red,
            };
            self.push_line(notification.message, color);
        }
    }

    fn push_line(&mut self, message: String, color: Color) {
        self.messages
            .push(Line::from(Span::styled(message, Style::default().fg(color))));
    }
}
