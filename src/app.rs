use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::{
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::background::BackgroundSelector;
use crate::clock::ClockSnapshot;
use crate::config::Config;
use crate::editor::{EditState, MessageEditor, PinOutcome};
use crate::overlay::{Button, CloseReason, OverlayController};
use crate::pin::PinGate;
use crate::store::{MessageStore, StoreError};
use crate::ui::{self, IdleTarget};

const ALERT_DURATION: Duration = Duration::from_secs(3);

/// Store responses, delivered back onto the UI loop.
#[derive(Debug)]
pub enum StoreEvent {
    Loaded(Result<String, StoreError>),
    Saved { message: String, result: Result<(), StoreError> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Info,
    Error,
}

#[derive(Clone, Debug)]
pub struct Alert {
    pub text: String,
    pub kind: AlertKind,
    expires_at: Instant,
}

// ============================================================================
// Application State
// ============================================================================

pub struct App {
    pub overlay: OverlayController,
    pub editor: MessageEditor,
    pub background: BackgroundSelector,
    pub clock: ClockSnapshot,
    pub school_name: String,
    /// Last known welcome message, empty until loaded.
    pub welcome: String,
    pub active_button: Option<Button>,
    pub alert: Option<Alert>,
    pub viewport: Rect,
    pub animation_frame: u8,
    store: Arc<dyn MessageStore>,
    events_tx: UnboundedSender<StoreEvent>,
    events_rx: UnboundedReceiver<StoreEvent>,
}

impl App {
    pub fn new(config: &Config, store: Arc<dyn MessageStore>, now: Instant) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            overlay: OverlayController::new(config.overlay_timing()),
            editor: MessageEditor::new(PinGate::new(config.pin.clone())),
            background: BackgroundSelector::new(config.background_theme(), now),
            clock: ClockSnapshot::now(),
            school_name: config.school_name.clone(),
            welcome: String::new(),
            active_button: None,
            alert: None,
            viewport: Rect::default(),
            animation_frame: 0,
            store,
            events_tx,
            events_rx,
        }
    }

    fn spawn_store<F>(&self, request: F)
    where
        F: Future<Output = StoreEvent> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            // The receiver only goes away with the app itself.
            let _ = tx.send(request.await);
        });
    }

    pub fn load_message(&self) {
        let store = Arc::clone(&self.store);
        self.spawn_store(async move { StoreEvent::Loaded(store.get().await) });
    }

    fn save_message(&self, message: String) {
        let store = Arc::clone(&self.store);
        self.spawn_store(async move {
            let result = store.set(&message).await;
            StoreEvent::Saved { message, result }
        });
    }

    pub fn apply(&mut self, event: StoreEvent, now: Instant) {
        match event {
            StoreEvent::Loaded(Ok(message)) => self.welcome = message,
            StoreEvent::Loaded(Err(err)) => {
                tracing::warn!("failed to load welcome message: {}", err);
                self.welcome.clear();
                self.show_alert("Nachricht konnte nicht geladen werden", AlertKind::Error, now);
            }
            StoreEvent::Saved { message, result: Ok(()) } => {
                self.welcome = message;
                self.editor.save_succeeded();
                self.show_alert("Nachricht gespeichert", AlertKind::Info, now);
            }
            StoreEvent::Saved { result: Err(err), .. } => {
                tracing::warn!("failed to save welcome message: {}", err);
                self.show_alert("Nachricht konnte nicht gespeichert werden", AlertKind::Error, now);
            }
        }
    }

    fn show_alert(&mut self, text: &str, kind: AlertKind, now: Instant) {
        self.alert = Some(Alert { text: text.into(), kind, expires_at: now + ALERT_DURATION });
    }

    pub fn activate(&mut self, button: Button, now: Instant) {
        self.active_button = Some(button);
        self.overlay.open(button.content(), now);
    }

    pub fn open_editor(&mut self) {
        self.editor.open();
    }

    fn submit_editor(&mut self, now: Instant) {
        match self.editor.state() {
            EditState::PinPrompt { .. } => {
                if self.editor.submit_pin(&self.welcome) == Some(PinOutcome::Rejected) {
                    self.show_alert("Falscher PIN", AlertKind::Error, now);
                }
            }
            EditState::MessageForm { .. } => {
                if let Some(draft) = self.editor.submit_message() {
                    self.save_message(draft);
                }
            }
            EditState::Closed => {}
        }
    }

    pub fn update(&mut self, now: Instant) {
        self.clock = ClockSnapshot::now();

        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event, now);
        }

        self.overlay.poll(now);

        if self.alert.as_ref().is_some_and(|a| now >= a.expires_at) {
            self.alert = None;
        }

        self.animation_frame = self.animation_frame.wrapping_add(1) % 20;
    }

    pub fn shutdown(&mut self) {
        self.overlay.shutdown();
        self.editor.cancel();
    }

    #[cfg(test)]
    async fn next_store_event(&mut self, now: Instant) {
        if let Some(event) = self.events_rx.recv().await {
            self.apply(event, now);
        }
    }
}

// ============================================================================
// Event Handlers
// ============================================================================

pub fn handle_key(key: KeyEvent, app: &mut App, now: Instant) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    // Editor input takes precedence over everything behind it.
    if app.editor.is_open() {
        match key.code {
            KeyCode::Char(c) => app.editor.push_char(c),
            KeyCode::Backspace => app.editor.backspace(),
            KeyCode::Enter => app.submit_editor(now),
            KeyCode::Esc => {
                app.editor.cancel();
            }
            _ => {}
        }
        return false;
    }

    if app.overlay.is_open() {
        match key.code {
            KeyCode::Esc | KeyCode::Char('x') => {
                app.overlay.close(CloseReason::CloseButton);
            }
            KeyCode::Char(c) => {
                if let Some(button) = Button::from_hotkey(c) {
                    app.activate(button, now);
                }
            }
            _ => {}
        }
        return false;
    }

    handle_idle_view(key, app, now)
}

fn handle_idle_view(key: KeyEvent, app: &mut App, now: Instant) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('w') | KeyCode::Char('W') => app.open_editor(),
        KeyCode::Char('b') => app.background.cycle(true, now),
        KeyCode::Char('B') => app.background.cycle(false, now),
        KeyCode::Char(c) => {
            if let Some(button) = Button::from_hotkey(c) {
                app.activate(button, now);
            }
        }
        _ => {}
    }
    false
}

pub fn handle_mouse(mouse: MouseEvent, app: &mut App, now: Instant) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    let (column, row) = (mouse.column, mouse.row);

    if app.editor.is_open() {
        if !ui::contains(ui::editor_area(app.viewport), column, row) {
            app.editor.cancel();
        }
        return;
    }

    if let Some(kind) = app.overlay.session().map(|s| s.content.kind()) {
        let click = ui::classify_overlay_click(app.viewport, kind, column, row);
        app.overlay.click(click);
        return;
    }

    match ui::idle_target(app.viewport, column, row) {
        Some(IdleTarget::Button(button)) => app.activate(button, now),
        Some(IdleTarget::MessageIcon) => app.open_editor(),
        Some(IdleTarget::ThemeChip) => app.background.cycle(true, now),
        None => {}
    }
}
