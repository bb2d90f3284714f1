//! PIN-gated welcome-message editor.

use crate::pin::{MAX_PIN_LEN, PinGate};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditState {
    Closed,
    PinPrompt { entered: String },
    MessageForm { draft: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinOutcome {
    Unlocked,
    Rejected,
}

pub struct MessageEditor {
    gate: PinGate,
    state: EditState,
}

impl MessageEditor {
    pub fn new(gate: PinGate) -> Self {
        Self { gate, state: EditState::Closed }
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != EditState::Closed
    }

    /// Starts a fresh edit session at the PIN prompt.
    pub fn open(&mut self) {
        self.state = EditState::PinPrompt { entered: String::new() };
    }

    pub fn push_char(&mut self, c: char) {
        match &mut self.state {
            EditState::PinPrompt { entered } => {
                if entered.chars().count() < MAX_PIN_LEN {
                    entered.push(c);
                }
            }
            EditState::MessageForm { draft } => draft.push(c),
            EditState::Closed => {}
        }
    }

    pub fn backspace(&mut self) {
        match &mut self.state {
            EditState::PinPrompt { entered } => {
                entered.pop();
            }
            EditState::MessageForm { draft } => {
                draft.pop();
            }
            EditState::Closed => {}
        }
    }

    /// Checks the entered code. On success the form opens pre-filled with
    /// `current_message`; either way the entered code is discarded.
    pub fn submit_pin(&mut self, current_message: &str) -> Option<PinOutcome> {
        let EditState::PinPrompt { entered } = &mut self.state else {
            return None;
        };
        let entered = std::mem::take(entered);

        if self.gate.check(&entered) {
            self.state = EditState::MessageForm { draft: current_message.to_string() };
            tracing::info!("message editor unlocked");
            Some(PinOutcome::Unlocked)
        } else {
            tracing::warn!("rejected pin attempt");
            Some(PinOutcome::Rejected)
        }
    }

    /// The draft to persist. The form stays open until the store answers.
    pub fn submit_message(&self) -> Option<String> {
        match &self.state {
            EditState::MessageForm { draft } => Some(draft.clone()),
            _ => None,
        }
    }

    pub fn save_succeeded(&mut self) {
        if matches!(self.state, EditState::MessageForm { .. }) {
            self.state = EditState::Closed;
        }
    }

    /// Discards uncommitted input. Returns whether a session was open.
    pub fn cancel(&mut self) -> bool {
        let was_open = self.is_open();
        self.state = EditState::Closed;
        was_open
    }
}
