//! Overlay session controller.
//!
//! Owns the single full-screen overlay: what it shows, when it auto-dismisses
//! and the countdown badge shown during its final seconds. All timers are
//! plain deadline handles owned here and dropped on every way out of OPEN,
//! so nothing can fire against a session that no longer exists.

use std::time::{Duration, Instant};
use url::Url;

pub const ROOM_PLAN_URL: &str = "https://mybseplapagefri.vercel.app/";
pub const SCHOOL_INFO_URL: &str = "https://www.bs-elmshorn.de/";
pub const CONTACT_EMAIL: &str = "info@bs-elmshorn.de";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlayTiming {
    /// Total time an overlay stays up without interaction.
    pub visible_for: Duration,
    /// Value the badge starts counting down from.
    pub countdown_from: u32,
    pub step: Duration,
}

impl Default for OverlayTiming {
    fn default() -> Self {
        Self {
            visible_for: Duration::from_secs(20),
            countdown_from: 5,
            step: Duration::from_secs(1),
        }
    }
}

impl OverlayTiming {
    fn reveal_after(&self) -> Duration {
        self.visible_for.saturating_sub(self.step * self.countdown_from)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverlayContent {
    Frame(Url),
    Contact,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayKind {
    Frame,
    Contact,
}

impl OverlayContent {
    pub fn kind(&self) -> OverlayKind {
        match self {
            Self::Frame(_) => OverlayKind::Frame,
            Self::Contact => OverlayKind::Contact,
        }
    }

    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::Frame(url) => Some(url),
            Self::Contact => None,
        }
    }
}

/// Action buttons on the idle view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    RoomPlan,
    Info,
    Contact,
}

impl Button {
    pub const ALL: [Button; 3] = [Button::RoomPlan, Button::Info, Button::Contact];

    pub fn label(self) -> &'static str {
        match self {
            Self::RoomPlan => "Raumplan",
            Self::Info => "Info",
            Self::Contact => "Kontakt",
        }
    }

    pub fn hotkey(self) -> char {
        match self {
            Self::RoomPlan => '1',
            Self::Info => '2',
            Self::Contact => '3',
        }
    }

    pub fn from_hotkey(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.hotkey() == c)
    }

    pub fn content(self) -> OverlayContent {
        match self {
            Self::RoomPlan => frame(ROOM_PLAN_URL),
            Self::Info => frame(SCHOOL_INFO_URL),
            Self::Contact => OverlayContent::Contact,
        }
    }
}

fn frame(raw: &str) -> OverlayContent {
    match Url::parse(raw) {
        Ok(url) => OverlayContent::Frame(url),
        // Unreachable for the constants above.
        Err(_) => OverlayContent::Contact,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseReason {
    CloseButton,
    Backdrop,
    Timeout,
    Teardown,
}

/// Where a click landed relative to an open overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Click {
    Body,
    Backdrop,
    CloseButton,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlaySession {
    pub content: OverlayContent,
    pub opened_at: Instant,
    /// `Some` once the countdown badge is showing.
    pub remaining: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Timer {
    deadline: Instant,
}

impl Timer {
    fn at(deadline: Instant) -> Self {
        Self { deadline }
    }

    fn is_due(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

pub struct OverlayController {
    timing: OverlayTiming,
    session: Option<OverlaySession>,
    dismiss: Option<Timer>,
    reveal: Option<Timer>,
    step: Option<Timer>,
}

impl OverlayController {
    pub fn new(timing: OverlayTiming) -> Self {
        Self { timing, session: None, dismiss: None, reveal: None, step: None }
    }

    pub fn session(&self) -> Option<&OverlaySession> {
        self.session.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn remaining(&self) -> Option<u32> {
        self.session.as_ref().and_then(|s| s.remaining)
    }

    /// Shows `content`, replacing any open session and restarting every timer.
    pub fn open(&mut self, content: OverlayContent, now: Instant) {
        self.cancel_timers();
        tracing::info!(kind = ?content.kind(), url = content.url().map(Url::as_str), "overlay opened");
        self.session = Some(OverlaySession { content, opened_at: now, remaining: None });
        self.dismiss = Some(Timer::at(now + self.timing.visible_for));
        self.reveal = Some(Timer::at(now + self.timing.reveal_after()));
    }

    /// Returns whether a session was actually closed.
    pub fn close(&mut self, reason: CloseReason) -> bool {
        self.cancel_timers();
        match self.session.take() {
            Some(session) => {
                tracing::info!(
                    kind = ?session.content.kind(),
                    ?reason,
                    shown_for = ?session.opened_at.elapsed(),
                    "overlay closed"
                );
                true
            }
            None => false,
        }
    }

    pub fn click(&mut self, click: Click) -> bool {
        match click {
            Click::Body => false,
            Click::Backdrop => self.close(CloseReason::Backdrop),
            Click::CloseButton => self.close(CloseReason::CloseButton),
        }
    }

    pub fn shutdown(&mut self) {
        self.close(CloseReason::Teardown);
    }

    /// Fires whatever timers are due at `now`. Reports a timeout exactly once.
    pub fn poll(&mut self, now: Instant) -> Option<CloseReason> {
        let session = self.session.as_mut()?;

        if let Some(reveal) = self.reveal.filter(|t| t.is_due(now)) {
            self.reveal = None;
            session.remaining = Some(self.timing.countdown_from);
            self.step = Some(Timer::at(reveal.deadline + self.timing.step));
        }

        let mut expired = false;
        while let Some(step) = self.step.filter(|t| t.is_due(now)) {
            let remaining = session.remaining.unwrap_or(0).saturating_sub(1);
            session.remaining = Some(remaining);
            if remaining == 0 {
                expired = true;
                break;
            }
            self.step = Some(Timer::at(step.deadline + self.timing.step));
        }

        if expired || self.dismiss.is_some_and(|t| t.is_due(now)) {
            self.close(CloseReason::Timeout);
            return Some(CloseReason::Timeout);
        }
        None
    }

    fn cancel_timers(&mut self) {
        self.dismiss = None;
        self.reveal = None;
        self.step = None;
    }
}
