use ratatui::style::Color;
use std::time::Instant;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackgroundTheme {
    #[default]
    Campus,
    Herbst,
    Winter,
    Fruehling,
}

const THEMES: &[BackgroundTheme] = &[
    BackgroundTheme::Campus,
    BackgroundTheme::Herbst,
    BackgroundTheme::Winter,
    BackgroundTheme::Fruehling,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackgroundAssets {
    pub video: &'static str,
    pub icon: &'static str,
    pub logo: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub backdrop: Color,
    pub border: Color,
    pub accent: Color,
    pub text: Color,
}

impl BackgroundTheme {
    pub fn key(self) -> &'static str {
        match self {
            Self::Campus => "campus",
            Self::Herbst => "herbst",
            Self::Winter => "winter",
            Self::Fruehling => "fruehling",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        THEMES.iter().copied().find(|t| t.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Campus => "Campus",
            Self::Herbst => "Herbst",
            Self::Winter => "Winter",
            Self::Fruehling => "Frühling",
        }
    }

    pub fn assets(self) -> BackgroundAssets {
        match self {
            Self::Campus => BackgroundAssets {
                video: "/videos/campus.mp4",
                icon: "/icons/campus.svg",
                logo: "/logos/campus.png",
            },
            Self::Herbst => BackgroundAssets {
                video: "/videos/herbst.mp4",
                icon: "/icons/herbst.svg",
                logo: "/logos/herbst.png",
            },
            Self::Winter => BackgroundAssets {
                video: "/videos/winter.mp4",
                icon: "/icons/winter.svg",
                logo: "/logos/winter.png",
            },
            Self::Fruehling => BackgroundAssets {
                video: "/videos/fruehling.mp4",
                icon: "/icons/fruehling.svg",
                logo: "/logos/fruehling.png",
            },
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Campus => Palette {
                backdrop: Color::Rgb(37, 99, 235),
                border: Color::Rgb(147, 197, 253),
                accent: Color::Rgb(192, 132, 252),
                text: Color::White,
            },
            Self::Herbst => Palette {
                backdrop: Color::Rgb(154, 52, 18),
                border: Color::Rgb(253, 186, 116),
                accent: Color::Rgb(250, 204, 21),
                text: Color::White,
            },
            Self::Winter => Palette {
                backdrop: Color::Rgb(30, 58, 138),
                border: Color::Rgb(224, 242, 254),
                accent: Color::Rgb(125, 211, 252),
                text: Color::White,
            },
            Self::Fruehling => Palette {
                backdrop: Color::Rgb(22, 101, 52),
                border: Color::Rgb(187, 247, 208),
                accent: Color::Rgb(244, 114, 182),
                text: Color::White,
            },
        }
    }

    fn cycled(self, forward: bool) -> Self {
        let idx = THEMES.iter().position(|&t| t == self).unwrap_or(0);
        let new_idx = if forward {
            (idx + 1) % THEMES.len()
        } else if idx == 0 {
            THEMES.len() - 1
        } else {
            idx - 1
        };
        THEMES[new_idx]
    }
}

/// The one selected background. Every selection restarts the media source.
pub struct BackgroundSelector {
    theme: BackgroundTheme,
    generation: u64,
    started_at: Instant,
}

impl BackgroundSelector {
    pub fn new(theme: BackgroundTheme, now: Instant) -> Self {
        Self { theme, generation: 0, started_at: now }
    }

    pub fn theme(&self) -> BackgroundTheme {
        self.theme
    }

    /// Bumped on each selection, so a renderer can tell it must reload the media.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn select(&mut self, theme: BackgroundTheme, now: Instant) {
        self.theme = theme;
        self.generation += 1;
        self.started_at = now;
        let assets = theme.assets();
        tracing::info!(
            theme = theme.key(),
            video = assets.video,
            icon = assets.icon,
            logo = assets.logo,
            "background selected"
        );
    }

    pub fn cycle(&mut self, forward: bool, now: Instant) {
        self.select(self.theme.cycled(forward), now);
    }
}
