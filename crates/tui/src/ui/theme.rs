use ratatui::style::Color;

use api_types::{Category, PaymentMethod};

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub border: Color,
    pub border_focused: Color,
    pub positive: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text: Color::Rgb(220, 220, 220),
            dim: Color::Rgb(140, 140, 140),
            accent: Color::Rgb(80, 160, 160),
            border: Color::Rgb(60, 70, 80),
            border_focused: Color::Rgb(80, 160, 160),
            positive: Color::Rgb(34, 197, 94),
            error: Color::Rgb(200, 80, 80),
        }
    }
}

impl Theme {
    /// Fixed per-category hue, stable across screens.
    pub fn category(&self, category: Category) -> Color {
        match category {
            Category::Food => Color::Rgb(249, 115, 22),
            Category::Transport => Color::Rgb(59, 130, 246),
            Category::Shopping => Color::Rgb(183, 64, 242),
            Category::Bills => Color::Rgb(34, 197, 94),
            Category::Entertainment => Color::Rgb(236, 72, 153),
            Category::Health => Color::Rgb(20, 184, 166),
            Category::Other => Color::Rgb(110, 122, 145),
        }
    }

    pub fn payment(&self, method: PaymentMethod) -> Color {
        match method {
            PaymentMethod::Cash => Color::Rgb(16, 185, 129),
            PaymentMethod::Card => Color::Rgb(99, 102, 241),
            PaymentMethod::Online => Color::Rgb(6, 182, 212),
        }
    }
}
