use ratatui::{style::Style, text::Span};

use api_types::{Category, PaymentMethod};

use crate::ui::theme::Theme;

/// A colored dot-and-name tag for a category.
#[must_use]
pub fn category_badge(category: Category, theme: &Theme) -> Span<'static> {
    Span::styled(
        format!("● {}", category.as_str()),
        Style::default().fg(theme.category(category)),
    )
}

/// A colored tag for a payment method.
#[must_use]
pub fn payment_badge(method: PaymentMethod, theme: &Theme) -> Span<'static> {
    Span::styled(
        method.as_str().to_string(),
        Style::default().fg(theme.payment(method)),
    )
}
