use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};

use crate::navigator::Navigator;
use crate::quiz::{Question, QuestionKind};

pub(crate) fn yes_no_keyboard() -> KeyboardMarkup {
    let keyboard: Vec<Vec<KeyboardButton>> = vec![vec![
        KeyboardButton::new("Yes✔️"),
        KeyboardButton::new("No❌"),
    ]];

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn action_keyboard() -> KeyboardMarkup {
    let keyboard = vec![
        vec![KeyboardButton::new("Create a new quiz🏗️")],
        vec![KeyboardButton::new("Edit an existing quiz✏️")],
        vec![KeyboardButton::new("Preview a quiz📝")],
    ];

    KeyboardMarkup::new(keyboard)
}

/// One numbered button per choice. The leading number is what the
/// selection handlers parse back, so duplicate titles stay unambiguous.
pub(crate) fn numbered_keyboard(labels: &[String]) -> KeyboardMarkup {
    let keyboard = labels
        .iter()
        .enumerate()
        .map(|(i, label)| vec![KeyboardButton::new(format!("{}. {}", i + 1, label))]);

    KeyboardMarkup::new(keyboard)
}

/// Numbered buttons plus one trailing row per extra action.
pub(crate) fn numbered_keyboard_with(labels: &[String], extras: &[&str]) -> KeyboardMarkup {
    let mut keyboard: Vec<Vec<KeyboardButton>> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| vec![KeyboardButton::new(format!("{}. {}", i + 1, label))])
        .collect();
    for extra in extras {
        keyboard.push(vec![KeyboardButton::new(*extra)]);
    }

    KeyboardMarkup::new(keyboard)
}

/// Parses the "N. label" button text back into a zero-based index.
pub(crate) fn parse_choice(text: &str) -> Option<usize> {
    let number = text.split('.').next()?.trim();
    let number: usize = number.parse().ok()?;
    number.checked_sub(1)
}

pub(crate) fn quiz_menu_keyboard() -> KeyboardMarkup {
    let keyboard = vec![
        vec![
            KeyboardButton::new("Edit title"),
            KeyboardButton::new("Edit description"),
        ],
        vec![
            KeyboardButton::new("Edit points"),
            KeyboardButton::new("Time limit"),
            KeyboardButton::new("Toggle shuffle"),
        ],
        vec![
            KeyboardButton::new("Available date"),
            KeyboardButton::new("Due date"),
            KeyboardButton::new("Until date"),
        ],
        vec![KeyboardButton::new("Questions")],
        vec![
            KeyboardButton::new("Save💾"),
            KeyboardButton::new("Save & Publish"),
        ],
        vec![
            KeyboardButton::new("Toggle publish"),
            KeyboardButton::new("Delete quiz🗑️"),
        ],
        vec![KeyboardButton::new("Back")],
    ];

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn questions_menu_keyboard() -> KeyboardMarkup {
    let keyboard = vec![
        vec![KeyboardButton::new("New question➕")],
        vec![
            KeyboardButton::new("Edit question"),
            KeyboardButton::new("Delete question🗑️"),
        ],
        vec![KeyboardButton::new("Back")],
    ];

    KeyboardMarkup::new(keyboard)
}

/// The question editor menu only offers the payload editor matching the
/// active kind; the other payloads stay untouched underneath.
pub(crate) fn question_menu_keyboard(question: &Question) -> KeyboardMarkup {
    let payload_row = match question.kind {
        QuestionKind::MultipleChoice => vec![KeyboardButton::new("Options")],
        QuestionKind::TrueFalse => vec![KeyboardButton::new("Correct answer")],
        QuestionKind::FillBlank => vec![KeyboardButton::new("Blanks")],
    };

    let keyboard = vec![
        vec![KeyboardButton::new("Change type")],
        vec![
            KeyboardButton::new("Edit title"),
            KeyboardButton::new("Edit prompt"),
            KeyboardButton::new("Edit points"),
        ],
        payload_row,
        vec![
            KeyboardButton::new("Save question"),
            KeyboardButton::new("Cancel question"),
        ],
    ];

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn question_kind_keyboard() -> KeyboardMarkup {
    let keyboard = vec![
        vec![KeyboardButton::new("Multiple Choice")],
        vec![KeyboardButton::new("True/False")],
        vec![KeyboardButton::new("Fill in the Blank")],
    ];

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn option_menu_keyboard() -> KeyboardMarkup {
    let keyboard = vec![
        vec![
            KeyboardButton::new("Edit text"),
            KeyboardButton::new("Toggle correct"),
        ],
        vec![
            KeyboardButton::new("Remove option"),
            KeyboardButton::new("Back"),
        ],
    ];

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn blank_menu_keyboard() -> KeyboardMarkup {
    let keyboard = vec![
        vec![KeyboardButton::new("Edit answers")],
        vec![
            KeyboardButton::new("Remove blank"),
            KeyboardButton::new("Back"),
        ],
    ];

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn true_false_keyboard() -> KeyboardMarkup {
    let keyboard = vec![
        vec![KeyboardButton::new("True"), KeyboardButton::new("False")],
        vec![KeyboardButton::new("Clear answer")],
    ];

    KeyboardMarkup::new(keyboard)
}

/// Inline navigation for the preview: movement buttons, jump buttons for
/// every question, and Submit instead of Next on the last one.
pub(crate) fn preview_keyboard(navigator: &Navigator) -> InlineKeyboardMarkup {
    let mut movement = Vec::new();
    if !navigator.is_first() {
        movement.push(InlineKeyboardButton::callback("⬅️ Previous", "prev"));
    }
    if navigator.is_last() {
        movement.push(InlineKeyboardButton::callback("Submit ✅", "submit"));
    } else {
        movement.push(InlineKeyboardButton::callback("Next ➡️", "next"));
    }

    let jumps: Vec<_> = (0..navigator.total())
        .map(|i| InlineKeyboardButton::callback(format!("{}", i + 1), format!("jump:{}", i)))
        .collect();

    let mut rows = vec![movement];
    // Telegram rejects inline keyboard rows wider than 8 buttons.
    for chunk in jumps.chunks(8) {
        rows.push(chunk.to_vec());
    }

    InlineKeyboardMarkup::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_jump_buttons_wrap_into_rows_of_eight() {
        let navigator = Navigator::new(20).unwrap();
        let markup = preview_keyboard(&navigator);

        // One movement row, then 8 + 8 + 4 jump buttons.
        assert_eq!(markup.inline_keyboard.len(), 4);
        for row in &markup.inline_keyboard[1..] {
            assert!(row.len() <= 8);
        }
        let jump_total: usize = markup.inline_keyboard[1..].iter().map(Vec::len).sum();
        assert_eq!(jump_total, 20);
    }

    #[test]
    fn parse_choice_reads_numbered_labels() {
        assert_eq!(parse_choice("1. Untitled Quiz"), Some(0));
        assert_eq!(parse_choice("12. Something. With. Dots"), Some(11));
        assert_eq!(parse_choice("0. broken"), None);
        assert_eq!(parse_choice("Back"), None);
    }
}
