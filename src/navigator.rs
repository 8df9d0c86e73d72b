/// Bounded cursor for previewing a quiz question by question.
///
/// All movement is clamped: pushing past either edge is a no-op rather
/// than an error, so the preview never rejects a tap. The navigator holds
/// no answers and produces no score; submitting is a bare acknowledgment.
#[derive(Debug, Clone)]
pub struct Navigator {
    cursor: usize,
    total: usize,
}

impl Navigator {
    /// Returns `None` for a quiz with no questions; the caller shows a
    /// "no questions" notice instead of starting a preview.
    pub fn new(total: usize) -> Option<Self> {
        if total == 0 {
            None
        } else {
            Some(Self { cursor: 0, total })
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn next(&mut self) {
        self.cursor = (self.cursor + 1).min(self.total - 1);
    }

    pub fn previous(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn jump_to(&mut self, index: usize) {
        self.cursor = index.min(self.total - 1);
    }

    pub fn is_first(&self) -> bool {
        self.cursor == 0
    }

    /// Gates whether the preview offers "Next" or "Submit".
    pub fn is_last(&self) -> bool {
        self.cursor == self.total - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_quiz_has_no_navigator() {
        assert!(Navigator::new(0).is_none());
    }

    #[test]
    fn starts_at_first_question() {
        let nav = Navigator::new(3).unwrap();
        assert_eq!(nav.cursor(), 0);
        assert!(nav.is_first());
        assert!(!nav.is_last());
    }

    #[test]
    fn next_clamps_at_last_question() {
        let mut nav = Navigator::new(3).unwrap();
        nav.next();
        nav.next();
        nav.next();
        nav.next();
        assert_eq!(nav.cursor(), 2);
        assert!(nav.is_last());
    }

    #[test]
    fn previous_clamps_at_first_question() {
        let mut nav = Navigator::new(3).unwrap();
        nav.previous();
        nav.previous();
        assert_eq!(nav.cursor(), 0);
    }

    #[test]
    fn jump_clamps_into_range() {
        let mut nav = Navigator::new(3).unwrap();
        nav.jump_to(99);
        assert_eq!(nav.cursor(), 2);
        nav.jump_to(1);
        assert_eq!(nav.cursor(), 1);
    }

    #[test]
    fn single_question_is_both_first_and_last() {
        let nav = Navigator::new(1).unwrap();
        assert!(nav.is_first());
        assert!(nav.is_last());
    }
}
