use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct ScreenLayout {
    pub header_area: Rect,
    pub body_area: Rect,
    pub help_area: Rect,
}

pub struct QuizLayout {
    pub header_area: Rect,
    pub question_area: Rect,
    pub answer_area: Rect,
    pub status_area: Rect,
    pub help_area: Rect,
}

/// Title bar, body and a one-line key help bar.
pub fn calculate_screen_chunks(area: Rect) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);

    ScreenLayout {
        header_area: chunks[0],
        body_area: chunks[1],
        help_area: chunks[2],
    }
}

pub fn calculate_quiz_chunks(area: Rect) -> QuizLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(4),
            Constraint::Percentage(50),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(area);

    QuizLayout {
        header_area: chunks[0],
        question_area: chunks[1],
        answer_area: chunks[2],
        status_area: chunks[3],
        help_area: chunks[4],
    }
}

/// Split `area` into a left column of `left_percent` and a right column.
pub fn split_columns(area: Rect, left_percent: u16) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(left_percent),
            Constraint::Percentage(100 - left_percent.min(100)),
        ])
        .split(area);
    (chunks[0], chunks[1])
}

/// Stack fixed-height rows on top of a flexible remainder.
pub fn stack(area: Rect, heights: &[u16]) -> Vec<Rect> {
    let constraints: Vec<Constraint> = heights
        .iter()
        .map(|h| Constraint::Length(*h))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();
    Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area)
        .to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_layout() {
        let layout = calculate_screen_chunks(Rect::new(0, 0, 100, 40));
        assert_eq!(layout.header_area.height, 3);
        assert_eq!(layout.help_area.height, 3);
        // Margin 1 leaves 38 rows.
        assert_eq!(layout.body_area.height, 32);
    }

    #[test]
    fn test_quiz_layout() {
        let layout = calculate_quiz_chunks(Rect::new(0, 0, 100, 100));
        assert_eq!(layout.header_area.height, 3);
        assert_eq!(layout.status_area.height, 3);
        assert_eq!(layout.help_area.height, 3);
        assert!(layout.question_area.height >= 4);
        assert!(layout.answer_area.height > 0);
    }

    #[test]
    fn test_split_columns() {
        let (left, right) = split_columns(Rect::new(0, 0, 100, 10), 60);
        assert_eq!(left.width, 60);
        assert_eq!(right.width, 40);
        assert_eq!(right.x, 60);
    }

    #[test]
    fn test_stack_keeps_remainder() {
        let rows = stack(Rect::new(0, 0, 50, 20), &[3, 5]);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].height, 3);
        assert_eq!(rows[1].height, 5);
        assert_eq!(rows[2].height, 12);
    }
}
