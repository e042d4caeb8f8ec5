use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::tui::state::TablePicker;

pub fn handle_key(picker: &mut TablePicker, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => picker.abort(),
        KeyCode::Esc | KeyCode::Char('q') => picker.abort(),
        KeyCode::Up | KeyCode::Char('k') => picker.move_up(),
        KeyCode::Down | KeyCode::Char('j') => picker.move_down(),
        KeyCode::Char(' ') => picker.toggle(),
        KeyCode::Char('a') => picker.toggle_all(),
        KeyCode::Enter => picker.confirm(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::state::PickerOutcome;

    fn press(picker: &mut TablePicker, code: KeyCode) {
        handle_key(picker, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn picker() -> TablePicker {
        TablePicker::new(&[
            "orders".to_string(),
            "sessions".to_string(),
            "users".to_string(),
        ])
    }

    #[test]
    fn space_toggles_the_table_under_the_cursor() {
        let mut picker = picker();
        press(&mut picker, KeyCode::Down);
        press(&mut picker, KeyCode::Char(' '));
        press(&mut picker, KeyCode::Enter);

        assert_eq!(
            picker.selection(),
            Some(vec!["orders".to_string(), "users".to_string()])
        );
    }

    #[test]
    fn cursor_stays_inside_the_list() {
        let mut picker = picker();
        press(&mut picker, KeyCode::Up);
        assert_eq!(picker.cursor, 0);
        for _ in 0..5 {
            press(&mut picker, KeyCode::Char('j'));
        }
        assert_eq!(picker.cursor, 2);
    }

    #[test]
    fn a_clears_then_restores_every_table() {
        let mut picker = picker();
        press(&mut picker, KeyCode::Char('a'));
        assert_eq!(picker.selected_count(), 0);

        press(&mut picker, KeyCode::Enter);
        assert_eq!(picker.selection(), Some(Vec::new()));

        let mut picker = self::picker();
        press(&mut picker, KeyCode::Char(' '));
        press(&mut picker, KeyCode::Char('a'));
        assert_eq!(picker.selected_count(), 3);
    }

    #[test]
    fn escape_and_ctrl_c_abort() {
        let mut picker = picker();
        press(&mut picker, KeyCode::Esc);
        assert_eq!(picker.outcome, Some(PickerOutcome::Aborted));
        assert_eq!(picker.selection(), None);

        let mut picker = self::picker();
        handle_key(
            &mut picker,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(picker.is_done());
        assert_eq!(picker.selection(), None);
    }
}
