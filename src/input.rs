use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::snake::Direction;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    Reset,
    Pause,
    Quit,
}

/// Maps a key press to a command. Releases and unbound keys map to `None`.
pub fn command_for(key: &KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    if is_ctrl_c(key) {
        return Some(Command::Quit);
    }

    let cmd = match key.code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Command::Turn(Direction::Left),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Command::Turn(Direction::Up),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Command::Turn(Direction::Right),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Command::Turn(Direction::Down),
        KeyCode::Char('r') | KeyCode::Char('R') => Command::Reset,
        KeyCode::Esc | KeyCode::Char('p') | KeyCode::Char('P') => Command::Pause,
        KeyCode::Char('q') | KeyCode::Char('Q') => Command::Quit,
        _ => return None,
    };

    Some(cmd)
}

pub fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(command_for(&press(KeyCode::Left)), Some(Command::Turn(Direction::Left)));
        assert_eq!(command_for(&press(KeyCode::Up)), Some(Command::Turn(Direction::Up)));
        assert_eq!(command_for(&press(KeyCode::Right)), Some(Command::Turn(Direction::Right)));
        assert_eq!(command_for(&press(KeyCode::Down)), Some(Command::Turn(Direction::Down)));
    }

    #[test]
    fn test_wasd_buttons() {
        assert_eq!(command_for(&press(KeyCode::Char('a'))), Some(Command::Turn(Direction::Left)));
        assert_eq!(command_for(&press(KeyCode::Char('w'))), Some(Command::Turn(Direction::Up)));
        assert_eq!(command_for(&press(KeyCode::Char('D'))), Some(Command::Turn(Direction::Right)));
        assert_eq!(command_for(&press(KeyCode::Char('s'))), Some(Command::Turn(Direction::Down)));
    }

    #[test]
    fn test_controls() {
        assert_eq!(command_for(&press(KeyCode::Char('r'))), Some(Command::Reset));
        assert_eq!(command_for(&press(KeyCode::Esc)), Some(Command::Pause));
        assert_eq!(command_for(&press(KeyCode::Char('q'))), Some(Command::Quit));

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(command_for(&ctrl_c), Some(Command::Quit));
    }

    #[test]
    fn test_unbound_keys_are_ignored() {
        assert_eq!(command_for(&press(KeyCode::Char('x'))), None);
        assert_eq!(command_for(&press(KeyCode::Char('c'))), None);
        assert_eq!(command_for(&press(KeyCode::Enter)), None);
    }

    #[test]
    fn test_release_is_ignored() {
        let release = KeyEvent {
            code: KeyCode::Up,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(command_for(&release), None);
    }
}
