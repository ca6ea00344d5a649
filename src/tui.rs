use colored::Colorize;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, ClearType},
};
use std::io::{Write, stdout};

/// Raw-mode guard. Cursor hidden while held; restored on drop.
pub struct Raw(());

impl Raw {
    pub fn enter() -> Self {
        terminal::enable_raw_mode().ok();
        execute!(stdout(), cursor::Hide).ok();
        Raw(())
    }
}

impl Drop for Raw {
    fn drop(&mut self) {
        execute!(stdout(), cursor::Show).ok();
        terminal::disable_raw_mode().ok();
    }
}

/// Keys the prompts care about.
enum Input {
    Up,
    Down,
    Submit,
    Abort,
    Erase,
    EraseAll,
    Char(char),
}

/// Block until a relevant key press arrives.
fn next_input(letters_navigate: bool) -> Input {
    loop {
        let Ok(Event::Key(key)) = event::read() else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let input = match key.code {
            KeyCode::Char('c') if ctrl => Input::Abort,
            KeyCode::Char('u') if ctrl => Input::EraseAll,
            KeyCode::Up => Input::Up,
            KeyCode::Down => Input::Down,
            KeyCode::Char('k') if letters_navigate => Input::Up,
            KeyCode::Char('j') if letters_navigate => Input::Down,
            KeyCode::Char('q') if letters_navigate => Input::Abort,
            KeyCode::Enter => Input::Submit,
            KeyCode::Esc => Input::Abort,
            KeyCode::Backspace => Input::Erase,
            KeyCode::Char(c) => Input::Char(c),
            _ => continue,
        };
        return input;
    }
}

/// Print a line in raw mode.
pub fn raw_println(msg: &str) {
    let mut stdout = stdout();
    for line in msg.split('\n') {
        crossterm::queue!(
            stdout,
            crossterm::style::Print(line),
            crossterm::style::Print("\r\n")
        )
        .ok();
    }
    stdout.flush().ok();
}

/// Redraw `lines` over the previous `prev_count` lines.
fn redraw(stdout: &mut impl Write, lines: &[String], prev_count: usize) {
    if prev_count > 0 {
        crossterm::queue!(stdout, cursor::MoveUp(prev_count as u16)).ok();
    }
    for line in lines {
        crossterm::queue!(
            stdout,
            terminal::Clear(ClearType::CurrentLine),
            crossterm::style::Print(line),
            crossterm::style::Print("\r\n")
        )
        .ok();
    }
    crossterm::queue!(stdout, terminal::Clear(ClearType::FromCursorDown)).ok();
    stdout.flush().ok();
}

/// Erase the `count` lines above the cursor.
fn clear_lines(stdout: &mut impl Write, count: usize) {
    if count == 0 {
        return;
    }
    crossterm::queue!(
        stdout,
        cursor::MoveUp(count as u16),
        terminal::Clear(ClearType::FromCursorDown)
    )
    .ok();
    stdout.flush().ok();
}

/// Arrow-key menu. Returns the chosen index, or `None` on Esc/q/Ctrl-C.
pub fn raw_select(prompt: &str, items: &[String], default: usize) -> Option<usize> {
    if items.is_empty() {
        return None;
    }
    let mut stdout = stdout();
    let mut pos = default.min(items.len() - 1);
    let mut drawn = 0;

    loop {
        let mut lines = Vec::with_capacity(items.len() + 1);
        lines.push(format!("  {}", prompt.bold()));
        for (i, item) in items.iter().enumerate() {
            if i == pos {
                lines.push(format!("  {} {}", ">".yellow().bold(), item));
            } else {
                lines.push(format!("    {}", item));
            }
        }
        redraw(&mut stdout, &lines, drawn);
        drawn = lines.len();

        match next_input(true) {
            Input::Up => pos = pos.checked_sub(1).unwrap_or(items.len() - 1),
            Input::Down => pos = (pos + 1) % items.len(),
            Input::Submit => {
                clear_lines(&mut stdout, drawn);
                return Some(pos);
            }
            Input::Abort => {
                clear_lines(&mut stdout, drawn);
                return None;
            }
            _ => {}
        }
    }
}

/// y/n question. `None` when aborted.
pub fn raw_confirm(prompt: &str, default: bool) -> Option<bool> {
    let mut stdout = stdout();
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    raw_println(&format!("  {} {}", prompt, hint.dimmed()));

    let answer = loop {
        match next_input(false) {
            Input::Char('y' | 'Y') => break Some(true),
            Input::Char('n' | 'N') => break Some(false),
            Input::Submit => break Some(default),
            Input::Abort | Input::Char('q') => break None,
            _ => {}
        }
    };
    clear_lines(&mut stdout, 1);
    answer
}

/// Single-line text entry, pre-filled with `default`.
pub fn raw_input(prompt: &str, default: &str) -> Option<String> {
    let mut stdout = stdout();
    let mut value = default.to_string();
    execute!(stdout, cursor::Show).ok();

    let result = loop {
        crossterm::queue!(
            stdout,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            crossterm::style::Print(format!("  {}: {}", prompt, value)),
        )
        .ok();
        stdout.flush().ok();

        match next_input(false) {
            Input::Submit => break Some(value),
            Input::Abort => break None,
            Input::Erase => {
                value.pop();
            }
            Input::EraseAll => value.clear(),
            Input::Char(c) => value.push(c),
            _ => {}
        }
    };

    crossterm::queue!(
        stdout,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
    )
    .ok();
    execute!(stdout, cursor::Hide).ok();
    result.map(|v| v.trim().to_string())
}
