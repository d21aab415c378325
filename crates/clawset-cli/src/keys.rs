//! Decoding raw terminal input into key presses.

/// ASCII escape.
pub const ESC: u8 = 0x1b;

/// A key press as far as the prompts care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Backspace,
    /// Ctrl-C.
    Interrupt,
    /// A lone ESC. Widgets ignore it; cancellation is handled by the
    /// listener on the raw stream, not by key bindings.
    Escape,
    Char(char),
    /// Anything else (function keys, Alt combos, stray control bytes).
    Unknown,
}

/// Split one raw chunk into keys. A chunk can hold several keys (pastes,
/// fast typing), and escape sequences are never split across keys.
pub fn decode(chunk: &[u8]) -> Vec<Key> {
    let mut keys = Vec::new();
    let mut text = Vec::new();
    let mut i = 0;

    while i < chunk.len() {
        let byte = chunk[i];
        if byte >= 0x20 && byte != 0x7f {
            text.push(byte);
            i += 1;
            continue;
        }

        flush_text(&mut text, &mut keys);
        match byte {
            ESC => {
                let (key, len) = decode_escape(&chunk[i..]);
                keys.push(key);
                i += len;
                continue;
            }
            b'\r' | b'\n' => keys.push(Key::Enter),
            0x7f | 0x08 => keys.push(Key::Backspace),
            0x03 => keys.push(Key::Interrupt),
            _ => keys.push(Key::Unknown),
        }
        i += 1;
    }

    flush_text(&mut text, &mut keys);
    keys
}

/// Decode an escape sequence at the start of `seq`; returns the key and the
/// number of bytes it used.
fn decode_escape(seq: &[u8]) -> (Key, usize) {
    match seq.get(1) {
        None => (Key::Escape, 1),
        Some(b'[') | Some(b'O') => {
            // CSI/SS3: parameters then one final byte in 0x40..=0x7e.
            let end = seq[2..]
                .iter()
                .position(|b| (0x40..=0x7e).contains(b))
                .map(|p| p + 2);
            match end {
                Some(end) => {
                    let key = match seq[end] {
                        b'A' => Key::Up,
                        b'B' => Key::Down,
                        _ => Key::Unknown,
                    };
                    (key, end + 1)
                }
                None => (Key::Unknown, seq.len()),
            }
        }
        // Alt+<key>.
        Some(_) => (Key::Unknown, 2),
    }
}

fn flush_text(text: &mut Vec<u8>, keys: &mut Vec<Key>) {
    if text.is_empty() {
        return;
    }
    keys.extend(String::from_utf8_lossy(text).chars().map(Key::Char));
    text.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_keys() {
        assert_eq!(decode(b"\x1b[A"), vec![Key::Up]);
        assert_eq!(decode(b"\x1b[B"), vec![Key::Down]);
        assert_eq!(decode(b"\x1bOB"), vec![Key::Down]);
        assert_eq!(decode(b"\x1b[B\x1b[B\r"), vec![Key::Down, Key::Down, Key::Enter]);
    }

    #[test]
    fn test_lone_escape() {
        assert_eq!(decode(b"\x1b"), vec![Key::Escape]);
    }

    #[test]
    fn test_function_keys_are_unknown() {
        assert_eq!(decode(b"\x1b[15~"), vec![Key::Unknown]);
        assert_eq!(decode(b"\x1bx"), vec![Key::Unknown]);
    }

    #[test]
    fn test_text_and_controls() {
        assert_eq!(
            decode("sk-é\x7f\r".as_bytes()),
            vec![
                Key::Char('s'),
                Key::Char('k'),
                Key::Char('-'),
                Key::Char('é'),
                Key::Backspace,
                Key::Enter
            ]
        );
        assert_eq!(decode(b"\x03"), vec![Key::Interrupt]);
    }
}
