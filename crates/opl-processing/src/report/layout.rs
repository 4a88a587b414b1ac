//! Line wrapping for report text blocks

use super::fonts::{encode_win_ansi, Font};

/// Wrap `text` into encoded lines no wider than `max_width` points.
///
/// Explicit newlines start a new line and a single trailing newline is
/// ignored. Words longer than a full line are broken between characters.
pub fn wrap_text(font: Font, size: f32, text: &str, max_width: f32) -> Vec<Vec<u8>> {
    let text = text.strip_suffix('\n').unwrap_or(text);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let encoded = encode_win_ansi(paragraph);
        let mut current: Vec<u8> = Vec::new();

        for word in encoded.split(|b| *b == b' ') {
            let mut candidate = current.clone();
            if !candidate.is_empty() {
                candidate.push(b' ');
            }
            candidate.extend_from_slice(word);

            if font.text_width(&candidate, size) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if font.text_width(word, size) <= max_width {
                current = word.to_vec();
            } else {
                for byte in word {
                    current.push(*byte);
                    if font.text_width(&current, size) > max_width && current.len() > 1 {
                        current.pop();
                        lines.push(std::mem::replace(&mut current, vec![*byte]));
                    }
                }
            }
        }

        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_strings(lines: Vec<Vec<u8>>) -> Vec<String> {
        lines
            .into_iter()
            .map(|l| String::from_utf8(l).unwrap())
            .collect()
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = as_strings(wrap_text(Font::Regular, 12.0, "Pump P-101", 500.0));
        assert_eq!(lines, vec!["Pump P-101"]);
    }

    #[test]
    fn long_text_wraps_at_word_boundaries() {
        let text = "Replaced the worn mechanical seal on the cooling water pump and realigned the coupling";
        let lines = as_strings(wrap_text(Font::Regular, 12.0, text, 150.0));

        assert!(lines.len() > 1);
        for line in &lines {
            let width = Font::Regular.text_width(line.as_bytes(), 12.0);
            assert!(width <= 150.0, "'{}' is {} wide", line, width);
            assert!(!line.starts_with(' '));
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn explicit_newlines_are_kept_and_trailing_one_dropped() {
        let lines = as_strings(wrap_text(Font::Regular, 12.0, "Step 1\n\nStep 2\n", 500.0));
        assert_eq!(lines, vec!["Step 1", "", "Step 2"]);
    }

    #[test]
    fn overlong_word_is_split_across_lines() {
        let word = "X".repeat(60);
        let lines = as_strings(wrap_text(Font::Regular, 12.0, &word, 100.0));

        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(Font::Regular.text_width(line.as_bytes(), 12.0) <= 100.0);
        }
    }
}
