//! Splits release names into bracket-enclosed groups and free text.

/// A run of the input, either inside a bracket pair or between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub enclosed: bool,
}

const BRACKETS: &[(char, char)] = &[('[', ']'), ('(', ')'), ('{', '}'), ('【', '】')];

fn closing_for(open: char) -> Option<char> {
    BRACKETS
        .iter()
        .find_map(|&(o, c)| if o == open { Some(c) } else { None })
}

/// Split `input` into segments. Empty and whitespace-only segments are
/// dropped. An opening bracket without a matching close is kept as text.
pub fn segments(input: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut text = String::new();
    let mut rest = input;

    while let Some(ch) = rest.chars().next() {
        let width = ch.len_utf8();
        if let Some(close) = closing_for(ch) {
            if let Some(end) = rest[width..].find(close) {
                push_segment(&mut out, std::mem::take(&mut text), false);
                let inner = &rest[width..width + end];
                push_segment(&mut out, inner.to_string(), true);
                rest = &rest[width + end + close.len_utf8()..];
                continue;
            }
        }
        text.push(ch);
        rest = &rest[width..];
    }
    push_segment(&mut out, text, false);
    out
}

fn push_segment(out: &mut Vec<Segment>, text: String, enclosed: bool) {
    if text.trim().is_empty() {
        return;
    }
    out.push(Segment { text, enclosed });
}

/// Split free text into words.
///
/// Underscores always act as spaces. Dots act as spaces only when the text
/// has no other delimiter, so `Dr. Stone` keeps its dot while
/// `Dr.Stone.S01E01` is split.
pub fn words(text: &str) -> Vec<String> {
    let text = text.replace('_', " ");
    let text = if text.trim().contains(' ') {
        text
    } else {
        text.replace('.', " ")
    };
    text.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str, enclosed: bool) -> Segment {
        Segment {
            text: text.to_string(),
            enclosed,
        }
    }

    #[test]
    fn splits_brackets_and_text() {
        let s = segments("[Group] Show Name - 01 (1080p) [ABCD1234]");
        assert_eq!(
            s,
            vec![
                seg("Group", true),
                seg(" Show Name - 01 ", false),
                seg("1080p", true),
                seg("ABCD1234", true),
            ]
        );
    }

    #[test]
    fn unmatched_bracket_stays_in_text() {
        let s = segments("Show [Name");
        assert_eq!(s, vec![seg("Show [Name", false)]);
    }

    #[test]
    fn fullwidth_brackets() {
        let s = segments("【Group】Title");
        assert_eq!(s, vec![seg("Group", true), seg("Title", false)]);
    }

    #[test]
    fn dots_split_only_without_spaces() {
        assert_eq!(words("Dr.Stone.S01E01"), vec!["Dr", "Stone", "S01E01"]);
        assert_eq!(words("Dr. Stone - 01"), vec!["Dr.", "Stone", "-", "01"]);
        assert_eq!(words("Show_Name_-_01"), vec!["Show", "Name", "-", "01"]);
    }
}
