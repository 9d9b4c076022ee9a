use std::io::{self, BufRead, Write};

/// Ask a yes/no question on stdout and read the answer from stdin.
/// An empty answer picks `default`; without a default the question repeats.
pub fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let stdin = io::stdin();
    confirm_with(prompt, default, &mut stdin.lock(), &mut io::stdout())
}

fn confirm_with<R: BufRead, W: Write>(
    prompt: &str,
    default: Option<bool>,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    let hint = match default {
        Some(true) => "Y/n",
        Some(false) | None => "y/N",
    };
    let mut line = String::new();

    loop {
        write!(output, "{} ({}): ", prompt, hint)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            // stdin closed
            return Ok(default.unwrap_or(false));
        }
        if let Some(answer) = parse_answer(&line, default) {
            return Ok(answer);
        }
    }
}

fn parse_answer(line: &str, default: Option<bool>) -> Option<bool> {
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" | "s" | "si" => Some(true),
        "n" | "no" => Some(false),
        "" => default,
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("Y\n", None), Some(true));
        assert_eq!(parse_answer("si", Some(false)), Some(true));
        assert_eq!(parse_answer(" no ", Some(true)), Some(false));
        assert_eq!(parse_answer("\n", Some(false)), Some(false));
        assert_eq!(parse_answer("\n", None), None);
        assert_eq!(parse_answer("forse", Some(true)), None);
    }

    #[test]
    fn test_confirm_repeats_until_answered() {
        let mut input = Cursor::new("maybe\n\ny\n");
        let mut output = Vec::new();

        let answer = confirm_with("Delete?", None, &mut input, &mut output).unwrap();

        assert!(answer);
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("Delete? (y/N): ").count(), 3);
    }

    #[test]
    fn test_confirm_closed_input_declines() {
        let mut input = Cursor::new("");
        let answer = confirm_with("Delete?", None, &mut input, &mut Vec::new()).unwrap();
        assert!(!answer);
    }
}
