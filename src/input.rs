use std::io::{BufRead, Write};

use crate::error::{AppError, AppResult};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputKind {
    Text,
    Integer,
    Float,
}

/// One question to put to the user and the rules its answer must follow.
#[derive(Clone, Copy, Debug)]
pub struct Prompt<'a> {
    pub question: &'a str,
    pub error: &'a str,
    pub kind: InputKind,
    pub allow_blank: bool,
    /// When set, the answer must be one of these tokens (ignoring case). Other
    /// answers are silently asked again.
    pub choices: Option<[&'a str; 2]>,
}

impl<'a> Prompt<'a> {
    pub fn text(question: &'a str, error: &'a str) -> Self {
        Self { question, error, kind: InputKind::Text, allow_blank: false, choices: None }
    }

    pub fn integer(question: &'a str, error: &'a str) -> Self {
        Self { kind: InputKind::Integer, ..Self::text(question, error) }
    }

    pub fn float(question: &'a str, error: &'a str) -> Self {
        Self { kind: InputKind::Float, ..Self::text(question, error) }
    }

    pub fn yes_no(question: &'a str) -> Self {
        Self { choices: Some(["Y", "N"]), ..Self::text(question, "Please enter either Y or N") }
    }

    pub fn blank_allowed(mut self) -> Self {
        self.allow_blank = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Answer {
    Blank,
    Text(String),
    Integer(i64),
    Float(f64),
}

impl Answer {
    pub fn into_text(self) -> String {
        match self {
            Answer::Text(s) => s,
            Answer::Integer(n) => n.to_string(),
            Answer::Float(f) => f.to_string(),
            Answer::Blank => String::new(),
        }
    }

    pub fn integer(&self) -> Option<i64> {
        match self {
            Answer::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn float(&self) -> Option<f64> {
        match self {
            Answer::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// Line-oriented terminal I/O for the shell.
pub struct Console<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Reads one trimmed line after printing `question`. Fails with
    /// [`AppError::InputClosed`] once input is exhausted.
    pub fn read_line(&mut self, question: &str) -> AppResult<String> {
        write!(self.out, "{question}")?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(AppError::InputClosed);
        }
        Ok(line.trim().to_string())
    }

    /// Asks until the answer satisfies `prompt`.
    pub fn ask(&mut self, prompt: &Prompt<'_>) -> AppResult<Answer> {
        loop {
            let line = self.read_line(prompt.question)?;

            if line.is_empty() {
                if prompt.allow_blank {
                    return Ok(Answer::Blank);
                }
                let label = blank_label(prompt.kind);
                writeln!(self.out, "{label} cannot be empty. Please try again!")?;
                continue;
            }

            let answer = match prompt.kind {
                InputKind::Text => Some(Answer::Text(line)),
                InputKind::Integer => line.parse().ok().map(Answer::Integer),
                InputKind::Float => {
                    line.parse::<f64>().ok().filter(|f| f.is_finite()).map(Answer::Float)
                },
            };

            let Some(answer) = answer else {
                writeln!(self.out, "{}", prompt.error)?;
                continue;
            };

            if let (Some(choices), Answer::Text(text)) = (prompt.choices, &answer) {
                match choices.iter().find(|c| c.eq_ignore_ascii_case(text)) {
                    Some(choice) => return Ok(Answer::Text(choice.to_string())),
                    None => continue,
                }
            }

            return Ok(answer);
        }
    }

    pub fn ask_text(&mut self, question: &str, error: &str) -> AppResult<String> {
        Ok(self.ask(&Prompt::text(question, error))?.into_text())
    }

    pub fn ask_float(&mut self, question: &str, error: &str) -> AppResult<f64> {
        match self.ask(&Prompt::float(question, error))? {
            Answer::Float(value) => Ok(value),
            other => unreachable!("float prompt without blanks answered {other:?}"),
        }
    }

    pub fn ask_optional_float(&mut self, question: &str, error: &str) -> AppResult<Option<f64>> {
        Ok(self.ask(&Prompt::float(question, error).blank_allowed())?.float())
    }

    pub fn ask_optional_integer(&mut self, question: &str, error: &str) -> AppResult<Option<i64>> {
        Ok(self.ask(&Prompt::integer(question, error).blank_allowed())?.integer())
    }

    /// True for the first of the two tokens.
    pub fn ask_yes_no(&mut self, question: &str) -> AppResult<bool> {
        let prompt = Prompt::yes_no(question);
        let answer = self.ask(&prompt)?.into_text();
        Ok(prompt.choices.is_some_and(|[yes, _]| answer == yes))
    }
}

fn blank_label(kind: InputKind) -> &'static str {
    match kind {
        InputKind::Text => "Input string",
        InputKind::Integer => "Input integer value",
        InputKind::Float => "Input float value",
    }
}
