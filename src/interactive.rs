//! Form-style interactive front end.
//!
//! Each round asks for a clip, a start and end time, a method and its
//! keypoints, then renders the result to a preview image and prints a short
//! summary. Validation problems are reported inline and the round is skipped;
//! the session ends when input ends or `quit` is entered at the clip prompt.

use crate::{
    config::{ClipAlias, Config},
    constants::MAX_SECONDS_FIELD,
    dataset::CoordinateSource,
    keypoints::{default_selection, parse_selection, KeypointId},
    pipeline::{AnalysisRequest, Analyzer},
    render::{caption, render_analysis, save_png, PlotRenderer},
    signal::AnalysisMethod,
    summary::Statistics,
    time_range::{TimeRange, Timestamp},
    Error, Result,
};
use log::{debug, info};
use rustyline::{error::ReadlineError, DefaultEditor};
use std::path::PathBuf;

/// Source of answers for the form
pub trait Prompt {
    /// Ask a question and read one line; `None` when input has ended
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails for a reason other than end of input
    fn ask(&mut self, question: &str) -> Result<Option<String>>;

    /// Show a message to the user
    fn show(&mut self, message: &str);
}

/// Line editor on the terminal
pub struct TerminalPrompt {
    editor: DefaultEditor,
}

impl TerminalPrompt {
    /// Create a prompt bound to the terminal
    ///
    /// # Errors
    ///
    /// Returns `Readline` if the terminal cannot be set up
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(|e| Error::Readline(e.to_string()))?;
        Ok(Self { editor })
    }

    /// Add a non-blank answer to the line history; history is best-effort
    fn remember(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        if let Err(e) = self.editor.add_history_entry(line) {
            debug!("Answer not added to history: {e}");
        }
    }
}

impl Prompt for TerminalPrompt {
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        match self.editor.readline(question) {
            Ok(line) => {
                self.remember(&line);
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(e) => Err(Error::Readline(e.to_string())),
        }
    }

    fn show(&mut self, message: &str) {
        println!("{message}");
    }
}

/// Answers collected in one round
#[derive(Debug, Clone, PartialEq)]
pub struct FormInput {
    pub clip: ClipAlias,
    pub start: Timestamp,
    pub end: Timestamp,
    pub method: AnalysisMethod,
    pub keypoints: Vec<KeypointId>,
}

impl FormInput {
    #[must_use]
    pub fn request(&self) -> AnalysisRequest {
        AnalysisRequest::new(
            self.clip.id.clone(),
            TimeRange::new(self.start, self.end),
            self.method,
            self.keypoints.clone(),
        )
    }

    /// Echo of the request shown before the result
    #[must_use]
    pub fn describe(&self) -> String {
        let names: Vec<&str> = self.keypoints.iter().map(|k| k.name()).collect();
        format!(
            "- Clip: {}\n- Range: {} ~ {}\n- Method: {}\n- Keypoints: {}",
            self.clip.label,
            self.start,
            self.end,
            self.method.description(),
            names.join(", ")
        )
    }
}

/// One interactive session
pub struct Session<'a, P, S> {
    prompt: P,
    analyzer: Analyzer<'a, S>,
    clips: Vec<ClipAlias>,
    max_minutes: u32,
    renderer: PlotRenderer,
    preview_path: PathBuf,
}

impl<'a, P: Prompt, S: CoordinateSource> Session<'a, P, S> {
    pub fn new(prompt: P, analyzer: Analyzer<'a, S>, config: &Config) -> Self {
        let clips = if config.interactive.clips.is_empty() {
            analyzer
                .metadata()
                .clip_ids()
                .map(|id| ClipAlias {
                    label: id.to_string(),
                    id: id.to_string(),
                })
                .collect()
        } else {
            config.interactive.clips.clone()
        };

        Self {
            prompt,
            analyzer,
            clips,
            max_minutes: config.interactive.max_minutes,
            renderer: PlotRenderer::new(config.render.clone()),
            preview_path: config.output.output_dir.join(&config.interactive.preview_file),
        }
    }

    #[must_use]
    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Run rounds until input ends; returns the number of rendered results
    ///
    /// # Errors
    ///
    /// Input failures and data errors (unknown clip, unreadable files) end
    /// the session. Validation errors do not.
    pub fn run(&mut self) -> Result<usize> {
        let mut rendered = 0;
        while let Some(form) = self.read_form()? {
            if self.submit(&form)? {
                rendered += 1;
            }
        }
        info!("Interactive session finished after {rendered} results");
        Ok(rendered)
    }

    /// Analyze and render one form. Returns `false` when the request was
    /// rejected by validation.
    ///
    /// # Errors
    ///
    /// Returns non-validation errors from loading, analysis or saving
    pub fn submit(&mut self, form: &FormInput) -> Result<bool> {
        self.prompt.show(&form.describe());

        let analysis = match self.analyzer.run(&form.request()) {
            Ok(analysis) => analysis,
            Err(e) if e.is_validation() => {
                self.prompt.show(&format!("Warning: {e}"));
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let image = render_analysis(&mut self.renderer, &analysis)?;
        save_png(&image, &self.preview_path)?;

        self.prompt.show(&caption(&analysis));
        for (label, stats) in Statistics::of_signal(&analysis.signal) {
            match stats {
                Some(stats) => self.prompt.show(&format!("  {label}: {stats}")),
                None => self.prompt.show(&format!("  {label}: no defined values")),
            }
        }
        self.prompt
            .show(&format!("Plot written to {}", self.preview_path.display()));

        Ok(true)
    }

    /// Collect one form; `None` when input ends or the user quits
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt fails
    pub fn read_form(&mut self) -> Result<Option<FormInput>> {
        let Some(clip) = self.ask_clip()? else {
            return Ok(None);
        };
        let Some(start) = self.ask_timestamp("Start")? else {
            return Ok(None);
        };
        let Some(end) = self.ask_timestamp("End")? else {
            return Ok(None);
        };
        let Some(method) = self.ask_method()? else {
            return Ok(None);
        };
        let Some(keypoints) = self.ask_keypoints(method)? else {
            return Ok(None);
        };

        debug!("Form: {} {start}-{end} {method} {keypoints:?}", clip.id);
        Ok(Some(FormInput {
            clip,
            start,
            end,
            method,
            keypoints,
        }))
    }

    fn ask_clip(&mut self) -> Result<Option<ClipAlias>> {
        let options: Vec<String> = self
            .clips
            .iter()
            .enumerate()
            .map(|(i, clip)| format!("  {}) {}", i + 1, clip.label))
            .collect();
        self.prompt.show(&format!("Clips:\n{}", options.join("\n")));

        loop {
            let Some(answer) = self.prompt.ask("Clip [1, q to quit]: ")? else {
                return Ok(None);
            };
            let answer = answer.trim();
            if answer.eq_ignore_ascii_case("q") || answer.eq_ignore_ascii_case("quit") {
                return Ok(None);
            }

            let choice = if answer.is_empty() {
                self.clips.first()
            } else if let Ok(number) = answer.parse::<usize>() {
                number.checked_sub(1).and_then(|i| self.clips.get(i))
            } else {
                self.clips
                    .iter()
                    .find(|c| c.label.eq_ignore_ascii_case(answer) || c.id == answer)
            };

            match choice {
                Some(clip) => return Ok(Some(clip.clone())),
                None => self.prompt.show(&format!("Unknown clip '{answer}'")),
            }
        }
    }

    fn ask_bounded(&mut self, question: &str, max: u32) -> Result<Option<u32>> {
        loop {
            let Some(answer) = self.prompt.ask(question)? else {
                return Ok(None);
            };
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(Some(0));
            }
            match answer.parse::<u32>() {
                Ok(value) if value <= max => return Ok(Some(value)),
                _ => self
                    .prompt
                    .show(&format!("Enter a whole number between 0 and {max}")),
            }
        }
    }

    fn ask_timestamp(&mut self, which: &str) -> Result<Option<Timestamp>> {
        let max_minutes = self.max_minutes;
        let Some(minutes) = self.ask_bounded(&format!("{which} time (minutes) [0]: "), max_minutes)? else {
            return Ok(None);
        };
        let Some(seconds) = self.ask_bounded(&format!("{which} time (seconds) [0]: "), MAX_SECONDS_FIELD)? else {
            return Ok(None);
        };
        Timestamp::new(minutes, seconds).map(Some)
    }

    fn ask_method(&mut self) -> Result<Option<AnalysisMethod>> {
        let options: Vec<String> = AnalysisMethod::ALL
            .iter()
            .enumerate()
            .map(|(i, m)| format!("  {}) {} - {}", i + 1, m.name(), m.description()))
            .collect();
        self.prompt.show(&format!("Methods:\n{}", options.join("\n")));

        loop {
            let Some(answer) = self.prompt.ask("Method [1]: ")? else {
                return Ok(None);
            };
            let answer = answer.trim();
            let choice = if answer.is_empty() {
                Some(AnalysisMethod::Track)
            } else if let Ok(number) = answer.parse::<usize>() {
                number
                    .checked_sub(1)
                    .and_then(|i| AnalysisMethod::ALL.get(i).copied())
            } else {
                answer.parse().ok()
            };

            match choice {
                Some(method) => return Ok(Some(method)),
                None => self.prompt.show(&format!("Unknown method '{answer}'")),
            }
        }
    }

    fn ask_keypoints(&mut self, method: AnalysisMethod) -> Result<Option<Vec<KeypointId>>> {
        let defaults = default_selection(method);
        let default_names: Vec<&str> = defaults.iter().map(|k| k.name()).collect();
        let question = format!(
            "Keypoints, {} for {} [{}]: ",
            method.arity(),
            method,
            default_names.join(", ")
        );

        loop {
            let Some(answer) = self.prompt.ask(&question)? else {
                return Ok(None);
            };
            if answer.trim().is_empty() {
                return Ok(Some(defaults));
            }
            match parse_selection(&answer) {
                Ok(keypoints) if keypoints.len() > method.arity() => self.prompt.show(&format!(
                    "Warning: Too many keypoints for {method}: expected {}, got {}",
                    method.arity(),
                    keypoints.len()
                )),
                Ok(keypoints) => return Ok(Some(keypoints)),
                Err(e) => self.prompt.show(&format!("Warning: {e}")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustyline::history::History;

    #[test]
    fn test_blank_answers_stay_out_of_history() {
        // No terminal in some test environments
        let Ok(mut prompt) = TerminalPrompt::new() else {
            return;
        };

        prompt.remember("  ");
        prompt.remember("");
        assert!(prompt.editor.history().is_empty());

        prompt.remember("sync_1");
        assert_eq!(prompt.editor.history().len(), 1);
    }
}
