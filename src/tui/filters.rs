//! Multi-select state behind the sidebar filter lists.

use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub selected: bool,
}

/// One multi-select list with a cursor.
#[derive(Debug, Clone, Default)]
pub struct MultiSelect {
    pub title: &'static str,
    pub choices: Vec<Choice>,
    pub cursor: usize,
}

impl MultiSelect {
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            choices: Vec::new(),
            cursor: 0,
        }
    }

    /// Replace the options after a (re)load.
    ///
    /// Options seen before keep their state. New options are selected when
    /// `initial` is `None`, or when `initial` names them.
    pub fn sync(&mut self, options: &[String], initial: Option<&[String]>) {
        let previous = std::mem::take(&mut self.choices);
        self.choices = options
            .iter()
            .map(|label| {
                let selected = match previous.iter().find(|c| &c.label == label) {
                    Some(prev) => prev.selected,
                    None => initial.is_none_or(|wanted| wanted.contains(label)),
                };
                Choice {
                    label: label.clone(),
                    selected,
                }
            })
            .collect();
        self.cursor = self.cursor.min(self.choices.len().saturating_sub(1));
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.choices.is_empty() {
            return;
        }
        let last = self.choices.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    pub fn toggle(&mut self) {
        if let Some(choice) = self.choices.get_mut(self.cursor) {
            choice.selected = !choice.selected;
        }
    }

    pub fn set_all(&mut self, selected: bool) {
        for choice in &mut self.choices {
            choice.selected = selected;
        }
    }

    pub fn selected(&self) -> BTreeSet<String> {
        self.choices
            .iter()
            .filter(|c| c.selected)
            .map(|c| c.label.clone())
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.choices.iter().filter(|c| c.selected).count()
    }
}
