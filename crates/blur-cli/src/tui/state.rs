/// How the picker was left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerOutcome {
    Confirmed,
    Aborted,
}

/// Multi-select over the candidate tables. Every table starts selected.
#[derive(Debug, Clone)]
pub struct TablePicker {
    pub tables: Vec<String>,
    pub selected: Vec<bool>,
    pub cursor: usize,
    pub outcome: Option<PickerOutcome>,
}

impl TablePicker {
    pub fn new(tables: &[String]) -> Self {
        Self {
            tables: tables.to_vec(),
            selected: vec![true; tables.len()],
            cursor: 0,
            outcome: None,
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        self.cursor = (self.cursor + 1).min(self.tables.len().saturating_sub(1));
    }

    pub fn toggle(&mut self) {
        if let Some(flag) = self.selected.get_mut(self.cursor) {
            *flag = !*flag;
        }
    }

    /// Select everything, or nothing when everything is already selected.
    pub fn toggle_all(&mut self) {
        let all = self.selected.iter().all(|flag| *flag);
        self.selected.iter_mut().for_each(|flag| *flag = !all);
    }

    pub fn confirm(&mut self) {
        self.outcome = Some(PickerOutcome::Confirmed);
    }

    pub fn abort(&mut self) {
        self.outcome = Some(PickerOutcome::Aborted);
    }

    pub fn is_done(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.iter().filter(|flag| **flag).count()
    }

    /// Selected tables in list order; `None` when the picker was aborted.
    pub fn selection(&self) -> Option<Vec<String>> {
        match self.outcome {
            Some(PickerOutcome::Confirmed) => Some(
                self.tables
                    .iter()
                    .zip(&self.selected)
                    .filter(|(_, selected)| **selected)
                    .map(|(table, _)| table.clone())
                    .collect(),
            ),
            _ => None,
        }
    }
}
