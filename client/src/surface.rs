use std::collections::{HashMap, VecDeque};

/// Input fields the action handlers clear after a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputField {
    DepositAmount,
    TransferTo,
    TransferAmount,
    BalanceAddress,
}

/// The display the session reports to: status line, blocking notices, the
/// balance region and the event log. Rendering is the implementor's concern.
pub trait Surface {
    fn set_status(&mut self, text: &str);

    /// A notice the user must acknowledge.
    fn notify(&mut self, message: &str);

    /// Inline render into the balance region.
    fn show_balance(&mut self, text: &str);

    /// Add a line above all existing event log lines.
    fn prepend_log(&mut self, line: &str);

    fn clear_input(&mut self, field: InputField);
}

/// A surface that keeps everything in memory, newest log line first.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    pub status: String,
    pub notices: Vec<String>,
    pub balance: Option<String>,
    pub log: VecDeque<String>,
    pub inputs: HashMap<InputField, String>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, field: InputField, value: impl Into<String>) {
        self.inputs.insert(field, value.into());
    }

    pub fn input(&self, field: InputField) -> &str {
        self.inputs.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn last_notice(&self) -> Option<&str> {
        self.notices.last().map(String::as_str)
    }
}

impl Surface for MemorySurface {
    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn show_balance(&mut self, text: &str) {
        self.balance = Some(text.to_string());
    }

    fn prepend_log(&mut self, line: &str) {
        self.log.push_front(line.to_string());
    }

    fn clear_input(&mut self, field: InputField) {
        self.inputs.remove(&field);
    }
}
