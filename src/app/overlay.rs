//! On-screen text: instructions, loading progress and timed notices.

pub const INSTRUCTIONS: &str = "Press keys 1-5 to switch animations";

/// Progress of one model load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingNotice {
    pub name: String,
    pub loaded: u64,
    pub total: Option<u64>,
}

impl LoadingNotice {
    /// Whole percent loaded; `None` while the size is unknown.
    #[must_use]
    pub fn percent(&self) -> Option<u64> {
        let total = self.total.filter(|&t| t > 0)?;
        Some((u128::from(self.loaded) * 100 / u128::from(total)) as u64)
    }

    #[must_use]
    pub fn text(&self) -> String {
        match self.percent() {
            Some(percent) => format!("Loading {}... {percent}%", self.name),
            None => format!("Loading {}...", self.name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A message that disappears after `remaining` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub remaining: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    instructions: Option<String>,
    loading: Vec<LoadingNotice>,
    notices: Vec<Notice>,
}

impl Overlay {
    #[must_use]
    pub fn new(show_instructions: bool) -> Self {
        Self {
            instructions: show_instructions.then(|| INSTRUCTIONS.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    #[must_use]
    pub fn loading(&self) -> &[LoadingNotice] {
        &self.loading
    }

    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn begin_loading(&mut self, name: &str) {
        if self.loading.iter().any(|n| n.name == name) {
            return;
        }
        self.loading.push(LoadingNotice {
            name: name.to_string(),
            loaded: 0,
            total: None,
        });
    }

    pub fn update_loading(&mut self, name: &str, loaded: u64, total: Option<u64>) {
        if let Some(notice) = self.loading.iter_mut().find(|n| n.name == name) {
            notice.loaded = loaded;
            notice.total = total;
        }
    }

    pub fn finish_loading(&mut self, name: &str) {
        self.loading.retain(|n| n.name != name);
    }

    pub fn push(&mut self, kind: NoticeKind, text: impl Into<String>, seconds: f32) {
        self.notices.push(Notice {
            kind,
            text: text.into(),
            remaining: seconds,
        });
    }

    /// Shows "Error loading `name`" for `seconds`.
    pub fn push_load_error(&mut self, name: &str, seconds: f32) {
        self.push(NoticeKind::Error, format!("Error loading {name}"), seconds);
    }

    /// Counts notices down and drops the expired ones.
    pub fn update(&mut self, dt: f32) {
        for notice in &mut self.notices {
            notice.remaining -= dt;
        }
        self.notices.retain(|n| n.remaining > 0.0);
    }
}
