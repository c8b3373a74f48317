//! Closed / open / confirmed state machine shared by every menu

/// In-progress choice held by an open dialog
///
/// `resolve` returns the final value only when the choice is complete, which
/// is what makes a partial selection impossible to confirm.
pub trait Selection {
    type Output;

    fn resolve(&self) -> Option<Self::Output>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog<S> {
    Closed,
    Open(S),
}

impl<S> Default for Dialog<S> {
    fn default() -> Self {
        Self::Closed
    }
}

impl<S: Selection> Dialog<S> {
    pub fn new() -> Self {
        Self::Closed
    }

    /// Open with `selection`, replacing whatever was being edited
    pub fn open(&mut self, selection: S) {
        *self = Self::Open(selection);
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    pub fn selection(&self) -> Option<&S> {
        match self {
            Self::Open(selection) => Some(selection),
            Self::Closed => None,
        }
    }

    pub fn selection_mut(&mut self) -> Option<&mut S> {
        match self {
            Self::Open(selection) => Some(selection),
            Self::Closed => None,
        }
    }

    /// Whether confirming now would emit a value
    pub fn can_confirm(&self) -> bool {
        self.selection().is_some_and(|s| s.resolve().is_some())
    }

    /// Close and discard the selection
    pub fn cancel(&mut self) {
        *self = Self::Closed;
    }

    /// Close and emit the resolved selection
    ///
    /// An incomplete selection keeps the dialog open and emits nothing. A
    /// closed dialog never emits, so a value comes out at most once per open.
    pub fn confirm(&mut self) -> Option<S::Output> {
        let output = self.selection()?.resolve()?;
        *self = Self::Closed;
        Some(output)
    }
}

/// Single required value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Choice<T>(pub Option<T>);

impl<T: Clone> Selection for Choice<T> {
    type Output = T;

    fn resolve(&self) -> Option<T> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let dialog: Dialog<Choice<u8>> = Dialog::new();
        assert!(!dialog.is_open());
        assert!(!dialog.can_confirm());
    }

    #[test]
    fn cancel_discards_selection() {
        let mut dialog = Dialog::new();
        dialog.open(Choice(Some(1)));
        dialog.cancel();
        assert!(!dialog.is_open());
        assert_eq!(dialog.confirm(), None);
    }

    #[test]
    fn confirm_emits_once() {
        let mut dialog = Dialog::new();
        dialog.open(Choice(Some("/dev/vda")));
        assert!(dialog.can_confirm());
        assert_eq!(dialog.confirm(), Some("/dev/vda"));
        assert_eq!(dialog.confirm(), None);
    }

    #[test]
    fn incomplete_selection_stays_open() {
        let mut dialog: Dialog<Choice<u8>> = Dialog::new();
        dialog.open(Choice(None));
        assert!(!dialog.can_confirm());
        assert_eq!(dialog.confirm(), None);
        assert!(dialog.is_open());

        if let Some(choice) = dialog.selection_mut() {
            choice.0 = Some(3);
        }
        assert_eq!(dialog.confirm(), Some(3));
    }
}
