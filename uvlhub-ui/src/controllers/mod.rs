//! Page controllers for the account screens
//!
//! Controllers hold the flow logic only. Rendering, dialogs, downloads and
//! HTTP sit behind the traits below so the same controller drives either the
//! server-rendered markup or the Leptos components.

use std::cell::Cell;

use crate::browser::BrowserError;

pub mod sessions;
pub mod two_factor;

pub use sessions::{RevokeOutcome, SessionPanel, SessionView};
pub use two_factor::{EnrollmentWizard, VerifyOutcome, WizardState, WizardView};

/// Blocking user prompts
pub trait Dialogs {
    fn confirm(&self, message: &str) -> bool;
    fn alert(&self, message: &str);
}

/// Client-side file export
pub trait FileSaver {
    fn save_text(&self, filename: &str, contents: &str) -> Result<(), BrowserError>;
}

/// Marks a request as in flight until dropped
pub(crate) struct InFlight<'a>(&'a Cell<bool>);

impl<'a> InFlight<'a> {
    /// `None` when another request already holds the flag
    pub(crate) fn begin(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    pub struct FakeDialogs {
        pub answer: Cell<bool>,
        pub confirms: RefCell<Vec<String>>,
        pub alerts: RefCell<Vec<String>>,
    }

    impl FakeDialogs {
        pub fn answering(answer: bool) -> Self {
            Self {
                answer: Cell::new(answer),
                ..Self::default()
            }
        }
    }

    impl Dialogs for &FakeDialogs {
        fn confirm(&self, message: &str) -> bool {
            self.confirms.borrow_mut().push(message.to_string());
            self.answer.get()
        }

        fn alert(&self, message: &str) {
            self.alerts.borrow_mut().push(message.to_string());
        }
    }

    #[derive(Default)]
    pub struct FakeSaver {
        pub saved: RefCell<Vec<(String, String)>>,
    }

    impl FileSaver for &FakeSaver {
        fn save_text(&self, filename: &str, contents: &str) -> Result<(), BrowserError> {
            self.saved
                .borrow_mut()
                .push((filename.to_string(), contents.to_string()));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_is_exclusive() {
        let flag = Cell::new(false);

        let first = InFlight::begin(&flag);
        assert!(first.is_some());
        assert!(InFlight::begin(&flag).is_none());

        drop(first);
        assert!(!flag.get());
        assert!(InFlight::begin(&flag).is_some());
    }
}
