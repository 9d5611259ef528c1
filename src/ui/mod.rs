//! Terminal output: styles, progress indicators, history listing and
//! prompt cancellation.

use anyhow::Result;
use inquire::InquireError;

mod records;
mod spinner;
mod style;

pub use records::{excerpt, print_history};
pub use spinner::{Spinner, chunk_progress};
pub use style::Style;

/// Escape or Ctrl+C at an inquire prompt.
pub const fn is_prompt_cancelled(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

/// Runs a prompt-driven step. Returns `Ok(None)` when the user backs out of
/// a prompt, after moving the cursor past the abandoned line.
pub fn prompt_or_cancel<T, F>(f: F) -> Result<Option<T>>
where
    F: FnOnce() -> Result<T>,
{
    match f() {
        Ok(value) => Ok(Some(value)),
        Err(e)
            if e.downcast_ref::<InquireError>()
                .is_some_and(is_prompt_cancelled) =>
        {
            println!();
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_step_returns_value() {
        assert_eq!(prompt_or_cancel(|| Ok(42)).unwrap(), Some(42));
    }

    #[test]
    fn test_escape_and_interrupt_become_none() {
        for err in [
            InquireError::OperationCanceled,
            InquireError::OperationInterrupted,
        ] {
            let result: Option<()> = prompt_or_cancel(|| Err(err.into())).unwrap();
            assert!(result.is_none());
        }
    }

    #[test]
    fn test_other_errors_propagate() {
        let err = prompt_or_cancel::<(), _>(|| Err(anyhow::anyhow!("history is locked")))
            .unwrap_err();
        assert!(err.to_string().contains("history is locked"));

        let err = prompt_or_cancel::<(), _>(|| Err(InquireError::Custom("bad tty".into()).into()))
            .unwrap_err();
        assert!(err.to_string().contains("bad tty"));
    }

    #[test]
    fn test_only_user_aborts_count_as_cancelled() {
        assert!(is_prompt_cancelled(&InquireError::OperationCanceled));
        assert!(is_prompt_cancelled(&InquireError::OperationInterrupted));
        assert!(!is_prompt_cancelled(&InquireError::NotTTY));
    }
}
