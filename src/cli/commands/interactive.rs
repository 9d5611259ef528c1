use anyhow::Result;
use std::sync::Arc;

use crate::cli::LanguageSelection;
use crate::interactive::{InteractiveSession, SessionState};
use crate::orchestrator::Orchestrator;

pub async fn run_interactive(
    orchestrator: Orchestrator,
    selection: LanguageSelection,
) -> Result<()> {
    let state = SessionState::new(selection.source, selection.target, selection.provider);
    let mut session = InteractiveSession::new(Arc::new(orchestrator), state);
    session.run().await
}
